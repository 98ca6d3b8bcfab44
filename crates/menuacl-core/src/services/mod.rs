//! Domain services (business logic)

pub mod menu_service;
pub mod module_service;
pub mod access_service;

pub use menu_service::MenuService;
pub use module_service::ModuleService;
pub use access_service::AccessService;

use tracing::error;

use crate::domain::AuditEntry;
use crate::repositories::AuditSink;

/// Hands an entry to the sink after the change has committed. A failing sink
/// is logged and never undoes or fails the change.
pub(crate) async fn record_audit(sink: &dyn AuditSink, entry: AuditEntry) {
    let action = entry.action.as_str();
    let subject = entry.subject.clone();
    if let Err(e) = sink.record(entry).await {
        error!("Failed to record audit entry {} for {}: {}", action, subject, e);
    }
}
