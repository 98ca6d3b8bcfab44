// ============================================================================
// Menu ACL Core - Menu Node Entity
// File: crates/menuacl-core/src/domain/menu_node.rs
// Description: Self-referencing menu hierarchy entity
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use menuacl_shared::constants::ROOT_PARENT_ID;
use menuacl_shared::{AuditFields, MenuId, ModuleId, Operator};

static MENU_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_:.\-]*$").expect("menu key pattern is valid")
});

/// Menu node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuType {
    Directory,
    Menu,
    Button,
    Link,
}

impl MenuType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuType::Directory => "directory",
            MenuType::Menu => "menu",
            MenuType::Button => "button",
            MenuType::Link => "link",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "directory" => Some(MenuType::Directory),
            "menu" => Some(MenuType::Menu),
            "button" => Some(MenuType::Button),
            "link" => Some(MenuType::Link),
            _ => None,
        }
    }

    /// Only directories and leaf menus may own children.
    pub fn can_parent(&self) -> bool {
        matches!(self, MenuType::Directory | MenuType::Menu)
    }
}

impl Default for MenuType {
    fn default() -> Self {
        MenuType::Menu
    }
}

/// Menu node entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: MenuId,
    /// Menu set the node belongs to, e.g. `admin` or `member`.
    pub partition: String,
    /// Structural owner. `None` means unclassified.
    pub module_id: Option<ModuleId>,
    /// `0` for root-level nodes.
    pub parent_id: MenuId,
    pub menu_type: MenuType,
    pub name: String,
    pub key: String,
    pub path: String,
    pub icon: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub is_required: bool,
    pub sort: i32,
    pub is_enabled: bool,
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl MenuNode {
    pub fn from_draft(id: MenuId, draft: &MenuDraft, operator: Operator) -> Self {
        Self {
            id,
            partition: draft.partition.clone(),
            module_id: draft.module_id,
            parent_id: draft.parent_id,
            menu_type: draft.menu_type,
            name: draft.name.clone(),
            key: draft.key.clone(),
            path: draft.path.clone(),
            icon: draft.icon.clone(),
            component: draft.component.clone(),
            redirect: draft.redirect.clone(),
            is_required: draft.is_required,
            sort: draft.sort,
            is_enabled: draft.is_enabled,
            is_deleted: false,
            audit: AuditFields::created_by(operator),
        }
    }

    /// Copies every editable field from the draft. Partition is immutable and
    /// checked by the hierarchy before this is called.
    pub fn apply_draft(&mut self, draft: &MenuDraft, operator: Operator) {
        self.module_id = draft.module_id;
        self.parent_id = draft.parent_id;
        self.menu_type = draft.menu_type;
        self.name = draft.name.clone();
        self.key = draft.key.clone();
        self.path = draft.path.clone();
        self.icon = draft.icon.clone();
        self.component = draft.component.clone();
        self.redirect = draft.redirect.clone();
        self.is_required = draft.is_required;
        self.sort = draft.sort;
        self.is_enabled = draft.is_enabled;
        self.audit.touch(operator);
    }

    pub fn soft_delete(&mut self, operator: Operator) {
        self.is_deleted = true;
        self.audit.touch(operator);
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }

    pub fn is_directory(&self) -> bool {
        self.menu_type == MenuType::Directory
    }

    /// Display order: sort ascending, then id ascending.
    pub fn order_key(&self) -> (i32, MenuId) {
        (self.sort, self.id)
    }
}

/// Create/update payload for a menu node.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuDraft {
    #[validate(length(min = 1, max = 32, message = "Partition must be between 1 and 32 characters"))]
    pub partition: String,

    pub module_id: Option<ModuleId>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Parent id cannot be negative"))]
    pub parent_id: MenuId,

    #[serde(default)]
    pub menu_type: MenuType,

    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Menu key must be between 1 and 100 characters"))]
    #[validate(custom(function = "validate_menu_key"))]
    pub key: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "Menu path too long"))]
    pub path: String,

    #[validate(length(max = 100, message = "Menu icon too long"))]
    pub icon: Option<String>,

    #[validate(length(max = 255, message = "Component reference too long"))]
    pub component: Option<String>,

    #[validate(length(max = 255, message = "Redirect too long"))]
    pub redirect: Option<String>,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub sort: i32,

    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn validate_menu_key(key: &str) -> Result<(), ValidationError> {
    if MENU_KEY_PATTERN.is_match(key) {
        Ok(())
    } else {
        Err(ValidationError::new("menu_key_format"))
    }
}

impl MenuDraft {
    /// Trims free-text fields and validates the result.
    pub fn normalized(mut self) -> Result<Self, validator::ValidationErrors> {
        self.partition = self.partition.trim().to_string();
        self.name = self.name.trim().to_string();
        self.key = self.key.trim().to_string();
        self.path = self.path.trim().to_string();
        self.icon = self.icon.map(|i| i.trim().to_string()).filter(|i| !i.is_empty());
        self.component = self.component.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        self.redirect = self.redirect.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());

        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn node(
        id: MenuId,
        parent_id: MenuId,
        menu_type: MenuType,
        module_id: Option<ModuleId>,
    ) -> MenuNode {
        MenuNode {
            id,
            partition: "admin".to_string(),
            module_id,
            parent_id,
            menu_type,
            name: format!("Menu {}", id),
            key: format!("menu_{}", id),
            path: format!("/menu/{}", id),
            icon: None,
            component: None,
            redirect: None,
            is_required: false,
            sort: 0,
            is_enabled: true,
            is_deleted: false,
            audit: AuditFields::default(),
        }
    }

    pub fn draft(parent_id: MenuId, menu_type: MenuType, key: &str) -> MenuDraft {
        MenuDraft {
            partition: "admin".to_string(),
            module_id: Some(1),
            parent_id,
            menu_type,
            name: format!("Menu {}", key),
            key: key.to_string(),
            path: format!("/{}", key),
            icon: None,
            component: None,
            redirect: None,
            is_required: false,
            sort: 0,
            is_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::draft;
    use super::*;

    #[test]
    fn test_menu_type_round_trip() {
        assert_eq!(MenuType::from_str("Directory"), Some(MenuType::Directory));
        assert_eq!(MenuType::from_str("unknown"), None);
        assert!(MenuType::Menu.can_parent());
        assert!(!MenuType::Button.can_parent());
        assert!(!MenuType::Link.can_parent());
    }

    #[test]
    fn test_draft_normalization() {
        let mut input = draft(0, MenuType::Menu, "system.users");
        input.name = "  Users ".to_string();
        input.icon = Some("   ".to_string());

        let normalized = input.normalized().unwrap();
        assert_eq!(normalized.name, "Users");
        assert!(normalized.icon.is_none());
    }

    #[test]
    fn test_draft_rejects_bad_key() {
        let input = draft(0, MenuType::Menu, "1-starts-with-digit");
        assert!(input.normalized().is_err());

        let input = draft(0, MenuType::Menu, "has space");
        assert!(input.normalized().is_err());
    }

    #[test]
    fn test_soft_delete_touches_audit() {
        let input = draft(0, MenuType::Menu, "dashboard");
        let mut node = MenuNode::from_draft(5, &input, Operator::new(9));
        node.soft_delete(Operator::new(11));
        assert!(node.is_deleted);
        assert_eq!(node.audit.created_by, Some(9));
        assert_eq!(node.audit.modified_by, Some(11));
    }
}
