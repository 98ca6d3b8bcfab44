//! Module registry: ordered lookup and override-target validation.

use std::collections::BTreeMap;

use menuacl_shared::ModuleId;

use crate::domain::Module;
use crate::error::DomainError;

#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    ordered: Vec<Module>,
    by_id: BTreeMap<ModuleId, usize>,
}

impl ModuleRegistry {
    pub fn new<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = Module>,
    {
        let mut ordered: Vec<Module> = modules.into_iter().collect();
        ordered.sort_by_key(|m| m.order_key());

        let by_id = ordered.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
        Self { ordered, by_id }
    }

    /// Priority descending, then id ascending.
    pub fn ordered(&self) -> &[Module] {
        &self.ordered
    }

    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.by_id.get(&id).map(|&i| &self.ordered[i])
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// An override may only point at a module that exists and is enabled.
    pub fn validate_target(&self, id: ModuleId) -> Result<&Module, DomainError> {
        let module = self.get(id).ok_or(DomainError::UnknownTargetModule(id))?;
        if !module.is_enabled {
            return Err(DomainError::ModuleDisabled(id));
        }
        Ok(module)
    }

    /// A menu may only be owned by a module that exists. Disabled modules
    /// still own their menus.
    pub fn check_owner(&self, module_id: Option<ModuleId>) -> Result<(), DomainError> {
        match module_id {
            Some(id) if !self.contains(id) => Err(DomainError::ModuleNotFound(id)),
            _ => Ok(()),
        }
    }

    pub fn into_vec(self) -> Vec<Module> {
        self.ordered
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn module(id: ModuleId, priority: i32) -> Module {
        Module {
            id,
            name: format!("module_{}", id),
            alias: format!("m{}", id),
            title: format!("Module {}", id),
            priority,
            is_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::module;
    use super::*;

    #[test]
    fn test_registry_order() {
        let registry = ModuleRegistry::new(vec![module(3, 1), module(1, 5), module(2, 5), module(4, 9)]);
        let ids: Vec<ModuleId> = registry.ordered().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_validate_target() {
        let mut disabled = module(2, 0);
        disabled.is_enabled = false;
        let registry = ModuleRegistry::new(vec![module(1, 0), disabled]);

        assert!(registry.validate_target(1).is_ok());
        assert!(matches!(registry.validate_target(2), Err(DomainError::ModuleDisabled(2))));
        assert!(matches!(registry.validate_target(9), Err(DomainError::UnknownTargetModule(9))));
    }

    #[test]
    fn test_check_owner() {
        let mut disabled = module(2, 0);
        disabled.is_enabled = false;
        let registry = ModuleRegistry::new(vec![module(1, 0), disabled]);

        assert!(registry.check_owner(None).is_ok());
        assert!(registry.check_owner(Some(2)).is_ok());
        assert!(matches!(registry.check_owner(Some(9)), Err(DomainError::ModuleNotFound(9))));
    }
}
