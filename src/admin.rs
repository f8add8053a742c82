use crate::{
    proxy::{
        code_store::CodeStore,
        error::{ProxyError, not_admin},
        facade::{Facade, UpgradeRecord},
    },
    types::{Identity, ImplementationHandle, derive_handle},
};

/// The only component a façade accepts upgrades from. It answers to a single
/// admin identity that is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminController {
    handle: Identity,
    admin: Identity,
}

impl AdminController {
    pub fn new(admin: Identity) -> Self {
        let canonical = serde_json::json!({ "admin": admin.as_str() });
        let handle = Identity::new(derive_handle("admin", &canonical));
        Self { handle, admin }
    }

    /// Address the controller presents to façades it manages.
    pub fn handle(&self) -> &Identity {
        &self.handle
    }

    pub fn admin(&self) -> &Identity {
        &self.admin
    }

    pub fn upgrade(
        &self,
        caller: &Identity,
        facade: &mut Facade,
        new_implementation: &ImplementationHandle,
        code: &CodeStore,
    ) -> Result<UpgradeRecord, ProxyError> {
        if caller != &self.admin {
            return Err(not_admin(format!(
                "caller '{}' is not the admin of controller '{}'",
                caller, self.handle
            )));
        }

        facade.upgrade(&self.handle, new_implementation, code)
    }

    pub fn implementation_of<'a>(&self, facade: &'a Facade) -> &'a ImplementationHandle {
        facade.implementation()
    }
}
