use std::{collections::BTreeMap, sync::Arc};

use crate::{
    proxy::{
        error::{ProxyError, duplicate_implementation},
        ports::RegistryLogic,
    },
    types::{ImplementationHandle, derive_handle},
};

/// Catalog of deployed registry logic. A handle is "valid deployed logic"
/// exactly when it resolves here.
#[derive(Default)]
pub struct CodeStore {
    by_handle: BTreeMap<ImplementationHandle, Arc<dyn RegistryLogic>>,
}

impl CodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deploy(
        &mut self,
        logic: Arc<dyn RegistryLogic>,
    ) -> Result<ImplementationHandle, ProxyError> {
        let handle = implementation_handle(logic.version());
        if self.by_handle.contains_key(&handle) {
            return Err(duplicate_implementation(format!(
                "implementation '{}' is already deployed at {}",
                logic.version(),
                handle
            )));
        }

        tracing::debug!(
            target: "proxy",
            implementation = %handle,
            version = logic.version(),
            "implementation_deployed"
        );
        self.by_handle.insert(handle.clone(), logic);
        Ok(handle)
    }

    pub fn resolve(&self, handle: &ImplementationHandle) -> Option<Arc<dyn RegistryLogic>> {
        self.by_handle.get(handle).map(Arc::clone)
    }

    pub fn resolve_version(
        &self,
        version: &str,
    ) -> Option<(ImplementationHandle, Arc<dyn RegistryLogic>)> {
        let handle = implementation_handle(version);
        self.resolve(&handle).map(|logic| (handle, logic))
    }

    pub fn handles(&self) -> Vec<ImplementationHandle> {
        self.by_handle.keys().cloned().collect()
    }
}

pub fn implementation_handle(version: &str) -> ImplementationHandle {
    let canonical = serde_json::json!({ "version": version });
    ImplementationHandle::new(derive_handle("impl", &canonical))
}
