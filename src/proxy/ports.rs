use crate::{
    proxy::storage::{SlotStorage, StorageLayout},
    registry::{
        error::RegistryError,
        types::{CallReceipt, RegistryCall},
    },
    types::CallContext,
};

/// Registry logic that a façade can forward calls to. Implementations hold no
/// state of their own; everything they persist lives in the storage they are
/// handed.
pub trait RegistryLogic: Send + Sync {
    /// Stable version label, e.g. `item-registry/v1`.
    fn version(&self) -> &str;

    /// Storage layout this logic reads and writes.
    fn layout(&self) -> StorageLayout;

    fn execute(
        &self,
        storage: &mut SlotStorage,
        ctx: &CallContext,
        call: &RegistryCall,
    ) -> Result<CallReceipt, RegistryError>;
}
