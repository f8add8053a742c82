use crate::{
    proxy::{
        ports::RegistryLogic,
        storage::{SlotStorage, StorageLayout},
    },
    registry::{
        error::RegistryError,
        layout::v2_layout,
        logic::{ensure_owner, ensure_value_accepted, execute_core},
        state::RegistryState,
        types::{CallOutput, CallReceipt, RegistryCall, RegistryEvent},
    },
    types::CallContext,
};

pub const V2_VERSION: &str = "item-registry/v2";

/// Second registry implementation. Behaves exactly like v1 and adds an
/// owner-managed VAT rate in a slot appended after the v1 layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ItemRegistryV2;

impl ItemRegistryV2 {
    pub fn new() -> Self {
        Self
    }
}

impl RegistryLogic for ItemRegistryV2 {
    fn version(&self) -> &str {
        V2_VERSION
    }

    fn layout(&self) -> StorageLayout {
        v2_layout()
    }

    fn execute(
        &self,
        storage: &mut SlotStorage,
        ctx: &CallContext,
        call: &RegistryCall,
    ) -> Result<CallReceipt, RegistryError> {
        let mut state = RegistryState::new(storage);
        match call {
            RegistryCall::SetVat { vat } => {
                ensure_value_accepted(ctx, call)?;
                ensure_owner(&state, ctx, "set the vat rate")?;
                state.set_vat(*vat)?;
                tracing::info!(target: "registry", vat = *vat, "vat_updated");
                Ok(CallReceipt::with_events(
                    CallOutput::Unit,
                    vec![RegistryEvent::VatUpdated { vat: *vat }],
                ))
            }
            RegistryCall::Vat => {
                ensure_value_accepted(ctx, call)?;
                Ok(CallReceipt::new(CallOutput::Vat(state.vat()?)))
            }
            _ => execute_core(&mut state, ctx, call, V2_VERSION),
        }
    }
}
