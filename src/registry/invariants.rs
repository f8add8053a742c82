use crate::{
    item::ItemState,
    registry::{
        error::{RegistryError, arithmetic_error, invariant_violation},
        state::RegistryState,
    },
    types::Amount,
};

/// `accumulated_balance` must equal the escrow of every paid or delivered item
/// minus what the owner already withdrew.
pub fn assert_balance_consistency(state: &RegistryState<'_>) -> Result<(), RegistryError> {
    let mut escrowed: Amount = 0;
    for item in state.items()?.values() {
        if item.state() >= ItemState::Paid {
            escrowed = escrowed
                .checked_add(item.escrowed_value())
                .ok_or_else(|| arithmetic_error("escrow total overflow"))?;
        }
    }

    let withdrawn = state.withdrawn_total()?;
    let balance = state.accumulated_balance()?;
    let expected = escrowed.checked_sub(withdrawn).ok_or_else(|| {
        invariant_violation(format!(
            "withdrawn total {} exceeds collected escrow {}",
            withdrawn, escrowed
        ))
    })?;

    if balance != expected {
        return Err(invariant_violation(format!(
            "accumulated balance {} does not match escrow {} minus withdrawals {}",
            balance, escrowed, withdrawn
        )));
    }

    Ok(())
}

/// Every stored item sits under the handle it was created with.
pub fn assert_item_index_consistency(state: &RegistryState<'_>) -> Result<(), RegistryError> {
    for (handle, item) in state.items()? {
        if item.handle() != handle {
            return Err(invariant_violation(format!(
                "item stored under '{}' reports handle '{}'",
                handle,
                item.handle()
            )));
        }
    }
    Ok(())
}
