use crate::{
    item::{Item, ItemState},
    proxy::{
        ports::RegistryLogic,
        storage::{SlotStorage, StorageLayout},
    },
    registry::{
        error::{
            RegistryError, already_initialized, arithmetic_error, empty_batch, invalid_request,
            not_owner, unsupported_call,
        },
        invariants::{assert_balance_consistency, assert_item_index_consistency},
        layout::v1_layout,
        state::RegistryState,
        types::{CallOutput, CallReceipt, ItemCreated, RegistryCall, RegistryEvent},
    },
    types::{Amount, CallContext, Identity, ItemHandle, ValueTransfer, derive_handle},
};

pub const V1_VERSION: &str = "item-registry/v1";

/// First registry implementation: item creation, purchase lifecycle and
/// balance bookkeeping.
#[derive(Debug, Default, Clone, Copy)]
pub struct ItemRegistry;

impl ItemRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl RegistryLogic for ItemRegistry {
    fn version(&self) -> &str {
        V1_VERSION
    }

    fn layout(&self) -> StorageLayout {
        v1_layout()
    }

    fn execute(
        &self,
        storage: &mut SlotStorage,
        ctx: &CallContext,
        call: &RegistryCall,
    ) -> Result<CallReceipt, RegistryError> {
        let mut state = RegistryState::new(storage);
        execute_core(&mut state, ctx, call, V1_VERSION)
    }
}

/// Dispatches the calls every registry version answers. Calls outside that set
/// are rejected as unsupported for `version`.
pub(crate) fn execute_core(
    state: &mut RegistryState<'_>,
    ctx: &CallContext,
    call: &RegistryCall,
    version: &str,
) -> Result<CallReceipt, RegistryError> {
    ensure_value_accepted(ctx, call)?;

    let receipt = match call {
        RegistryCall::Initialize { owner } => initialize(state, owner)?,
        RegistryCall::CreateItem { identifier, price } => {
            create_item(state, ctx, identifier, *price)?
        }
        RegistryCall::CreateItems {
            identifiers,
            prices,
        } => create_items(state, ctx, identifiers, prices)?,
        RegistryCall::TriggerPayment { item } => trigger_payment(state, ctx, item)?,
        RegistryCall::TriggerDelivery { item } => trigger_delivery(state, ctx, item)?,
        RegistryCall::GetBalance => {
            ensure_owner(state, ctx, "read the balance")?;
            CallReceipt::new(CallOutput::Balance(state.accumulated_balance()?))
        }
        RegistryCall::GetItem { item } => {
            CallReceipt::new(CallOutput::Item(state.item(item)?.record()))
        }
        RegistryCall::Owner => CallReceipt::new(CallOutput::Owner(state.owner()?.cloned())),
        RegistryCall::ItemCount => {
            CallReceipt::new(CallOutput::ItemCount(state.items()?.len() as u64))
        }
        RegistryCall::Withdraw { amount } => withdraw(state, ctx, *amount)?,
        RegistryCall::SetVat { .. } | RegistryCall::Vat => {
            return Err(unsupported_call(format!(
                "{} has no entry point '{}'",
                version,
                call.name()
            )));
        }
    };

    if !call.is_read_only() {
        assert_item_index_consistency(state)?;
        assert_balance_consistency(state)?;
    }

    Ok(receipt)
}

pub(crate) fn ensure_value_accepted(
    ctx: &CallContext,
    call: &RegistryCall,
) -> Result<(), RegistryError> {
    if ctx.value != 0 && !call.is_payable() {
        return Err(invalid_request(format!(
            "'{}' does not accept attached value (got {})",
            call.name(),
            ctx.value
        )));
    }
    Ok(())
}

pub(crate) fn ensure_owner(
    state: &RegistryState<'_>,
    ctx: &CallContext,
    action: &str,
) -> Result<(), RegistryError> {
    if !state.is_owner(&ctx.caller)? {
        return Err(not_owner(format!(
            "caller '{}' is not the registry owner and cannot {}",
            ctx.caller, action
        )));
    }
    Ok(())
}

fn initialize(
    state: &mut RegistryState<'_>,
    owner: &Identity,
) -> Result<CallReceipt, RegistryError> {
    if state.initialized()? {
        return Err(already_initialized("registry is already initialized"));
    }

    state.set_owner(owner.clone())?;
    state.mark_initialized()?;
    tracing::info!(target: "registry", owner = %owner, "registry_initialized");

    Ok(CallReceipt::with_events(
        CallOutput::Unit,
        vec![RegistryEvent::Initialized {
            owner: owner.clone(),
        }],
    ))
}

fn create_item(
    state: &mut RegistryState<'_>,
    ctx: &CallContext,
    identifier: &str,
    price: Amount,
) -> Result<CallReceipt, RegistryError> {
    ensure_owner(state, ctx, "create items")?;
    validate_identifier(identifier, 0)?;

    let created = insert_item(state, identifier, price)?;
    Ok(CallReceipt::with_events(
        CallOutput::ItemCreated(created.clone()),
        vec![RegistryEvent::ItemCreated(created)],
    ))
}

fn create_items(
    state: &mut RegistryState<'_>,
    ctx: &CallContext,
    identifiers: &[String],
    prices: &[Amount],
) -> Result<CallReceipt, RegistryError> {
    ensure_owner(state, ctx, "create items")?;

    if identifiers.is_empty() && prices.is_empty() {
        return Err(empty_batch("batch creation requires at least one item"));
    }
    if identifiers.len() != prices.len() {
        return Err(invalid_request(format!(
            "batch has {} identifiers but {} prices",
            identifiers.len(),
            prices.len()
        )));
    }
    for (index, identifier) in identifiers.iter().enumerate() {
        validate_identifier(identifier, index)?;
    }

    let mut created = Vec::with_capacity(identifiers.len());
    for (identifier, price) in identifiers.iter().zip(prices) {
        created.push(insert_item(state, identifier, *price)?);
    }

    let events = created
        .iter()
        .cloned()
        .map(RegistryEvent::ItemCreated)
        .collect();
    Ok(CallReceipt::with_events(CallOutput::ItemsCreated(created), events))
}

fn trigger_payment(
    state: &mut RegistryState<'_>,
    ctx: &CallContext,
    handle: &ItemHandle,
) -> Result<CallReceipt, RegistryError> {
    if state.is_owner(&ctx.caller)? {
        return Err(not_owner(format!(
            "registry owner '{}' cannot pay for its own items",
            ctx.caller
        )));
    }

    let balance = state.accumulated_balance()?;
    let next_balance = balance
        .checked_add(ctx.value)
        .ok_or_else(|| arithmetic_error("accumulated balance overflow during payment"))?;

    state
        .item_mut(handle)?
        .record_payment(ctx.value, ctx.caller.clone())?;
    state.set_accumulated_balance(next_balance)?;

    tracing::info!(
        target: "registry",
        item = %handle,
        buyer = %ctx.caller,
        amount = ctx.value,
        "payment_recorded"
    );

    Ok(state_changed(handle, ItemState::Paid))
}

fn trigger_delivery(
    state: &mut RegistryState<'_>,
    ctx: &CallContext,
    handle: &ItemHandle,
) -> Result<CallReceipt, RegistryError> {
    ensure_owner(state, ctx, "trigger delivery")?;
    state.item_mut(handle)?.mark_delivered()?;

    tracing::info!(target: "registry", item = %handle, "delivery_recorded");
    Ok(state_changed(handle, ItemState::Delivered))
}

fn withdraw(
    state: &mut RegistryState<'_>,
    ctx: &CallContext,
    amount: Amount,
) -> Result<CallReceipt, RegistryError> {
    ensure_owner(state, ctx, "withdraw")?;
    if amount == 0 {
        return Err(invalid_request("withdrawal amount must be positive"));
    }

    let balance = state.accumulated_balance()?;
    if amount > balance {
        return Err(invalid_request(format!(
            "withdrawal of {} exceeds accumulated balance {}",
            amount, balance
        )));
    }

    let withdrawn_total = state
        .withdrawn_total()?
        .checked_add(amount)
        .ok_or_else(|| arithmetic_error("withdrawn total overflow"))?;
    state.set_accumulated_balance(balance - amount)?;
    state.set_withdrawn_total(withdrawn_total)?;

    tracing::info!(target: "registry", to = %ctx.caller, amount, "balance_withdrawn");

    Ok(CallReceipt {
        output: CallOutput::Withdrawn(amount),
        events: vec![RegistryEvent::BalanceWithdrawn {
            to: ctx.caller.clone(),
            amount,
        }],
        transfers: vec![ValueTransfer {
            to: ctx.caller.clone(),
            amount,
        }],
    })
}

fn insert_item(
    state: &mut RegistryState<'_>,
    identifier: &str,
    price: Amount,
) -> Result<ItemCreated, RegistryError> {
    let nonce = state.items()?.len() as u64;
    let handle = derive_item_handle(nonce, identifier, price);
    let items = state.items_mut()?;
    if items.contains_key(&handle) {
        return Err(invalid_request(format!(
            "derived item handle '{}' is already taken",
            handle
        )));
    }
    items.insert(
        handle.clone(),
        Item::new(handle.clone(), identifier.to_string(), price),
    );

    tracing::info!(
        target: "registry",
        item = %handle,
        identifier = identifier,
        price,
        "item_created"
    );

    Ok(ItemCreated {
        item: handle,
        identifier: identifier.to_string(),
        price,
    })
}

fn validate_identifier(identifier: &str, index: usize) -> Result<(), RegistryError> {
    if identifier.is_empty() {
        return Err(invalid_request(format!(
            "item identifier at position {} cannot be empty",
            index
        )));
    }
    Ok(())
}

fn state_changed(handle: &ItemHandle, state: ItemState) -> CallReceipt {
    CallReceipt::with_events(
        CallOutput::StateChanged {
            item: handle.clone(),
            state,
        },
        vec![RegistryEvent::ItemStateChanged {
            item: handle.clone(),
            state,
        }],
    )
}

fn derive_item_handle(nonce: u64, identifier: &str, price: Amount) -> ItemHandle {
    let canonical = serde_json::json!({
        "registry_nonce": nonce,
        "identifier": identifier,
        "price": price,
    });
    ItemHandle::new(derive_handle("item", &canonical))
}
