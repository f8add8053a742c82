use serde::{Deserialize, Serialize};

use crate::{
    item::{ItemRecord, ItemState},
    types::{Amount, Identity, ItemHandle, ValueTransfer},
};

/// Entry points a registry implementation may answer. The façade forwards all
/// of them; an implementation without a given entry point rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryCall {
    Initialize {
        owner: Identity,
    },
    CreateItem {
        identifier: String,
        price: Amount,
    },
    CreateItems {
        identifiers: Vec<String>,
        prices: Vec<Amount>,
    },
    TriggerPayment {
        item: ItemHandle,
    },
    TriggerDelivery {
        item: ItemHandle,
    },
    GetBalance,
    GetItem {
        item: ItemHandle,
    },
    Owner,
    ItemCount,
    Withdraw {
        amount: Amount,
    },
    SetVat {
        vat: Amount,
    },
    Vat,
}

impl RegistryCall {
    pub fn name(&self) -> &'static str {
        match self {
            RegistryCall::Initialize { .. } => "initialize",
            RegistryCall::CreateItem { .. } => "create_item",
            RegistryCall::CreateItems { .. } => "create_items",
            RegistryCall::TriggerPayment { .. } => "trigger_payment",
            RegistryCall::TriggerDelivery { .. } => "trigger_delivery",
            RegistryCall::GetBalance => "get_balance",
            RegistryCall::GetItem { .. } => "get_item",
            RegistryCall::Owner => "owner",
            RegistryCall::ItemCount => "item_count",
            RegistryCall::Withdraw { .. } => "withdraw",
            RegistryCall::SetVat { .. } => "set_vat",
            RegistryCall::Vat => "vat",
        }
    }

    pub fn is_payable(&self) -> bool {
        matches!(self, RegistryCall::TriggerPayment { .. })
    }

    /// Read-only calls never change storage and are not persisted.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            RegistryCall::GetBalance
                | RegistryCall::GetItem { .. }
                | RegistryCall::Owner
                | RegistryCall::ItemCount
                | RegistryCall::Vat
        )
    }
}

/// `(item, identifier, price)` as emitted for every created item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCreated {
    pub item: ItemHandle,
    pub identifier: String,
    pub price: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    Initialized { owner: Identity },
    ItemCreated(ItemCreated),
    ItemStateChanged { item: ItemHandle, state: ItemState },
    BalanceWithdrawn { to: Identity, amount: Amount },
    VatUpdated { vat: Amount },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CallOutput {
    Unit,
    ItemCreated(ItemCreated),
    ItemsCreated(Vec<ItemCreated>),
    StateChanged { item: ItemHandle, state: ItemState },
    Balance(Amount),
    Item(ItemRecord),
    Owner(Option<Identity>),
    ItemCount(u64),
    Withdrawn(Amount),
    Vat(Amount),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallReceipt {
    pub output: CallOutput,
    #[serde(default)]
    pub events: Vec<RegistryEvent>,
    #[serde(default)]
    pub transfers: Vec<ValueTransfer>,
}

impl CallReceipt {
    pub fn new(output: CallOutput) -> Self {
        Self {
            output,
            events: Vec::new(),
            transfers: Vec::new(),
        }
    }

    pub fn with_events(output: CallOutput, events: Vec<RegistryEvent>) -> Self {
        Self {
            output,
            events,
            transfers: Vec::new(),
        }
    }
}
