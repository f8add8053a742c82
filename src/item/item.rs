use serde::{Deserialize, Serialize};

use crate::{
    item::types::{ItemRecord, ItemState},
    registry::error::{RegistryError, amount_mismatch, invalid_state},
    types::{Amount, Identity, ItemHandle},
};

/// One purchasable unit. Only the owning registry mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    handle: ItemHandle,
    identifier: String,
    price: Amount,
    state: ItemState,
    escrowed_value: Amount,
    #[serde(default)]
    buyer: Option<Identity>,
}

impl Item {
    pub fn new(handle: ItemHandle, identifier: String, price: Amount) -> Self {
        Self {
            handle,
            identifier,
            price,
            state: ItemState::Created,
            escrowed_value: 0,
            buyer: None,
        }
    }

    pub fn handle(&self) -> &ItemHandle {
        &self.handle
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn price(&self) -> Amount {
        self.price
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn escrowed_value(&self) -> Amount {
        self.escrowed_value
    }

    pub fn buyer(&self) -> Option<&Identity> {
        self.buyer.as_ref()
    }

    pub fn record_payment(&mut self, amount: Amount, payer: Identity) -> Result<(), RegistryError> {
        if self.state != ItemState::Created {
            return Err(invalid_state(format!(
                "item '{}' cannot be paid in state {}",
                self.handle, self.state
            )));
        }

        if amount != self.price {
            return Err(amount_mismatch(format!(
                "item '{}' requires exactly {} but received {}",
                self.handle, self.price, amount
            )));
        }

        self.escrowed_value = amount;
        self.buyer = Some(payer);
        self.state = ItemState::Paid;
        Ok(())
    }

    pub fn mark_delivered(&mut self) -> Result<(), RegistryError> {
        if self.state != ItemState::Paid {
            return Err(invalid_state(format!(
                "item '{}' cannot be delivered in state {}",
                self.handle, self.state
            )));
        }

        self.state = ItemState::Delivered;
        Ok(())
    }

    pub fn record(&self) -> ItemRecord {
        ItemRecord {
            item: self.handle.clone(),
            identifier: self.identifier.clone(),
            price: self.price,
            state: self.state,
            escrowed_value: self.escrowed_value,
            buyer: self.buyer.clone(),
        }
    }
}
