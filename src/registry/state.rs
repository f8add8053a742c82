use crate::{
    item::Item,
    proxy::storage::{ItemTable, SlotStorage},
    registry::{
        error::{RegistryError, not_found},
        layout::{ACCUMULATED_BALANCE, INITIALIZED, ITEMS, OWNER, VAT, WITHDRAWN_TOTAL},
    },
    types::{Amount, Identity, ItemHandle},
};

/// Typed view of the registry slots inside façade storage.
pub struct RegistryState<'a> {
    storage: &'a mut SlotStorage,
}

impl<'a> RegistryState<'a> {
    pub fn new(storage: &'a mut SlotStorage) -> Self {
        Self { storage }
    }

    pub fn initialized(&self) -> Result<bool, RegistryError> {
        Ok(self.storage.flag(INITIALIZED)?)
    }

    pub fn mark_initialized(&mut self) -> Result<(), RegistryError> {
        Ok(self.storage.set_flag(INITIALIZED, true)?)
    }

    pub fn owner(&self) -> Result<Option<&Identity>, RegistryError> {
        Ok(self.storage.identity(OWNER)?)
    }

    pub fn set_owner(&mut self, owner: Identity) -> Result<(), RegistryError> {
        Ok(self.storage.set_identity(OWNER, owner)?)
    }

    pub fn is_owner(&self, caller: &Identity) -> Result<bool, RegistryError> {
        Ok(self.owner()? == Some(caller))
    }

    pub fn items(&self) -> Result<&ItemTable, RegistryError> {
        Ok(self.storage.item_table(ITEMS)?)
    }

    pub fn items_mut(&mut self) -> Result<&mut ItemTable, RegistryError> {
        Ok(self.storage.item_table_mut(ITEMS)?)
    }

    pub fn item(&self, handle: &ItemHandle) -> Result<&Item, RegistryError> {
        self.items()?
            .get(handle)
            .ok_or_else(|| not_found(format!("unknown item '{}'", handle)))
    }

    pub fn item_mut(&mut self, handle: &ItemHandle) -> Result<&mut Item, RegistryError> {
        self.items_mut()?
            .get_mut(handle)
            .ok_or_else(|| not_found(format!("unknown item '{}'", handle)))
    }

    pub fn accumulated_balance(&self) -> Result<Amount, RegistryError> {
        Ok(self.storage.amount(ACCUMULATED_BALANCE)?)
    }

    pub fn set_accumulated_balance(&mut self, value: Amount) -> Result<(), RegistryError> {
        Ok(self.storage.set_amount(ACCUMULATED_BALANCE, value)?)
    }

    pub fn withdrawn_total(&self) -> Result<Amount, RegistryError> {
        Ok(self.storage.amount(WITHDRAWN_TOTAL)?)
    }

    pub fn set_withdrawn_total(&mut self, value: Amount) -> Result<(), RegistryError> {
        Ok(self.storage.set_amount(WITHDRAWN_TOTAL, value)?)
    }

    pub fn vat(&self) -> Result<Amount, RegistryError> {
        Ok(self.storage.amount(VAT)?)
    }

    pub fn set_vat(&mut self, value: Amount) -> Result<(), RegistryError> {
        Ok(self.storage.set_amount(VAT, value)?)
    }
}
