//! Slot arena hosted by a façade.
//!
//! Registry state is not stored as native struct fields. Each implementation
//! declares a [`StorageLayout`]: an ordered list of named, typed slots. The
//! façade keeps the values in an arena indexed by slot position and records
//! the layout they were written under. Every accessor checks the requested
//! index and kind against that layout, so a logic version that misreads
//! storage fails loudly instead of silently reinterpreting bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    item::Item,
    types::{Amount, Identity, ItemHandle},
};

pub type ItemTable = BTreeMap<ItemHandle, Item>;

static EMPTY_ITEM_TABLE: ItemTable = BTreeMap::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Flag,
    Identity,
    Amount,
    ItemTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDescriptor {
    pub name: String,
    pub kind: SlotKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StorageLayout {
    pub slots: Vec<SlotDescriptor>,
}

impl StorageLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, name: impl Into<String>, kind: SlotKind) -> Self {
        self.slots.push(SlotDescriptor {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&SlotDescriptor> {
        self.slots.get(index)
    }

    /// Accepts `self` as a successor of `previous` only when it keeps every
    /// existing slot at the same index with the same name and kind.
    pub fn check_extends(&self, previous: &StorageLayout) -> Result<(), StorageError> {
        if self.slots.len() < previous.slots.len() {
            return Err(StorageError::LayoutShrunk {
                previous: previous.slots.len(),
                next: self.slots.len(),
            });
        }

        for (index, (before, after)) in previous.slots.iter().zip(&self.slots).enumerate() {
            if before != after {
                return Err(StorageError::LayoutRewritten {
                    index,
                    previous: format!("{}:{:?}", before.name, before.kind),
                    next: format!("{}:{:?}", after.name, after.kind),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    Flag(bool),
    Identity(Identity),
    Amount(Amount),
    ItemTable(ItemTable),
}

impl SlotValue {
    pub fn kind(&self) -> SlotKind {
        match self {
            SlotValue::Flag(_) => SlotKind::Flag,
            SlotValue::Identity(_) => SlotKind::Identity,
            SlotValue::Amount(_) => SlotKind::Amount,
            SlotValue::ItemTable(_) => SlotKind::ItemTable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("slot {index} is not declared in the active storage layout")]
    Undeclared { index: usize },
    #[error("slot {index} ('{name}') is declared as {declared:?} but accessed as {requested:?}")]
    KindMismatch {
        index: usize,
        name: String,
        declared: SlotKind,
        requested: SlotKind,
    },
    #[error("slot {index} ('{name}') holds a {found:?} value but is declared as {declared:?}")]
    Corrupted {
        index: usize,
        name: String,
        declared: SlotKind,
        found: SlotKind,
    },
    #[error("storage layout shrinks from {previous} to {next} slots")]
    LayoutShrunk { previous: usize, next: usize },
    #[error("storage layout rewrites slot {index} from {previous} to {next}")]
    LayoutRewritten {
        index: usize,
        previous: String,
        next: String,
    },
}

/// Persistent registry state, physically owned by the façade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotStorage {
    layout: StorageLayout,
    #[serde(default)]
    slots: Vec<Option<SlotValue>>,
}

impl SlotStorage {
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            layout,
            slots: Vec::new(),
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Adopts a successor layout. Existing values are kept as they are; slots
    /// the successor appends read as their kind's default until written.
    pub fn extend_layout(&mut self, next: &StorageLayout) -> Result<(), StorageError> {
        next.check_extends(&self.layout)?;
        self.layout = next.clone();
        Ok(())
    }

    pub fn flag(&self, index: usize) -> Result<bool, StorageError> {
        match self.read(index, SlotKind::Flag)? {
            Some(SlotValue::Flag(value)) => Ok(*value),
            _ => Ok(false),
        }
    }

    pub fn set_flag(&mut self, index: usize, value: bool) -> Result<(), StorageError> {
        *self.slot_mut(index, SlotKind::Flag)? = Some(SlotValue::Flag(value));
        Ok(())
    }

    pub fn identity(&self, index: usize) -> Result<Option<&Identity>, StorageError> {
        match self.read(index, SlotKind::Identity)? {
            Some(SlotValue::Identity(value)) => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    pub fn set_identity(&mut self, index: usize, value: Identity) -> Result<(), StorageError> {
        *self.slot_mut(index, SlotKind::Identity)? = Some(SlotValue::Identity(value));
        Ok(())
    }

    pub fn amount(&self, index: usize) -> Result<Amount, StorageError> {
        match self.read(index, SlotKind::Amount)? {
            Some(SlotValue::Amount(value)) => Ok(*value),
            _ => Ok(0),
        }
    }

    pub fn set_amount(&mut self, index: usize, value: Amount) -> Result<(), StorageError> {
        *self.slot_mut(index, SlotKind::Amount)? = Some(SlotValue::Amount(value));
        Ok(())
    }

    pub fn item_table(&self, index: usize) -> Result<&ItemTable, StorageError> {
        match self.read(index, SlotKind::ItemTable)? {
            Some(SlotValue::ItemTable(table)) => Ok(table),
            _ => Ok(&EMPTY_ITEM_TABLE),
        }
    }

    pub fn item_table_mut(&mut self, index: usize) -> Result<&mut ItemTable, StorageError> {
        let slot = self.slot_mut(index, SlotKind::ItemTable)?;
        if slot.is_none() {
            *slot = Some(SlotValue::ItemTable(ItemTable::new()));
        }
        match slot {
            Some(SlotValue::ItemTable(table)) => Ok(table),
            _ => unreachable!("slot kind is verified by slot_mut"),
        }
    }

    fn declared(&self, index: usize, requested: SlotKind) -> Result<(), StorageError> {
        let descriptor = self
            .layout
            .slot(index)
            .ok_or(StorageError::Undeclared { index })?;
        if descriptor.kind != requested {
            return Err(StorageError::KindMismatch {
                index,
                name: descriptor.name.clone(),
                declared: descriptor.kind,
                requested,
            });
        }
        Ok(())
    }

    fn read(&self, index: usize, kind: SlotKind) -> Result<Option<&SlotValue>, StorageError> {
        self.declared(index, kind)?;
        let value = self.slots.get(index).and_then(Option::as_ref);
        if let Some(value) = value {
            self.ensure_value_kind(index, kind, value)?;
        }
        Ok(value)
    }

    fn slot_mut(
        &mut self,
        index: usize,
        kind: SlotKind,
    ) -> Result<&mut Option<SlotValue>, StorageError> {
        self.declared(index, kind)?;
        if let Some(Some(value)) = self.slots.get(index) {
            self.ensure_value_kind(index, kind, value)?;
        }
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        Ok(&mut self.slots[index])
    }

    fn ensure_value_kind(
        &self,
        index: usize,
        declared: SlotKind,
        value: &SlotValue,
    ) -> Result<(), StorageError> {
        if value.kind() != declared {
            let name = self
                .layout
                .slot(index)
                .map(|descriptor| descriptor.name.clone())
                .unwrap_or_default();
            return Err(StorageError::Corrupted {
                index,
                name,
                declared,
                found: value.kind(),
            });
        }
        Ok(())
    }
}
