//! The registry's storage schema. Every registry version derives its layout
//! from [`v1_layout`] by appending, so data written by one version stays
//! addressable by the next.

use crate::proxy::storage::{SlotKind, StorageLayout};

pub const INITIALIZED: usize = 0;
pub const OWNER: usize = 1;
pub const ITEMS: usize = 2;
pub const ACCUMULATED_BALANCE: usize = 3;
pub const WITHDRAWN_TOTAL: usize = 4;
pub const VAT: usize = 5;

pub fn v1_layout() -> StorageLayout {
    StorageLayout::new()
        .with_slot("initialized", SlotKind::Flag)
        .with_slot("owner", SlotKind::Identity)
        .with_slot("items", SlotKind::ItemTable)
        .with_slot("accumulated_balance", SlotKind::Amount)
        .with_slot("withdrawn_total", SlotKind::Amount)
}

pub fn v2_layout() -> StorageLayout {
    v1_layout().with_slot("vat", SlotKind::Amount)
}
