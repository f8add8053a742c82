use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Amount, Identity, ItemHandle};

/// Purchase lifecycle of one item. The numeric codes are part of the external
/// interface: callers compare against them ("at least paid" is `>= 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ItemState {
    Created = 0,
    Paid = 1,
    Delivered = 2,
}

impl ItemState {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ItemState> for u8 {
    fn from(state: ItemState) -> Self {
        state.code()
    }
}

impl TryFrom<u8> for ItemState {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ItemState::Created),
            1 => Ok(ItemState::Paid),
            2 => Ok(ItemState::Delivered),
            other => Err(format!("unknown item state code {other}")),
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemState::Created => "created",
            ItemState::Paid => "paid",
            ItemState::Delivered => "delivered",
        };
        f.write_str(name)
    }
}

/// Read model of an item as exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item: ItemHandle,
    pub identifier: String,
    pub price: Amount,
    pub state: ItemState,
    pub escrowed_value: Amount,
    #[serde(default)]
    pub buyer: Option<Identity>,
}
