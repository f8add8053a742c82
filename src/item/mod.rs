pub mod item;
pub mod types;

pub use item::Item;
pub use types::{ItemRecord, ItemState};
