pub mod error;
pub mod invariants;
pub mod layout;
pub mod logic;
pub mod state;
pub mod types;
pub mod v2;

pub use error::{RegistryError, RegistryErrorKind};
pub use logic::{ItemRegistry, V1_VERSION};
pub use state::RegistryState;
pub use types::{CallOutput, CallReceipt, ItemCreated, RegistryCall, RegistryEvent};
pub use v2::{ItemRegistryV2, V2_VERSION};
