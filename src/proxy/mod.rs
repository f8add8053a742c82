pub mod code_store;
pub mod error;
pub mod facade;
pub mod ports;
pub mod storage;

pub use code_store::{CodeStore, implementation_handle};
pub use error::{ProxyError, ProxyErrorKind};
pub use facade::{Facade, FacadeSnapshot, UpgradeRecord};
pub use ports::RegistryLogic;
pub use storage::{SlotKind, SlotStorage, StorageError, StorageLayout};
