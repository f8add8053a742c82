use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type Amount = u64;

/// Opaque caller identity handed to the core by the account layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

handle_type!(
    /// Address of an item record inside one registry.
    ItemHandle
);
handle_type!(
    /// Address of a deployed registry logic implementation.
    ImplementationHandle
);
handle_type!(
    /// Fixed address of a façade; this is the registry's public identity.
    FacadeHandle
);

/// Caller identity and attached value of one call, threaded through the
/// façade unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Identity,
    #[serde(default)]
    pub value: Amount,
}

impl CallContext {
    pub fn new(caller: Identity) -> Self {
        Self { caller, value: 0 }
    }

    pub fn with_value(caller: Identity, value: Amount) -> Self {
        Self { caller, value }
    }
}

/// Value leaving the façade's custody when a call commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTransfer {
    pub to: Identity,
    pub amount: Amount,
}

pub(crate) fn derive_handle(prefix: &str, canonical: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{:x}", digest);
    format!("{}:{}", prefix, &hex[..40])
}
