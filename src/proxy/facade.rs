use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    proxy::{
        code_store::CodeStore,
        error::{ProxyError, incompatible_layout, not_admin, unknown_implementation},
        ports::RegistryLogic,
        storage::SlotStorage,
    },
    registry::{
        error::{RegistryError, arithmetic_error},
        types::{CallReceipt, RegistryCall},
    },
    types::{Amount, CallContext, FacadeHandle, Identity, ImplementationHandle, derive_handle},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRecord {
    pub sequence: u64,
    pub from: ImplementationHandle,
    pub to: ImplementationHandle,
    pub to_version: String,
}

/// Serializable form of a façade: everything except the logic itself, which
/// is re-resolved from a code store on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacadeSnapshot {
    pub handle: FacadeHandle,
    pub admin: Identity,
    pub implementation: ImplementationHandle,
    pub storage: SlotStorage,
    pub custody: Amount,
    #[serde(default)]
    pub history: Vec<UpgradeRecord>,
}

/// Fixed-address front of the registry. Hosts the registry storage and
/// forwards every registry call to the currently installed logic.
pub struct Facade {
    handle: FacadeHandle,
    admin: Identity,
    implementation: ImplementationHandle,
    logic: Arc<dyn RegistryLogic>,
    storage: SlotStorage,
    custody: Amount,
    history: Vec<UpgradeRecord>,
}

impl Facade {
    /// Deploys a façade pointing at `implementation` with `admin` as the only
    /// identity allowed to repoint it. Storage starts empty under the
    /// implementation's layout; the registry still has to be initialized.
    pub fn deploy(
        code: &CodeStore,
        implementation: &ImplementationHandle,
        admin: Identity,
    ) -> Result<Self, ProxyError> {
        let logic = code.resolve(implementation).ok_or_else(|| {
            unknown_implementation(format!("no logic deployed at '{}'", implementation))
        })?;

        let canonical = serde_json::json!({
            "admin": admin.as_str(),
            "nonce": Uuid::now_v7().to_string(),
        });
        let handle = FacadeHandle::new(derive_handle("facade", &canonical));

        tracing::info!(
            target: "proxy",
            facade = %handle,
            implementation = %implementation,
            version = logic.version(),
            admin = %admin,
            "facade_deployed"
        );

        Ok(Self {
            handle,
            admin,
            implementation: implementation.clone(),
            storage: SlotStorage::new(logic.layout()),
            logic,
            custody: 0,
            history: Vec::new(),
        })
    }

    pub fn restore(snapshot: FacadeSnapshot, code: &CodeStore) -> Result<Self, ProxyError> {
        let logic = code.resolve(&snapshot.implementation).ok_or_else(|| {
            unknown_implementation(format!(
                "snapshot of '{}' points at unknown implementation '{}'",
                snapshot.handle, snapshot.implementation
            ))
        })?;
        let mut storage = snapshot.storage;
        storage
            .extend_layout(&logic.layout())
            .map_err(|err| incompatible_layout(err.to_string()))?;

        Ok(Self {
            handle: snapshot.handle,
            admin: snapshot.admin,
            implementation: snapshot.implementation,
            logic,
            storage,
            custody: snapshot.custody,
            history: snapshot.history,
        })
    }

    pub fn snapshot(&self) -> FacadeSnapshot {
        FacadeSnapshot {
            handle: self.handle.clone(),
            admin: self.admin.clone(),
            implementation: self.implementation.clone(),
            storage: self.storage.clone(),
            custody: self.custody,
            history: self.history.clone(),
        }
    }

    pub fn handle(&self) -> &FacadeHandle {
        &self.handle
    }

    pub fn admin(&self) -> &Identity {
        &self.admin
    }

    pub fn implementation(&self) -> &ImplementationHandle {
        &self.implementation
    }

    pub fn implementation_version(&self) -> &str {
        self.logic.version()
    }

    pub fn storage(&self) -> &SlotStorage {
        &self.storage
    }

    /// Value held at the façade address.
    pub fn custody(&self) -> Amount {
        self.custody
    }

    pub fn upgrade_history(&self) -> &[UpgradeRecord] {
        &self.history
    }

    /// Forwards one call to the active logic. Reads without attached value are
    /// answered against committed storage. Everything else runs against a
    /// working copy; the copy and the attached value are committed only when
    /// the call succeeds.
    pub fn call(
        &mut self,
        ctx: &CallContext,
        call: &RegistryCall,
    ) -> Result<CallReceipt, RegistryError> {
        let result = if call.is_read_only() && ctx.value == 0 {
            self.logic.execute(&mut self.storage, ctx, call)
        } else {
            self.execute_on_working_copy(ctx, call)
        };

        match &result {
            Ok(receipt) => tracing::debug!(
                target: "proxy",
                facade = %self.handle,
                call = call.name(),
                caller = %ctx.caller,
                value = ctx.value,
                events = receipt.events.len(),
                "call_committed"
            ),
            Err(err) => tracing::debug!(
                target: "proxy",
                facade = %self.handle,
                call = call.name(),
                caller = %ctx.caller,
                value = ctx.value,
                error_kind = ?err.kind,
                error = %err,
                "call_reverted"
            ),
        }
        result
    }

    fn execute_on_working_copy(
        &mut self,
        ctx: &CallContext,
        call: &RegistryCall,
    ) -> Result<CallReceipt, RegistryError> {
        let mut working = self.storage.clone();
        let receipt = self.logic.execute(&mut working, ctx, call)?;
        let custody = settle_custody(self.custody, ctx.value, &receipt)?;
        self.storage = working;
        self.custody = custody;
        Ok(receipt)
    }

    /// Privileged entry point, reachable only by the paired admin controller.
    /// Takes effect for every call made after it returns.
    pub fn upgrade(
        &mut self,
        caller: &Identity,
        new_implementation: &ImplementationHandle,
        code: &CodeStore,
    ) -> Result<UpgradeRecord, ProxyError> {
        if caller != &self.admin {
            return Err(not_admin(format!(
                "caller '{}' is not the admin of facade '{}'",
                caller, self.handle
            )));
        }

        let logic = code.resolve(new_implementation).ok_or_else(|| {
            unknown_implementation(format!("no logic deployed at '{}'", new_implementation))
        })?;

        self.storage
            .extend_layout(&logic.layout())
            .map_err(|err| {
                incompatible_layout(format!(
                    "'{}' cannot take over storage of facade '{}': {}",
                    logic.version(),
                    self.handle,
                    err
                ))
            })?;

        let record = UpgradeRecord {
            sequence: self.history.len() as u64 + 1,
            from: self.implementation.clone(),
            to: new_implementation.clone(),
            to_version: logic.version().to_string(),
        };
        tracing::info!(
            target: "proxy",
            facade = %self.handle,
            from = %record.from,
            to = %record.to,
            version = %record.to_version,
            "facade_upgraded"
        );

        self.implementation = new_implementation.clone();
        self.logic = logic;
        self.history.push(record.clone());
        Ok(record)
    }
}

fn settle_custody(
    custody: Amount,
    attached: Amount,
    receipt: &CallReceipt,
) -> Result<Amount, RegistryError> {
    let mut next = custody
        .checked_add(attached)
        .ok_or_else(|| arithmetic_error("facade custody overflow"))?;
    for transfer in &receipt.transfers {
        next = next.checked_sub(transfer.amount).ok_or_else(|| {
            arithmetic_error(format!(
                "facade custody {} cannot cover transfer of {} to '{}'",
                next, transfer.amount, transfer.to
            ))
        })?;
    }
    Ok(next)
}
