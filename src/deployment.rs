use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use crate::{
    admin::AdminController,
    config::DeploymentConfig,
    persistence::FacadePersistence,
    proxy::{CodeStore, Facade, ProxyError, UpgradeRecord},
    registry::{CallReceipt, ItemRegistry, ItemRegistryV2, RegistryCall, RegistryError},
    types::{CallContext, Identity, ImplementationHandle},
};

/// One running registry: the code store holding every known implementation,
/// the admin controller, and the façade it manages.
pub struct Deployment {
    code: CodeStore,
    admin: AdminController,
    facade: Facade,
    persistence: FacadePersistence,
}

impl Deployment {
    pub fn new(config: &DeploymentConfig) -> Result<Self> {
        let code = deploy_code_store()?;
        let admin = AdminController::new(config.admin.clone());
        let (implementation, _) = code
            .resolve_version(&config.implementation)
            .ok_or_else(|| {
                anyhow!(
                    "unknown registry implementation '{}'",
                    config.implementation
                )
            })?;

        let mut facade = Facade::deploy(&code, &implementation, admin.handle().clone())
            .context("failed to deploy registry facade")?;
        facade
            .call(
                &CallContext::new(config.owner.clone()),
                &RegistryCall::Initialize {
                    owner: config.owner.clone(),
                },
            )
            .context("failed to initialize registry facade")?;

        tracing::info!(
            target: "deployment",
            facade = %facade.handle(),
            implementation = %implementation,
            owner = %config.owner,
            admin = %config.admin,
            "deployment_created"
        );

        Ok(Self {
            code,
            admin,
            facade,
            persistence: FacadePersistence::new(config.state_path.clone()),
        })
    }

    /// Picks up the façade saved at `state_path`, or deploys a fresh one when
    /// nothing has been saved yet.
    pub fn restore(config: &DeploymentConfig) -> Result<Self> {
        let persistence = FacadePersistence::new(config.state_path.clone());
        let Some(snapshot) = persistence.load()? else {
            return Self::new(config);
        };

        let code = deploy_code_store()?;
        let admin = AdminController::new(config.admin.clone());
        if &snapshot.admin != admin.handle() {
            return Err(anyhow!(
                "snapshot at {} is managed by '{}', configured admin controller is '{}'",
                persistence.path().display(),
                snapshot.admin,
                admin.handle()
            ));
        }

        let facade = Facade::restore(snapshot, &code).with_context(|| {
            format!(
                "failed to restore facade from {}",
                persistence.path().display()
            )
        })?;
        tracing::info!(
            target: "deployment",
            facade = %facade.handle(),
            implementation = %facade.implementation(),
            version = facade.implementation_version(),
            upgrades = facade.upgrade_history().len(),
            "deployment_restored"
        );

        Ok(Self {
            code,
            admin,
            facade,
            persistence,
        })
    }

    pub fn code(&self) -> &CodeStore {
        &self.code
    }

    pub fn admin(&self) -> &AdminController {
        &self.admin
    }

    pub fn facade(&self) -> &Facade {
        &self.facade
    }

    pub fn call(
        &mut self,
        ctx: &CallContext,
        call: &RegistryCall,
    ) -> Result<CallReceipt, RegistryError> {
        self.facade.call(ctx, call)
    }

    /// Repoints the façade through the admin controller.
    pub fn upgrade(
        &mut self,
        caller: &Identity,
        implementation: &ImplementationHandle,
    ) -> Result<UpgradeRecord, ProxyError> {
        self.admin
            .upgrade(caller, &mut self.facade, implementation, &self.code)
    }

    pub fn save(&self) -> Result<(), ProxyError> {
        self.persistence.save(&self.facade.snapshot())
    }
}

fn deploy_code_store() -> Result<CodeStore> {
    let mut code = CodeStore::new();
    code.deploy(Arc::new(ItemRegistry::new()))
        .context("failed to deploy registry v1")?;
    code.deploy(Arc::new(ItemRegistryV2::new()))
        .context("failed to deploy registry v2")?;
    Ok(code)
}
