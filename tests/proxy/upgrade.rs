use std::sync::Arc;

use itemhub::{
    admin::AdminController,
    proxy::{
        CodeStore, Facade, ProxyErrorKind, RegistryLogic, SlotKind, SlotStorage, StorageLayout,
    },
    registry::{
        CallOutput, CallReceipt, ItemRegistry, ItemRegistryV2, RegistryCall, RegistryError,
        RegistryErrorKind, V1_VERSION, V2_VERSION,
        error::unsupported_call,
    },
    types::{CallContext, Identity, ImplementationHandle},
};

use crate::{ADMIN, CLIENT, OWNER, create_items_call, created_handles, deployment_config};

/// Declares the v1 slots in a different order.
struct ShuffledRegistry;

impl RegistryLogic for ShuffledRegistry {
    fn version(&self) -> &str {
        "item-registry/shuffled"
    }

    fn layout(&self) -> StorageLayout {
        StorageLayout::new()
            .with_slot("owner", SlotKind::Identity)
            .with_slot("initialized", SlotKind::Flag)
            .with_slot("items", SlotKind::ItemTable)
            .with_slot("accumulated_balance", SlotKind::Amount)
            .with_slot("withdrawn_total", SlotKind::Amount)
    }

    fn execute(
        &self,
        _storage: &mut SlotStorage,
        _ctx: &CallContext,
        call: &RegistryCall,
    ) -> Result<CallReceipt, RegistryError> {
        Err(unsupported_call(format!("shuffled logic ignores '{}'", call.name())))
    }
}

fn owner_ctx() -> CallContext {
    CallContext::new(Identity::new(OWNER))
}

fn read(facade: &mut Facade, call: RegistryCall) -> CallOutput {
    facade
        .call(&CallContext::new(Identity::new(CLIENT)), &call)
        .expect("public read succeeds")
        .output
}

#[test]
fn given_v1_registry_with_items_when_admin_upgrades_then_v2_reads_same_state() {
    let mut deployment =
        itemhub::deployment::Deployment::new(&deployment_config("upgrade")).expect("deploys");
    let items = created_handles(
        deployment
            .call(&owner_ctx(), &create_items_call(&[("widget", 500), ("gadget", 300)]))
            .expect("owner batch succeeds"),
    );
    deployment
        .call(
            &CallContext::with_value(Identity::new(CLIENT), 500),
            &RegistryCall::TriggerPayment {
                item: items[0].clone(),
            },
        )
        .expect("payment succeeds");

    let mut before = Vec::new();
    for item in &items {
        before.push(
            deployment
                .call(
                    &CallContext::new(Identity::new(CLIENT)),
                    &RegistryCall::GetItem { item: item.clone() },
                )
                .expect("item read")
                .output,
        );
    }
    let custody_before = deployment.facade().custody();
    let facade_handle = deployment.facade().handle().clone();

    let (v2, _) = deployment
        .code()
        .resolve_version(V2_VERSION)
        .expect("v2 is deployed");
    deployment
        .upgrade(&Identity::new(ADMIN), &v2)
        .expect("admin upgrade succeeds");
    assert_eq!(deployment.facade().implementation_version(), V2_VERSION);
    assert_eq!(deployment.facade().handle(), &facade_handle);

    for (item, expected) in items.iter().zip(&before) {
        let output = deployment
            .call(
                &CallContext::new(Identity::new(CLIENT)),
                &RegistryCall::GetItem { item: item.clone() },
            )
            .expect("item read through v2")
            .output;
        assert_eq!(&output, expected);
    }
    assert_eq!(
        deployment
            .call(&CallContext::new(Identity::new(CLIENT)), &RegistryCall::Owner)
            .expect("owner read through v2")
            .output,
        CallOutput::Owner(Some(Identity::new(OWNER)))
    );
    assert_eq!(
        deployment
            .call(&owner_ctx(), &RegistryCall::GetBalance)
            .expect("balance read through v2")
            .output,
        CallOutput::Balance(500)
    );
    assert_eq!(deployment.facade().custody(), custody_before);
}

#[test]
fn vat_entry_points_appear_only_after_upgrade() {
    let mut deployment =
        itemhub::deployment::Deployment::new(&deployment_config("upgrade")).expect("deploys");

    let err = deployment
        .call(&owner_ctx(), &RegistryCall::SetVat { vat: 20 })
        .expect_err("v1 has no vat");
    assert_eq!(err.kind, RegistryErrorKind::UnsupportedCall);

    let (v2, _) = deployment
        .code()
        .resolve_version(V2_VERSION)
        .expect("v2 is deployed");
    deployment
        .upgrade(&Identity::new(ADMIN), &v2)
        .expect("admin upgrade succeeds");

    assert_eq!(
        deployment
            .call(&CallContext::new(Identity::new(CLIENT)), &RegistryCall::Vat)
            .expect("vat is public")
            .output,
        CallOutput::Vat(0)
    );
    deployment
        .call(&owner_ctx(), &RegistryCall::SetVat { vat: 20 })
        .expect("owner sets vat");
    assert_eq!(
        deployment
            .call(&CallContext::new(Identity::new(CLIENT)), &RegistryCall::Vat)
            .expect("vat is public")
            .output,
        CallOutput::Vat(20)
    );
}

#[test]
fn upgrade_is_refused_for_non_admin_unknown_and_incompatible_logic() {
    let mut code = CodeStore::new();
    let v1 = code
        .deploy(Arc::new(ItemRegistry::new()))
        .expect("v1 deploys");
    code.deploy(Arc::new(ItemRegistryV2::new()))
        .expect("v2 deploys");
    let shuffled = code
        .deploy(Arc::new(ShuffledRegistry))
        .expect("shuffled logic deploys");

    let controller = AdminController::new(Identity::new(ADMIN));
    let mut facade =
        Facade::deploy(&code, &v1, controller.handle().clone()).expect("facade deploys");
    facade
        .call(
            &owner_ctx(),
            &RegistryCall::Initialize {
                owner: Identity::new(OWNER),
            },
        )
        .expect("initialize succeeds");
    let before = facade.snapshot();

    let err = controller
        .upgrade(&Identity::new(CLIENT), &mut facade, &shuffled, &code)
        .expect_err("non-admin must be rejected");
    assert_eq!(err.kind, ProxyErrorKind::NotAdmin);

    let err = facade
        .upgrade(&Identity::new(ADMIN), &shuffled, &code)
        .expect_err("the admin identity itself is not the controller");
    assert_eq!(err.kind, ProxyErrorKind::NotAdmin);

    let err = controller
        .upgrade(
            &Identity::new(ADMIN),
            &mut facade,
            &ImplementationHandle::new("impl:0000"),
            &code,
        )
        .expect_err("unknown implementation must be rejected");
    assert_eq!(err.kind, ProxyErrorKind::UnknownImplementation);

    let err = controller
        .upgrade(&Identity::new(ADMIN), &mut facade, &shuffled, &code)
        .expect_err("reordered layout must be rejected");
    assert_eq!(err.kind, ProxyErrorKind::IncompatibleLayout);

    assert_eq!(facade.snapshot(), before);
    assert_eq!(facade.implementation_version(), V1_VERSION);
    assert_eq!(
        read(&mut facade, RegistryCall::Owner),
        CallOutput::Owner(Some(Identity::new(OWNER)))
    );
}

#[test]
fn upgrades_are_recorded_in_order() {
    let mut code = CodeStore::new();
    let v1 = code
        .deploy(Arc::new(ItemRegistry::new()))
        .expect("v1 deploys");
    let v2 = code
        .deploy(Arc::new(ItemRegistryV2::new()))
        .expect("v2 deploys");

    let controller = AdminController::new(Identity::new(ADMIN));
    let mut facade =
        Facade::deploy(&code, &v1, controller.handle().clone()).expect("facade deploys");

    controller
        .upgrade(&Identity::new(ADMIN), &mut facade, &v2, &code)
        .expect("v1 -> v2");
    controller
        .upgrade(&Identity::new(ADMIN), &mut facade, &v2, &code)
        .expect("re-pointing at the same logic is allowed");

    let history = facade.upgrade_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sequence, 1);
    assert_eq!(history[0].from, v1);
    assert_eq!(history[0].to, v2);
    assert_eq!(history[1].sequence, 2);
    assert_eq!(history[1].from, v2);
    assert_eq!(controller.implementation_of(&facade), &v2);
}
