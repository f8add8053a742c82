use std::fs;

use itemhub::{
    deployment::Deployment,
    item::ItemState,
    registry::{CallOutput, RegistryCall, V2_VERSION},
    types::{CallContext, Identity},
};

use crate::{ADMIN, CLIENT, OWNER, create_items_call, created_handles, deployment_config};

#[test]
fn saved_snapshot_restores_storage_custody_and_implementation() {
    let config = deployment_config("persistence");
    let mut deployment = Deployment::new(&config).expect("deploys");

    let items = created_handles(
        deployment
            .call(
                &CallContext::new(Identity::new(OWNER)),
                &create_items_call(&[("widget", 500), ("gadget", 300)]),
            )
            .expect("owner batch succeeds"),
    );
    deployment
        .call(
            &CallContext::with_value(Identity::new(CLIENT), 300),
            &RegistryCall::TriggerPayment {
                item: items[1].clone(),
            },
        )
        .expect("payment succeeds");
    let (v2, _) = deployment
        .code()
        .resolve_version(V2_VERSION)
        .expect("v2 is deployed");
    deployment
        .upgrade(&Identity::new(ADMIN), &v2)
        .expect("admin upgrade succeeds");
    deployment.save().expect("snapshot saves");

    let mut restored = Deployment::restore(&config).expect("snapshot restores");
    assert_eq!(restored.facade().snapshot(), deployment.facade().snapshot());
    assert_eq!(restored.facade().custody(), 300);
    assert_eq!(restored.facade().implementation_version(), V2_VERSION);
    assert_eq!(restored.facade().upgrade_history().len(), 1);

    let output = restored
        .call(
            &CallContext::new(Identity::new(CLIENT)),
            &RegistryCall::GetItem {
                item: items[1].clone(),
            },
        )
        .expect("item read after restore")
        .output;
    let CallOutput::Item(record) = output else {
        panic!("expected item output");
    };
    assert_eq!(record.state, ItemState::Paid);
    assert_eq!(record.buyer, Some(Identity::new(CLIENT)));

    restored
        .call(
            &CallContext::new(Identity::new(OWNER)),
            &RegistryCall::TriggerDelivery {
                item: items[1].clone(),
            },
        )
        .expect("restored registry keeps working");

    if let Some(dir) = config.state_path.parent() {
        let _ = fs::remove_dir_all(dir);
    }
}

#[test]
fn corrupt_snapshot_fails_restore_instead_of_redeploying() {
    let config = deployment_config("persistence");
    let dir = config
        .state_path
        .parent()
        .expect("state path has a parent")
        .to_path_buf();
    fs::create_dir_all(&dir).expect("temp dir should exist");
    fs::write(&config.state_path, "{ not json").expect("corrupt snapshot written");

    let err = Deployment::restore(&config)
        .err()
        .expect("corrupt snapshot must fail");
    assert!(
        format!("{err:#}").contains("failed to parse facade snapshot"),
        "unexpected error: {err:#}"
    );

    let _ = fs::remove_dir_all(&dir);
}
