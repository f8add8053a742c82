use itemhub::{
    registry::{CallOutput, RegistryCall, RegistryErrorKind, RegistryEvent},
    types::{CallContext, Identity, ValueTransfer},
};

use crate::{CLIENT, OWNER, balance, call_as, create_item, deployment, item_count, pay};

#[test]
fn owner_only_operations_reject_other_callers() {
    let mut deployment = deployment();

    for call in [
        RegistryCall::CreateItem {
            identifier: "widget".to_string(),
            price: 500,
        },
        RegistryCall::GetBalance,
        RegistryCall::Withdraw { amount: 1 },
    ] {
        let err = call_as(&mut deployment, CLIENT, call.clone())
            .expect_err("non-owner call must fail");
        assert_eq!(
            err.kind,
            RegistryErrorKind::NotOwner,
            "{} should be owner-only",
            call.name()
        );
    }
    assert_eq!(item_count(&mut deployment), 0);
}

#[test]
fn registry_cannot_be_initialized_twice() {
    let mut deployment = deployment();

    let err = call_as(
        &mut deployment,
        CLIENT,
        RegistryCall::Initialize {
            owner: Identity::new(CLIENT),
        },
    )
    .expect_err("second initialize must fail");
    assert_eq!(err.kind, RegistryErrorKind::AlreadyInitialized);

    let receipt = call_as(&mut deployment, CLIENT, RegistryCall::Owner).expect("owner is public");
    assert_eq!(receipt.output, CallOutput::Owner(Some(Identity::new(OWNER))));
}

#[test]
fn value_attached_to_non_payable_call_is_rejected() {
    let mut deployment = deployment();

    let err = deployment
        .call(
            &CallContext::with_value(Identity::new(OWNER), 10),
            &RegistryCall::CreateItem {
                identifier: "widget".to_string(),
                price: 500,
            },
        )
        .expect_err("value on create must fail");
    assert_eq!(err.kind, RegistryErrorKind::InvalidRequest);
    assert_eq!(deployment.facade().custody(), 0);
}

#[test]
fn owner_withdraws_collected_balance_out_of_custody() {
    let mut deployment = deployment();
    let item = create_item(&mut deployment, "widget", 500);
    pay(&mut deployment, CLIENT, &item, 500).expect("payment succeeds");

    let receipt = call_as(&mut deployment, OWNER, RegistryCall::Withdraw { amount: 200 })
        .expect("owner withdraws");
    assert_eq!(receipt.output, CallOutput::Withdrawn(200));
    assert_eq!(
        receipt.events,
        vec![RegistryEvent::BalanceWithdrawn {
            to: Identity::new(OWNER),
            amount: 200,
        }]
    );
    assert_eq!(
        receipt.transfers,
        vec![ValueTransfer {
            to: Identity::new(OWNER),
            amount: 200,
        }]
    );
    assert_eq!(balance(&mut deployment), 300);
    assert_eq!(deployment.facade().custody(), 300);

    let err = call_as(&mut deployment, OWNER, RegistryCall::Withdraw { amount: 301 })
        .expect_err("overdraw must fail");
    assert_eq!(err.kind, RegistryErrorKind::InvalidRequest);
    let err = call_as(&mut deployment, OWNER, RegistryCall::Withdraw { amount: 0 })
        .expect_err("zero withdrawal must fail");
    assert_eq!(err.kind, RegistryErrorKind::InvalidRequest);
    assert_eq!(balance(&mut deployment), 300);
}
