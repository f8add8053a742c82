use itemhub::{
    item::ItemState,
    registry::{CallOutput, RegistryCall, RegistryErrorKind, RegistryEvent},
    types::{Identity, ItemHandle},
};

use crate::{
    CLIENT, OTHER_CLIENT, OWNER, balance, call_as, create_item, deployment, item_count, pay, record,
};

#[test]
fn given_widget_when_paid_then_delivered_then_state_and_balance_follow_lifecycle() {
    let mut deployment = deployment();
    let item = create_item(&mut deployment, "widget", 500);

    let created = record(&mut deployment, &item);
    assert_eq!(created.identifier, "widget");
    assert_eq!(created.price, 500);
    assert_eq!(created.state, ItemState::Created);
    assert_eq!(created.state.code(), 0);

    let receipt = pay(&mut deployment, CLIENT, &item, 500).expect("exact payment succeeds");
    assert_eq!(
        receipt.output,
        CallOutput::StateChanged {
            item: item.clone(),
            state: ItemState::Paid,
        }
    );
    assert_eq!(record(&mut deployment, &item).state.code(), 1);
    assert_eq!(balance(&mut deployment), 500);

    let err = pay(&mut deployment, OTHER_CLIENT, &item, 500).expect_err("second payment fails");
    assert_eq!(err.kind, RegistryErrorKind::InvalidState);
    assert_eq!(balance(&mut deployment), 500);
    assert_eq!(deployment.facade().custody(), 500);

    let receipt = call_as(
        &mut deployment,
        OWNER,
        RegistryCall::TriggerDelivery { item: item.clone() },
    )
    .expect("owner delivers");
    assert_eq!(
        receipt.events,
        vec![RegistryEvent::ItemStateChanged {
            item: item.clone(),
            state: ItemState::Delivered,
        }]
    );

    let err = call_as(
        &mut deployment,
        CLIENT,
        RegistryCall::TriggerDelivery { item: item.clone() },
    )
    .expect_err("non-owner cannot deliver");
    assert_eq!(err.kind, RegistryErrorKind::NotOwner);
    assert_eq!(record(&mut deployment, &item).state.code(), 2);
}

#[test]
fn payment_records_actual_payer_and_escrow() {
    let mut deployment = deployment();
    let item = create_item(&mut deployment, "lamp", 120);

    pay(&mut deployment, OTHER_CLIENT, &item, 120).expect("payment succeeds");

    let paid = record(&mut deployment, &item);
    assert_eq!(paid.buyer, Some(Identity::new(OTHER_CLIENT)));
    assert_eq!(paid.escrowed_value, 120);
}

#[test]
fn wrong_amount_leaves_item_balance_and_custody_unchanged() {
    let mut deployment = deployment();
    let item = create_item(&mut deployment, "widget", 500);

    let err = pay(&mut deployment, CLIENT, &item, 499).expect_err("underpayment fails");
    assert_eq!(err.kind, RegistryErrorKind::AmountMismatch);
    let err = pay(&mut deployment, CLIENT, &item, 501).expect_err("overpayment fails");
    assert_eq!(err.kind, RegistryErrorKind::AmountMismatch);

    let unpaid = record(&mut deployment, &item);
    assert_eq!(unpaid.state, ItemState::Created);
    assert_eq!(unpaid.buyer, None);
    assert_eq!(balance(&mut deployment), 0);
    assert_eq!(deployment.facade().custody(), 0);
}

#[test]
fn owner_cannot_pay_for_own_item() {
    let mut deployment = deployment();
    let item = create_item(&mut deployment, "widget", 500);

    let err = pay(&mut deployment, OWNER, &item, 500).expect_err("owner payment fails");
    assert_eq!(err.kind, RegistryErrorKind::NotOwner);
    assert_eq!(record(&mut deployment, &item).state, ItemState::Created);
}

#[test]
fn delivery_requires_payment_first() {
    let mut deployment = deployment();
    let item = create_item(&mut deployment, "widget", 500);

    let err = call_as(
        &mut deployment,
        OWNER,
        RegistryCall::TriggerDelivery { item: item.clone() },
    )
    .expect_err("unpaid item cannot be delivered");
    assert_eq!(err.kind, RegistryErrorKind::InvalidState);
    assert_eq!(record(&mut deployment, &item).state, ItemState::Created);
}

#[test]
fn unknown_item_is_not_found() {
    let mut deployment = deployment();
    let missing = ItemHandle::new("item:missing");

    let err = pay(&mut deployment, CLIENT, &missing, 1).expect_err("unknown item fails");
    assert_eq!(err.kind, RegistryErrorKind::NotFound);
    assert_eq!(deployment.facade().custody(), 0);
}

#[test]
fn empty_identifier_is_rejected_without_side_effects() {
    let mut deployment = deployment();

    let err = call_as(
        &mut deployment,
        OWNER,
        RegistryCall::CreateItem {
            identifier: String::new(),
            price: 10,
        },
    )
    .expect_err("empty identifier fails");
    assert_eq!(err.kind, RegistryErrorKind::InvalidRequest);
    assert_eq!(item_count(&mut deployment), 0);
    assert_eq!(deployment.facade().custody(), 0);
}

#[test]
fn whitespace_identifier_is_accepted_as_given() {
    let mut deployment = deployment();
    let item = create_item(&mut deployment, " ", 10);

    assert_eq!(record(&mut deployment, &item).identifier, " ");
    assert_eq!(item_count(&mut deployment), 1);
}
