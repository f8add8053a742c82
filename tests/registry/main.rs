mod access;
mod lifecycle;

use itemhub::{
    config::DeploymentConfig,
    deployment::Deployment,
    item::ItemRecord,
    registry::{CallOutput, CallReceipt, RegistryCall, RegistryError, V1_VERSION},
    types::{Amount, CallContext, Identity, ItemHandle},
};
use uuid::Uuid;

pub const OWNER: &str = "0xowner";
pub const ADMIN: &str = "0xadmin";
pub const CLIENT: &str = "0xc1";
pub const OTHER_CLIENT: &str = "0xc2";

pub fn deployment() -> Deployment {
    let state_path = std::env::temp_dir()
        .join(format!("itemhub-registry-test-{}", Uuid::now_v7()))
        .join("facade.json");
    Deployment::new(&DeploymentConfig {
        owner: Identity::new(OWNER),
        admin: Identity::new(ADMIN),
        implementation: V1_VERSION.to_string(),
        state_path,
    })
    .expect("deployment should build")
}

pub fn call_as(
    deployment: &mut Deployment,
    caller: &str,
    call: RegistryCall,
) -> Result<CallReceipt, RegistryError> {
    deployment.call(&CallContext::new(Identity::new(caller)), &call)
}

pub fn pay(
    deployment: &mut Deployment,
    caller: &str,
    item: &ItemHandle,
    value: Amount,
) -> Result<CallReceipt, RegistryError> {
    deployment.call(
        &CallContext::with_value(Identity::new(caller), value),
        &RegistryCall::TriggerPayment { item: item.clone() },
    )
}

pub fn create_item(deployment: &mut Deployment, identifier: &str, price: Amount) -> ItemHandle {
    let receipt = call_as(
        deployment,
        OWNER,
        RegistryCall::CreateItem {
            identifier: identifier.to_string(),
            price,
        },
    )
    .expect("owner can create items");
    match receipt.output {
        CallOutput::ItemCreated(created) => created.item,
        other => panic!("unexpected create output: {other:?}"),
    }
}

pub fn record(deployment: &mut Deployment, item: &ItemHandle) -> ItemRecord {
    let receipt = call_as(
        deployment,
        CLIENT,
        RegistryCall::GetItem { item: item.clone() },
    )
    .expect("item reads are public");
    match receipt.output {
        CallOutput::Item(record) => record,
        other => panic!("unexpected item output: {other:?}"),
    }
}

pub fn balance(deployment: &mut Deployment) -> Amount {
    let receipt =
        call_as(deployment, OWNER, RegistryCall::GetBalance).expect("owner can read balance");
    match receipt.output {
        CallOutput::Balance(balance) => balance,
        other => panic!("unexpected balance output: {other:?}"),
    }
}

pub fn item_count(deployment: &mut Deployment) -> u64 {
    let receipt =
        call_as(deployment, CLIENT, RegistryCall::ItemCount).expect("item count is public");
    match receipt.output {
        CallOutput::ItemCount(count) => count,
        other => panic!("unexpected item count output: {other:?}"),
    }
}
