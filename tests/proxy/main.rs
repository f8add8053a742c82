mod persistence;
mod upgrade;

use itemhub::{
    config::DeploymentConfig,
    registry::{CallOutput, CallReceipt, RegistryCall, V1_VERSION},
    types::Identity,
};
use uuid::Uuid;

pub const OWNER: &str = "0xowner";
pub const ADMIN: &str = "0xadmin";
pub const CLIENT: &str = "0xc1";

pub fn deployment_config(label: &str) -> DeploymentConfig {
    let state_path = std::env::temp_dir()
        .join(format!("itemhub-{label}-test-{}", Uuid::now_v7()))
        .join("facade.json");
    DeploymentConfig {
        owner: Identity::new(OWNER),
        admin: Identity::new(ADMIN),
        implementation: V1_VERSION.to_string(),
        state_path,
    }
}

pub fn create_items_call(entries: &[(&str, u64)]) -> RegistryCall {
    RegistryCall::CreateItems {
        identifiers: entries
            .iter()
            .map(|(identifier, _)| identifier.to_string())
            .collect(),
        prices: entries.iter().map(|(_, price)| *price).collect(),
    }
}

pub fn created_handles(receipt: CallReceipt) -> Vec<itemhub::types::ItemHandle> {
    match receipt.output {
        CallOutput::ItemsCreated(created) => created.into_iter().map(|entry| entry.item).collect(),
        other => panic!("unexpected batch output: {other:?}"),
    }
}
