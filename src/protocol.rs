use serde::{Deserialize, Serialize};

use crate::{
    proxy::{ProxyError, ProxyErrorKind, UpgradeRecord},
    registry::{CallReceipt, RegistryCall, RegistryError, RegistryErrorKind},
    types::{Amount, CallContext, Identity, ImplementationHandle},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Request(ClientRequest),
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    Call {
        ctx: CallContext,
        call: RegistryCall,
    },
    Upgrade {
        caller: Identity,
        implementation: ImplementationHandle,
    },
}

impl ClientRequest {
    /// Whether a successful request changed the façade and must be saved.
    pub fn mutates(&self) -> bool {
        match self {
            ClientRequest::Call { call, .. } => !call.is_read_only(),
            ClientRequest::Upgrade { .. } => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("'{message_type}' message is missing field '{field}'")]
    MissingField {
        message_type: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: WireMessageType,
    #[serde(default)]
    caller: Option<Identity>,
    #[serde(default)]
    value: Option<Amount>,
    #[serde(default)]
    call: Option<RegistryCall>,
    #[serde(default)]
    implementation: Option<ImplementationHandle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WireMessageType {
    Call,
    Upgrade,
    Exit,
}

pub fn parse_client_message(line: &str) -> Result<ClientMessage, ProtocolError> {
    let wire: WireMessage = serde_json::from_str(line)?;
    let message = match wire.kind {
        WireMessageType::Exit => ClientMessage::Exit,
        WireMessageType::Call => {
            let caller = required("call", "caller", wire.caller)?;
            let call = required("call", "call", wire.call)?;
            ClientMessage::Request(ClientRequest::Call {
                ctx: CallContext::with_value(caller, wire.value.unwrap_or(0)),
                call,
            })
        }
        WireMessageType::Upgrade => ClientMessage::Request(ClientRequest::Upgrade {
            caller: required("upgrade", "caller", wire.caller)?,
            implementation: required("upgrade", "implementation", wire.implementation)?,
        }),
    };
    Ok(message)
}

fn required<T>(
    message_type: &'static str,
    field: &'static str,
    value: Option<T>,
) -> Result<T, ProtocolError> {
    value.ok_or(ProtocolError::MissingField {
        message_type,
        field,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseErrorKind {
    Registry(RegistryErrorKind),
    Proxy(ProxyErrorKind),
    Protocol(ProtocolErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolErrorKind {
    InvalidMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseError {
    pub kind: ResponseErrorKind,
    pub message: String,
}

/// One NDJSON response line. Exactly one of `receipt`, `upgrade` or `error`
/// is present; an `exit` acknowledgement carries none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<CallReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<UpgradeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl ServerResponse {
    pub fn acknowledged() -> Self {
        Self {
            ok: true,
            receipt: None,
            upgrade: None,
            error: None,
        }
    }

    pub fn receipt(receipt: CallReceipt) -> Self {
        Self {
            receipt: Some(receipt),
            ..Self::acknowledged()
        }
    }

    pub fn upgraded(record: UpgradeRecord) -> Self {
        Self {
            upgrade: Some(record),
            ..Self::acknowledged()
        }
    }

    pub fn failure(kind: ResponseErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            receipt: None,
            upgrade: None,
            error: Some(ResponseError {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&RegistryError> for ServerResponse {
    fn from(err: &RegistryError) -> Self {
        Self::failure(ResponseErrorKind::Registry(err.kind), err.message.clone())
    }
}

impl From<&ProxyError> for ServerResponse {
    fn from(err: &ProxyError) -> Self {
        Self::failure(ResponseErrorKind::Proxy(err.kind), err.message.clone())
    }
}

impl From<&ProtocolError> for ServerResponse {
    fn from(err: &ProtocolError) -> Self {
        Self::failure(
            ResponseErrorKind::Protocol(ProtocolErrorKind::InvalidMessage),
            err.to_string(),
        )
    }
}
