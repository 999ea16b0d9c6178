use crate::constants::{BURN_EVENT_TOPIC, DEPLOY_EVENT_TOPIC};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of factory event forwarded to webhook subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenEventKind {
    #[serde(alias = "token.deployed")]
    Deployed,
    #[serde(alias = "token.burned")]
    Burned,
}

impl TokenEventKind {
    /// Maps the first topic symbol of a factory event to its kind.
    pub fn from_topic(topic: &str) -> Option<Self> {
        match topic {
            DEPLOY_EVENT_TOPIC => Some(Self::Deployed),
            BURN_EVENT_TOPIC => Some(Self::Burned),
            _ => None,
        }
    }

    /// Name of the event in webhook payloads.
    pub const fn webhook_name(self) -> &'static str {
        match self {
            Self::Deployed => "token.deployed",
            Self::Burned => "token.burned",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deployed => "deployed",
            Self::Burned => "burned",
        }
    }
}

impl fmt::Display for TokenEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A factory event observed on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEvent {
    /// Soroban RPC event id, unique and ordered.
    pub id: String,
    pub kind: TokenEventKind,
    /// The contract that emitted the event.
    pub contract_id: String,
    pub ledger: u64,
    pub transaction_hash: String,
    /// Event body as decoded by the RPC.
    pub value: serde_json::Value,
}

impl TokenEvent {
    /// Address of the token the event is about.
    ///
    /// The factory puts it under `token` in the event body; events emitted
    /// by the token contract itself fall back to the emitter.
    pub fn token_address(&self) -> &str {
        self.value.get("token").and_then(serde_json::Value::as_str).unwrap_or(&self.contract_id)
    }
}
