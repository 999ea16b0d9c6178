//! Polls the Soroban RPC for token factory events and forwards them to the
//! webhook dispatcher.

use crate::{
    models::event::{TokenEvent, TokenEventKind},
    relay::{metrics::RelayMetrics, webhooks::Dispatcher},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::{sync::watch, task::JoinHandle};
use url::Url;

const PAGE_LIMIT: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum EventSourceError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("rpc response for {0} carries no result")]
    MissingResult(&'static str),
}

/// Where to resume reading events from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventCursor {
    /// First poll, read from this ledger onwards.
    Ledger(u64),
    /// Paging token returned by the previous poll.
    Token(String),
}

/// One page of factory events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    pub events: Vec<TokenEvent>,
    /// Cursor to resume from, if the source returned one.
    pub cursor: Option<String>,
}

/// A source of factory events.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn latest_ledger(&self) -> Result<u64, EventSourceError>;

    async fn events(&self, from: &EventCursor) -> Result<EventPage, EventSourceError>;
}

/// Reads events of one contract from a Soroban RPC server.
#[derive(Debug, Clone)]
pub struct SorobanEventSource {
    http: reqwest::Client,
    rpc_url: Url,
    contract_id: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct LatestLedger {
    sequence: u64,
}

#[derive(Debug, Deserialize)]
struct EventsResult {
    #[serde(default)]
    events: Vec<RawEvent>,
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: String,
    ledger: u64,
    contract_id: String,
    tx_hash: String,
    #[serde(default)]
    topic_json: Vec<Value>,
    #[serde(default)]
    value_json: Value,
}

impl RawEvent {
    fn into_token_event(self) -> Option<TokenEvent> {
        let topic = self.topic_json.first().map(decode_scval)?;
        let kind = TokenEventKind::from_topic(topic.as_str()?)?;
        Some(TokenEvent {
            id: self.id,
            kind,
            contract_id: self.contract_id,
            ledger: self.ledger,
            transaction_hash: self.tx_hash,
            value: decode_scval(&self.value_json),
        })
    }
}

/// Flattens the JSON rendering of a contract value.
///
/// Single key wrappers such as `{"symbol": "x"}` or `{"address": "C..."}`
/// collapse to their content, `vec` becomes an array and `map` an object
/// keyed by the decoded keys.
pub fn decode_scval(value: &Value) -> Value {
    match value {
        Value::Object(object) if object.len() == 1 => {
            let Some((tag, inner)) = object.iter().next() else {
                return Value::Null;
            };
            match (tag.as_str(), inner) {
                ("map", Value::Array(entries)) => {
                    let mut map = Map::new();
                    for entry in entries {
                        let key = match decode_scval(&entry["key"]) {
                            Value::String(key) => key,
                            other => other.to_string(),
                        };
                        map.insert(key, decode_scval(&entry["val"]));
                    }
                    Value::Object(map)
                }
                ("vec", Value::Array(items)) => Value::Array(items.iter().map(decode_scval).collect()),
                _ => decode_scval(inner),
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(decode_scval).collect()),
        other => other.clone(),
    }
}

impl SorobanEventSource {
    pub fn new(rpc_url: Url, contract_id: impl Into<String>) -> Result<Self, EventSourceError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, rpc_url, contract_id: contract_id.into() })
    }

    async fn call<T: DeserializeOwned>(&self, method: &'static str, params: Value) -> Result<T, EventSourceError> {
        let mut request = json!({ "jsonrpc": "2.0", "id": 1, "method": method });
        if !params.is_null() {
            request["params"] = params;
        }
        let response: RpcResponse<T> =
            self.http.post(self.rpc_url.clone()).json(&request).send().await?.error_for_status()?.json().await?;
        if let Some(error) = response.error {
            return Err(EventSourceError::Rpc { code: error.code, message: error.message });
        }
        response.result.ok_or(EventSourceError::MissingResult(method))
    }
}

#[async_trait]
impl EventSource for SorobanEventSource {
    async fn latest_ledger(&self) -> Result<u64, EventSourceError> {
        let ledger: LatestLedger = self.call("getLatestLedger", Value::Null).await?;
        Ok(ledger.sequence)
    }

    async fn events(&self, from: &EventCursor) -> Result<EventPage, EventSourceError> {
        let filters = json!([{ "type": "contract", "contractIds": [self.contract_id] }]);
        let params = match from {
            EventCursor::Ledger(ledger) => json!({
                "startLedger": ledger,
                "filters": filters,
                "pagination": { "limit": PAGE_LIMIT },
                "xdrFormat": "json",
            }),
            EventCursor::Token(cursor) => json!({
                "filters": filters,
                "pagination": { "cursor": cursor, "limit": PAGE_LIMIT },
                "xdrFormat": "json",
            }),
        };
        let result: EventsResult = self.call("getEvents", params).await?;
        let events = result.events.into_iter().filter_map(RawEvent::into_token_event).collect();
        Ok(EventPage { events, cursor: result.cursor })
    }
}

/// Background task that polls an [`EventSource`] and dispatches new events.
#[derive(Debug)]
pub struct StellarEventListener<S> {
    source: S,
    dispatcher: Dispatcher,
    metrics: RelayMetrics,
    interval: Duration,
}

impl<S> StellarEventListener<S>
where
    S: EventSource + 'static,
{
    pub const fn new(source: S, dispatcher: Dispatcher, metrics: RelayMetrics, interval: Duration) -> Self {
        Self { source, dispatcher, metrics, interval }
    }

    /// Spawns the polling loop. It stops once `shutdown` flips to true or
    /// its sender is dropped.
    pub fn start(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tracing::info!(interval = ?self.interval, "starting stellar event listener");
        tokio::spawn(async move {
            let mut cursor = None;
            loop {
                if let Err(err) = self.poll(&mut cursor).await {
                    tracing::error!("failed to poll factory events: {err}");
                }
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    () = tokio::time::sleep(self.interval) => {}
                }
            }
            tracing::info!("stellar event listener stopped");
        })
    }

    /// Reads the next page of events and dispatches them, returning how many
    /// were found. `cursor` is advanced past the dispatched events.
    pub async fn poll(&self, cursor: &mut Option<EventCursor>) -> Result<usize, EventSourceError> {
        let from = match cursor.take() {
            Some(from) => from,
            None => EventCursor::Ledger(self.source.latest_ledger().await?),
        };
        let page = match self.source.events(&from).await {
            Ok(page) => page,
            Err(err) => {
                *cursor = Some(from);
                return Err(err);
            }
        };

        for event in &page.events {
            self.metrics.on_event(event.kind.as_str());
            tracing::info!(id = %event.id, kind = %event.kind, token = event.token_address(), "factory event");
            self.dispatcher.dispatch(event).await;
        }

        *cursor = match page.cursor.or_else(|| page.events.last().map(|event| event.id.clone())) {
            Some(token) => Some(EventCursor::Token(token)),
            None => Some(from),
        };
        Ok(page.events.len())
    }
}
