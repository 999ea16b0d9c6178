//! Webhook subscriptions and delivery of factory events to subscribers.

use crate::{
    errors::{AppError, ErrorCode},
    models::event::{TokenEvent, TokenEventKind},
    relay::metrics::RelayMetrics,
    validation::is_valid_contract_address,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{sync::RwLock, task::JoinSet};
use url::Url;

/// A registered webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: u64,
    pub url: Url,
    /// Only events about this token are delivered when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    /// Delivered event kinds, all of them when empty.
    #[serde(default)]
    pub events: Vec<TokenEventKind>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn matches(&self, event: &TokenEvent) -> bool {
        let kind_matches = self.events.is_empty() || self.events.contains(&event.kind);
        let token_matches = self.token_address.as_deref().map_or(true, |token| token == event.token_address());
        kind_matches && token_matches
    }
}

/// Body of a subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub url: String,
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub events: Option<Vec<TokenEventKind>>,
}

impl SubscribeRequest {
    fn validate(self) -> Result<(Url, Option<String>, Vec<TokenEventKind>), AppError> {
        let url = Url::parse(&self.url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| AppError::with_details(ErrorCode::InvalidInput, "Invalid webhook URL"))?;
        if let Some(token) = &self.token_address {
            if !is_valid_contract_address(token) {
                return Err(AppError::with_details(ErrorCode::InvalidInput, "Invalid token address"));
            }
        }
        let mut events = Vec::new();
        for kind in self.events.unwrap_or_default() {
            if !events.contains(&kind) {
                events.push(kind);
            }
        }
        Ok((url, self.token_address, events))
    }
}

/// In-memory registry of webhook subscriptions.
#[derive(Debug, Default)]
pub struct SubscriptionStore {
    next_id: AtomicU64,
    subscriptions: RwLock<BTreeMap<u64, Subscription>>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `request` and stores the resulting subscription.
    pub async fn subscribe(&self, request: SubscribeRequest) -> Result<Subscription, AppError> {
        let (url, token_address, events) = request.validate()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let subscription = Subscription { id, url, token_address, events, created_at: Utc::now() };
        self.subscriptions.write().await.insert(id, subscription.clone());
        tracing::info!(id, url = %subscription.url, "webhook subscribed");
        Ok(subscription)
    }

    /// Removes a subscription, returning false if it did not exist.
    pub async fn unsubscribe(&self, id: u64) -> bool {
        let removed = self.subscriptions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(id, "webhook unsubscribed");
        }
        removed
    }

    pub async fn list(&self) -> Vec<Subscription> {
        self.subscriptions.read().await.values().cloned().collect()
    }

    /// Subscriptions that should receive `event`.
    pub async fn matching(&self, event: &TokenEvent) -> Vec<Subscription> {
        self.subscriptions.read().await.values().filter(|sub| sub.matches(event)).cloned().collect()
    }
}

/// Payload posted to subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload<'a> {
    pub event: &'static str,
    pub data: &'a TokenEvent,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Posts events to every matching subscriber.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    store: Arc<SubscriptionStore>,
    metrics: RelayMetrics,
}

impl Dispatcher {
    pub fn new(store: Arc<SubscriptionStore>, metrics: RelayMetrics, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, store, metrics })
    }

    /// Delivers `event` to matching subscribers, one task per delivery.
    ///
    /// Each delivery is attempted once. Non 2xx answers count as failures.
    pub async fn dispatch(&self, event: &TokenEvent) -> DispatchReport {
        let subscribers = self.store.matching(event).await;
        if subscribers.is_empty() {
            tracing::debug!(event = %event.id, "no subscriber for event");
            return DispatchReport::default();
        }

        let payload = WebhookPayload { event: event.kind.webhook_name(), data: event, timestamp: Utc::now() };
        let body = match serde_json::to_vec(&payload) {
            Ok(body) => bytes::Bytes::from(body),
            Err(err) => {
                tracing::error!("failed to encode webhook payload: {err}");
                return DispatchReport { delivered: 0, failed: subscribers.len() };
            }
        };

        let mut deliveries = JoinSet::new();
        for subscription in subscribers {
            let request = self
                .http
                .post(subscription.url.clone())
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
            deliveries.spawn(async move {
                match request.send().await.and_then(reqwest::Response::error_for_status) {
                    Ok(_) => true,
                    Err(err) => {
                        tracing::warn!(id = subscription.id, url = %subscription.url, "webhook delivery failed: {err}");
                        false
                    }
                }
            });
        }

        let mut report = DispatchReport::default();
        while let Some(result) = deliveries.join_next().await {
            let delivered = result.unwrap_or(false);
            self.metrics.on_delivery(delivered);
            if delivered {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        tracing::info!(event = %event.id, kind = %event.kind, ?report, "dispatched event");
        report
    }
}
