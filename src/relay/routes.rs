use crate::{
    errors::{AppError, ErrorCode},
    prometheus_handler::gather,
    relay::{webhooks::SubscribeRequest, RelayError, RelayState},
};
use bytes::Bytes;
use chrono::Utc;
use http_body_util::{BodyExt, Full, Limited};
use hyper::{
    body::Body,
    header::{HeaderValue, CONTENT_TYPE},
    Method, Request, Response, StatusCode,
};
use serde::Serialize;
use serde_json::json;
use std::{convert::Infallible, error::Error as StdError, net::IpAddr, sync::Arc};

const MAX_BODY_SIZE: usize = 100 * 1024;

pub const ROUTE_NOT_FOUND: &str = "Route not found";
pub const SUBSCRIPTION_NOT_FOUND: &str = "Subscription not found";
pub const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Health,
    Metrics,
    ListWebhooks,
    Subscribe,
    /// `None` when the id is not a number.
    Unsubscribe(Option<u64>),
    NotFound,
}

impl Route {
    pub fn resolve(method: &Method, path: &str) -> Self {
        let path = path.strip_suffix('/').filter(|path| !path.is_empty()).unwrap_or(path);
        match (method, path) {
            (&Method::GET, "/health") => Self::Health,
            (&Method::GET, "/metrics") => Self::Metrics,
            (&Method::GET, "/api/webhooks") => Self::ListWebhooks,
            (&Method::POST, "/api/webhooks/subscribe") => Self::Subscribe,
            (&Method::DELETE, path) => match path.strip_prefix("/api/webhooks/") {
                Some(id) if !id.contains('/') => Self::Unsubscribe(id.parse().ok()),
                _ => Self::NotFound,
            },
            _ => Self::NotFound,
        }
    }

    /// Label used in request metrics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Metrics => "metrics",
            Self::ListWebhooks => "list_webhooks",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe(_) => "unsubscribe",
            Self::NotFound => "not_found",
        }
    }
}

#[derive(Debug, Serialize)]
struct Success<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T> Success<T> {
    const fn with(data: T) -> Self {
        Self { success: true, data: Some(data) }
    }
}

/// Answers one request from `client`.
///
/// Never fails: handler errors turn into a 500 response.
pub async fn handle<B>(
    state: Arc<RelayState>,
    client: IpAddr,
    request: Request<B>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let route = Route::resolve(request.method(), request.uri().path());
    let response = if state.rate_limiter.check(client) {
        match serve(&state, route, request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(route = route.name(), "unhandled error: {err}");
                failure(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
            }
        }
    } else {
        tracing::debug!(%client, "rate limited");
        failure(StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS)
    };
    state.metrics.on_request(route.name(), response.status().as_u16());
    Ok(response)
}

async fn serve<B>(state: &RelayState, route: Route, request: Request<B>) -> Result<Response<Full<Bytes>>, RelayError>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    match route {
        Route::Health => json_response(
            StatusCode::OK,
            &json!({
                "status": "ok",
                "timestamp": Utc::now().to_rfc3339(),
                "uptime": state.uptime().as_secs_f64(),
            }),
        ),
        Route::Metrics => {
            let exposition = gather(&state.registry)?;
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, exposition.content_type)
                .body(Full::new(exposition.body))?)
        }
        Route::ListWebhooks => json_response(StatusCode::OK, &Success::with(state.store.list().await)),
        Route::Subscribe => {
            let subscribe = match read_json::<SubscribeRequest, _>(request.into_body()).await {
                Ok(subscribe) => subscribe,
                Err(err) => return Ok(app_error(&err)),
            };
            match state.store.subscribe(subscribe).await {
                Ok(subscription) => json_response(StatusCode::CREATED, &Success::with(subscription)),
                Err(err) => Ok(app_error(&err)),
            }
        }
        Route::Unsubscribe(id) => {
            let removed = match id {
                Some(id) => state.store.unsubscribe(id).await,
                None => false,
            };
            if removed {
                json_response(StatusCode::OK, &Success::<()> { success: true, data: None })
            } else {
                Ok(failure(StatusCode::NOT_FOUND, SUBSCRIPTION_NOT_FOUND))
            }
        }
        Route::NotFound => Ok(failure(StatusCode::NOT_FOUND, ROUTE_NOT_FOUND)),
    }
}

async fn read_json<T, B>(body: B) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let bytes = Limited::new(body, MAX_BODY_SIZE)
        .collect()
        .await
        .map_err(|err| AppError::with_details(ErrorCode::InvalidInput, err.to_string()))?
        .to_bytes();
    serde_json::from_slice(&bytes).map_err(|err| AppError::with_details(ErrorCode::InvalidInput, err.to_string()))
}

fn json_response(status: StatusCode, body: &impl Serialize) -> Result<Response<Full<Bytes>>, RelayError> {
    let body = serde_json::to_vec(body)?;
    Ok(Response::builder().status(status).header(CONTENT_TYPE, "application/json").body(Full::new(Bytes::from(body)))?)
}

fn app_error(err: &AppError) -> Response<Full<Bytes>> {
    failure(err.code.http_status(), &err.to_string())
}

fn failure(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = json!({ "success": false, "error": message }).to_string();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
