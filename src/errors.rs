use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use std::{any::Any, error::Error as StdError, fmt};
use thiserror::Error;

/// Fallback message for failures that carry no usable description.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Closed set of user-facing error kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    WalletNotConnected,
    InsufficientBalance,
    InvalidInput,
    #[serde(rename = "IPFS_UPLOAD_FAILED")]
    IpfsUploadFailed,
    TransactionFailed,
    WalletRejected,
    NetworkError,
}

impl ErrorCode {
    pub const ALL: [Self; 7] = [
        Self::WalletNotConnected,
        Self::InsufficientBalance,
        Self::InvalidInput,
        Self::IpfsUploadFailed,
        Self::TransactionFailed,
        Self::WalletRejected,
        Self::NetworkError,
    ];

    /// The fixed message shown to the user for this kind.
    pub const fn message(self) -> &'static str {
        match self {
            Self::WalletNotConnected => "Please connect your wallet to continue",
            Self::InsufficientBalance => "Insufficient XLM balance for transaction fees",
            Self::InvalidInput => "Please check your input and try again",
            Self::IpfsUploadFailed => "Failed to upload image to IPFS. Please try again",
            Self::TransactionFailed => "Transaction failed. Please try again",
            Self::WalletRejected => "Transaction was cancelled",
            Self::NetworkError => "Network error. Please check your connection",
        }
    }

    /// HTTP status the relay answers with when a request fails with this kind.
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::WalletNotConnected => StatusCode::UNAUTHORIZED,
            Self::InsufficientBalance => StatusCode::PAYMENT_REQUIRED,
            Self::WalletRejected => StatusCode::CONFLICT,
            Self::IpfsUploadFailed | Self::TransactionFailed => StatusCode::BAD_GATEWAY,
            Self::NetworkError => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// A failure ready to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        Self { code, message: code.message().to_string(), details: None }
    }

    pub fn with_details(code: ErrorCode, details: impl Into<String>) -> Self {
        Self { details: Some(details.into()), ..Self::new(code) }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {details}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl From<ErrorCode> for AppError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

/// Transport failures become network errors, anything else reported by the
/// remote side is a failed transaction.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        let code = if error.is_timeout() || error.is_connect() || error.is_request() {
            ErrorCode::NetworkError
        } else {
            ErrorCode::TransactionFailed
        };
        Self::with_details(code, error.to_string())
    }
}

fn as_app_error(error: &dyn Any) -> Option<&AppError> {
    if let Some(app) = error.downcast_ref::<AppError>() {
        return Some(app);
    }
    if let Some(app) = error.downcast_ref::<Box<AppError>>() {
        return Some(app);
    }
    if let Some(boxed) = error.downcast_ref::<Box<dyn StdError + Send + Sync>>() {
        return boxed.downcast_ref::<AppError>();
    }
    error.downcast_ref::<eyre::Report>().and_then(eyre::Report::downcast_ref::<AppError>)
}

/// Returns true if the caught value is an [`AppError`], directly or boxed.
pub fn is_app_error(error: &dyn Any) -> bool {
    as_app_error(error).is_some()
}

/// Extracts a displayable message from any caught value.
///
/// Tries an [`AppError`] first, then common error types, then plain strings,
/// and finally falls back to [`UNKNOWN_ERROR_MESSAGE`].
pub fn error_message(error: &dyn Any) -> String {
    if let Some(app) = as_app_error(error) {
        return app.to_string();
    }
    if let Some(err) = error.downcast_ref::<Box<dyn StdError + Send + Sync>>() {
        return err.to_string();
    }
    if let Some(err) = error.downcast_ref::<Box<dyn StdError>>() {
        return err.to_string();
    }
    if let Some(err) = error.downcast_ref::<eyre::Report>() {
        return err.to_string();
    }
    if let Some(err) = error.downcast_ref::<std::io::Error>() {
        return err.to_string();
    }
    if let Some(err) = error.downcast_ref::<reqwest::Error>() {
        return err.to_string();
    }
    if let Some(message) = error.downcast_ref::<String>() {
        return message.clone();
    }
    if let Some(message) = error.downcast_ref::<&'static str>() {
        return (*message).to_string();
    }
    UNKNOWN_ERROR_MESSAGE.to_string()
}
