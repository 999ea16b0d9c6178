use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of [`crate::validation::validate_token_params`].
///
/// `errors` only holds the failing fields, keyed by their form name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: BTreeMap<&'static str, String>,
}

impl ValidationResult {
    pub(crate) fn from_errors(errors: BTreeMap<&'static str, String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }
}

/// Outcome of [`crate::validation::is_valid_image_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileValidation {
    pub(crate) const fn ok() -> Self {
        Self { valid: true, error: None }
    }

    pub(crate) fn rejected(error: impl Into<String>) -> Self {
        Self { valid: false, error: Some(error.into()) }
    }
}
