use crate::validation::{is_valid_decimals, INVALID_DECIMALS};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Parameters collected from the deployment form and handed to the factory contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDeployParams {
    pub name: String,
    pub symbol: String,
    /// Any JSON number is read; values that are not whole numbers in
    /// `[0, 18]` are rejected with the decimals validation message.
    #[serde(deserialize_with = "deserialize_decimals")]
    pub decimals: u32,
    /// Decimal string, kept as text so arbitrarily large supplies survive.
    pub initial_supply: String,
    pub admin_wallet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TokenMetadata>,
}

impl TokenDeployParams {
    /// Returns true if the deployment carries metadata, which raises the fee.
    pub const fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }
}

fn deserialize_decimals<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let decimals = f64::deserialize(deserializer)?;
    if !is_valid_decimals(decimals) {
        return Err(de::Error::custom(INVALID_DECIMALS));
    }
    Ok(decimals as u32)
}

/// Optional description and image attached to a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageFile>,
}

/// An image picked by the user, before it is pinned.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime_type: mime_type.into(), bytes }
    }

    /// Size of the image in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}
