//! Client for the Pinata pinning service.
//!
//! Uploads the token image, then a metadata document pointing at it.

use crate::{
    config::IpfsConfig,
    errors::{AppError, ErrorCode},
    models::token::ImageFile,
    validation::is_valid_image_file,
};
use reqwest::{multipart, Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Descriptive fields pinned alongside the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpfsMetadata {
    pub name: String,
    pub description: String,
}

/// Content identifiers and gateway links of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpfsUploadResult {
    pub image_cid: String,
    pub image_url: String,
    pub metadata_cid: String,
    pub metadata_url: String,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Clone)]
pub struct PinataClient {
    http: Client,
    config: IpfsConfig,
}

impl PinataClient {
    pub fn new(config: IpfsConfig) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AppError::with_details(ErrorCode::NetworkError, err.to_string()))?;
        Ok(Self { http, config })
    }

    /// Public gateway link for a content identifier.
    pub fn gateway_url(&self, cid: &str) -> Result<Url, AppError> {
        self.config.gateway_url.join(cid).map_err(|err| AppError::with_details(ErrorCode::InvalidInput, err.to_string()))
    }

    /// Validates and pins `image`, then pins the metadata document referencing it.
    pub async fn upload(&self, image: &ImageFile, metadata: &IpfsMetadata) -> Result<IpfsUploadResult, AppError> {
        if let Some(error) = is_valid_image_file(image).error {
            return Err(AppError::with_details(ErrorCode::InvalidInput, error));
        }
        if !self.config.has_credentials() {
            return Err(AppError::with_details(ErrorCode::IpfsUploadFailed, "missing pinning service credentials"));
        }

        let image_cid = self.pin_file(image).await?;
        tracing::info!(cid = %image_cid, size = image.size(), "pinned token image");

        let document = serde_json::json!({
            "pinataContent": {
                "name": metadata.name,
                "description": metadata.description,
                "image": format!("ipfs://{image_cid}"),
            },
            "pinataMetadata": { "name": format!("{}-metadata.json", metadata.name) },
        });
        let metadata_cid = self.pin(self.post("pinning/pinJSONToIPFS")?.json(&document)).await?;
        tracing::info!(cid = %metadata_cid, "pinned token metadata");

        Ok(IpfsUploadResult {
            image_url: self.gateway_url(&image_cid)?.to_string(),
            metadata_url: self.gateway_url(&metadata_cid)?.to_string(),
            image_cid,
            metadata_cid,
        })
    }

    /// Removes a pin.
    pub async fn unpin(&self, cid: &str) -> Result<(), AppError> {
        let url = self.endpoint(&format!("pinning/unpin/{cid}"))?;
        let response = self.authorized(self.http.delete(url)).send().await?;
        if !response.status().is_success() {
            return Err(AppError::with_details(
                ErrorCode::IpfsUploadFailed,
                format!("unpin {cid} failed with status {}", response.status()),
            ));
        }
        Ok(())
    }

    /// Returns true if the service accepts the configured credentials.
    pub async fn test_connection(&self) -> bool {
        let Ok(url) = self.endpoint("data/testAuthentication") else {
            return false;
        };
        match self.authorized(self.http.get(url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!("pinning service unreachable: {err}");
                false
            }
        }
    }

    async fn pin_file(&self, image: &ImageFile) -> Result<String, AppError> {
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.mime_type)
            .map_err(|err| AppError::with_details(ErrorCode::InvalidInput, err.to_string()))?;
        let form = multipart::Form::new().part("file", part);
        self.pin(self.post("pinning/pinFileToIPFS")?.multipart(form)).await
    }

    async fn pin(&self, request: RequestBuilder) -> Result<String, AppError> {
        let response = request
            .send()
            .await
            .map_err(|err| AppError::with_details(ErrorCode::IpfsUploadFailed, err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::with_details(ErrorCode::IpfsUploadFailed, format!("{status}: {body}")));
        }
        let pinned: PinResponse =
            response.json().await.map_err(|err| AppError::with_details(ErrorCode::IpfsUploadFailed, err.to_string()))?;
        Ok(pinned.ipfs_hash)
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, AppError> {
        Ok(self.authorized(self.http.post(self.endpoint(path)?)))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("pinata_api_key", &self.config.api_key).header("pinata_secret_api_key", &self.config.api_secret)
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.config.api_url.join(path).map_err(|err| AppError::with_details(ErrorCode::InvalidInput, err.to_string()))
    }
}
