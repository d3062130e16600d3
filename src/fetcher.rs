use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info};
use reqwest::{Client, Response};
use serde_json::Value;
use url::Url;

use crate::app_config::FetchConfig;
use crate::errors::FetchError;
use crate::file_utils::FileManager;

// @module: Catalog API client for TTML transcript assets

/// Token service issuing catalog bearer tokens
pub const TOKEN_SERVICE_URL: &str = "https://sf-api-token-service.itunes.apple.com/apiToken";

/// Root of the podcast catalog API
pub const CATALOG_BASE_URL: &str = "https://amp-api.podcasts.apple.com/v1/catalog";

/// Location of one episode's TTML transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptAsset {
    /// Opaque token, its last path segment doubles as the file name
    pub ttml_token: String,
    /// Signed download URL
    pub ttml_url: String,
}

impl TranscriptAsset {
    /// File name derived from the last segment of the token
    pub fn default_filename(&self) -> String {
        self.ttml_token
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("transcript.ttml")
            .to_string()
    }
}

/// URL of the token service request
pub fn token_url() -> Result<Url, FetchError> {
    Url::parse_with_params(
        TOKEN_SERVICE_URL,
        &[
            ("clientClass", "apple"),
            ("clientId", "com.apple.podcasts.macos"),
            ("os", "OS X"),
            ("osVersion", "15.5"),
            ("productVersion", "1.1.0"),
            ("version", "2"),
        ],
    )
    .map_err(|e| FetchError::RequestFailed(e.to_string()))
}

/// URL listing the transcripts of one episode
pub fn transcripts_url(country: &str, episode_id: u64, language: &str) -> Result<Url, FetchError> {
    let base = format!("{}/{}/podcast-episodes/{}/transcripts", CATALOG_BASE_URL, country, episode_id);
    Url::parse_with_params(
        &base,
        &[
            ("fields", "ttmlToken,ttmlAssetUrls"),
            ("include[podcast-episodes]", "podcast"),
            ("l", language),
            ("with", "entitlements"),
        ],
    )
    .map_err(|e| FetchError::RequestFailed(e.to_string()))
}

/// Pull `token` out of a token service response
pub fn parse_token_response(json: &Value) -> Result<String, FetchError> {
    json.get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FetchError::InvalidResponse("missing 'token' field".to_string()))
}

/// Pull the TTML token and asset URL out of `data[0].attributes`
pub fn parse_transcript_response(json: &Value) -> Result<TranscriptAsset, FetchError> {
    let attributes = json
        .get("data")
        .and_then(|data| data.get(0))
        .and_then(|first| first.get("attributes"))
        .ok_or_else(|| FetchError::InvalidResponse("no transcript data for episode".to_string()))?;

    let ttml_token = attributes
        .get("ttmlToken")
        .and_then(Value::as_str)
        .ok_or_else(|| FetchError::InvalidResponse("missing 'ttmlToken'".to_string()))?;

    let ttml_url = attributes
        .get("ttmlAssetUrls")
        .and_then(|urls| urls.get("ttml"))
        .and_then(Value::as_str)
        .ok_or_else(|| FetchError::InvalidResponse("missing 'ttmlAssetUrls.ttml'".to_string()))?;

    Ok(TranscriptAsset {
        ttml_token: ttml_token.to_string(),
        ttml_url: ttml_url.to_string(),
    })
}

/// Client for the token service, the catalog and asset downloads
pub struct TranscriptFetcher {
    /// HTTP client for API requests
    client: Client,
    config: FetchConfig,
}

impl TranscriptFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Configured token, or a fresh one from the token service
    pub async fn bearer_token(&self) -> Result<String, FetchError> {
        if !self.config.bearer_token.is_empty() {
            return Ok(self.config.bearer_token.clone());
        }

        if !self.config.has_signature() {
            return Err(FetchError::RequestFailed(
                "no bearer_token configured and no request signature to obtain one".to_string(),
            ));
        }

        self.request_bearer_token().await
    }

    /// Ask the token service for a bearer token
    pub async fn request_bearer_token(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(token_url()?)
            .header("x-request-timestamp", &self.config.request_timestamp)
            .header("X-Apple-ActionSignature", &self.config.action_signature)
            .header("X-Apple-Store-Front", &self.config.storefront)
            .send()
            .await?;

        let json: Value = Self::check_status(response).await?.json().await?;
        parse_token_response(&json)
    }

    /// Resolve where the TTML for `episode_id` can be downloaded
    pub async fn transcript_asset(&self, bearer_token: &str, episode_id: u64) -> Result<TranscriptAsset, FetchError> {
        info!("Fetching transcript for episode ID: {}", episode_id);

        let url = transcripts_url(&self.config.country, episode_id, &self.config.language)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(bearer_token)
            .send()
            .await?;

        let json: Value = Self::check_status(response).await?.json().await?;
        parse_transcript_response(&json)
    }

    /// Stream the asset to `output`, or to its default file name when `None`
    pub async fn download(&self, asset: &TranscriptAsset, output: Option<&Path>) -> Result<PathBuf> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(asset.default_filename()));

        info!("Downloading TTML from: {}", asset.ttml_url);

        let mut response = Self::check_status(self.client.get(&asset.ttml_url).send().await.map_err(FetchError::from)?)
            .await?;

        let mut file = FileManager::temp_file_beside(&output)?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await.map_err(FetchError::from)? {
            file.write_all(&chunk)
                .with_context(|| format!("Failed to save transcript to {:?}", output))?;
            written += chunk.len();
        }
        debug!("Downloaded {} bytes", written);

        // Nothing appears at `output` unless the whole body arrived
        FileManager::persist(file, &output)?;

        info!("Transcript saved to: {:?}", output);
        Ok(output)
    }

    /// Token, asset lookup and download in one call
    pub async fn fetch_transcript(&self, episode_id: u64, output: Option<&Path>) -> Result<PathBuf> {
        let token = self.bearer_token().await?;
        let asset = self.transcript_asset(&token, episode_id).await?;
        self.download(&asset, output).await
    }

    async fn check_status(response: Response) -> Result<Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("Catalog API error ({}): {}", status, message);
        Err(FetchError::ApiError {
            status_code: status.as_u16(),
            message,
        })
    }
}
