use super::{material_path, preview_path, ErrorBody, MaterialDetail, ParagraphPreview, PreviewBackend, SlidePreview};
use crate::config::PreviewConfig;
use crate::error::{PreviewError, Result};
use crate::labels::UNKNOWN_ERROR;
use reqwest::header::COOKIE;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// `reqwest` client for the materials backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &PreviewConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path. Absolute inputs are returned as-is.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.access_token {
            Some(token) => request.header(COOKIE, format!("access_token=Bearer {token}")),
            None => request,
        }
    }

    async fn send(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.resolve(path);
        let response = self.get(&url).send().await?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "Backend response");
        if !status.is_success() {
            return Err(Self::failure(response).await);
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.send(path).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn failure(response: reqwest::Response) -> PreviewError {
        let status = response.status().as_u16();
        let parsed = match response.bytes().await {
            Ok(body) => serde_json::from_slice::<ErrorBody>(&body).ok(),
            Err(_) => None,
        };
        let detail = match parsed {
            Some(body) => body.detail.filter(|detail| !detail.trim().is_empty()),
            None => Some(UNKNOWN_ERROR.to_string()),
        };
        warn!(status, detail = ?detail, "Backend rejected request");
        PreviewError::Backend { status, detail }
    }
}

impl PreviewBackend for HttpBackend {
    async fn fetch_paragraphs(&self, material_id: i64, file_index: usize) -> Result<ParagraphPreview> {
        let preview: ParagraphPreview = self.get_json(&preview_path(material_id, file_index)).await?;
        debug!(
            material_id,
            file_index,
            paragraphs = preview.paragraphs.len(),
            total = preview.total_paragraphs,
            "Fetched paragraph preview"
        );
        Ok(preview)
    }

    async fn fetch_slides(&self, material_id: i64, file_index: usize) -> Result<SlidePreview> {
        let preview: SlidePreview = self.get_json(&preview_path(material_id, file_index)).await?;
        debug!(
            material_id,
            file_index,
            slides = preview.slides.len(),
            total = preview.total_slides,
            "Fetched slide preview"
        );
        Ok(preview)
    }

    async fn fetch_material(&self, material_id: i64) -> Result<MaterialDetail> {
        self.get_json(&material_path(material_id)).await
    }

    async fn fetch_file(&self, path: &str) -> Result<Vec<u8>> {
        let bytes = self.send(path).await?.bytes().await?;
        debug!(path, len = bytes.len(), "Fetched static file");
        Ok(bytes.to_vec())
    }
}
