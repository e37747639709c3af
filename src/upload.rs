//! Posting a finished layout to the layout service.
//!
//! The body is a JSON array with one `{x, y, z, rotated}` object per committed
//! brick, in commit order. There is no retry; failures are reported to the
//! caller as [`PlacerError`].

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{
    config::UploadConfig,
    data_structures::brick::Brick,
    error::{PlacerError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrickRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rotated: bool,
}

impl From<&Brick> for BrickRecord {
    fn from(brick: &Brick) -> Self {
        let position = brick.position();
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            rotated: brick.rotated(),
        }
    }
}

/// What the service answered to a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct UploadClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl UploadClient {
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let base = match &config.base_url {
            Some(base) => base.clone(),
            None => page_origin()?,
        };
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: resolve_endpoint(&base, &config.path)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn upload(&self, records: &[BrickRecord]) -> Result<UploadReceipt> {
        log::info!("Uploading {} bricks to {}", records.len(), self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(records)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            // The status is the verdict; a broken body must not hide it.
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable response body: {}>", e));
            return Err(PlacerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let body = response.text().await?;
        log::info!("Upload finished with status {}", status);
        Ok(UploadReceipt {
            status: status.as_u16(),
            body,
        })
    }
}

fn resolve_endpoint(base: &str, path: &str) -> Result<Url> {
    let raw = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&raw).map_err(|e| PlacerError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

#[cfg(target_arch = "wasm32")]
fn page_origin() -> Result<String> {
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .ok_or_else(|| PlacerError::InvalidUrl {
            url: String::new(),
            reason: "the page origin is not available".to_string(),
        })
}

#[cfg(not(target_arch = "wasm32"))]
fn page_origin() -> Result<String> {
    Err(PlacerError::InvalidUrl {
        url: String::new(),
        reason: "no upload base url configured".to_string(),
    })
}
