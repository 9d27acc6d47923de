//! Client for the remote service's control surface.
//!
//! The control panel configures the transform target (`set_source`),
//! selects filters and cameras, and issues start/live/reset commands.
//! This module only consumes that API; the service implements it.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::remote::error::ControlError;
use crate::remote::transform::validate_base_url;

/// Status payload returned by control commands.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandStatus {
    pub status: String,
}

/// One server-side camera as reported by `get_cameras`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCamera {
    pub index: u32,
    pub name: String,
    pub is_current: bool,
}

/// The server's camera inventory and its current selection.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraInventory {
    pub cameras: Vec<RemoteCamera>,
    pub current_camera: u32,
}

/// Error body the server attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed client for the control endpoints.
pub struct ControlApi {
    base_url: String,
    client: reqwest::Client,
}

impl ControlApi {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ControlError> {
        let base_url = validate_base_url(base_url.into())
            .map_err(|e| ControlError::InvalidUrl(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ControlError::RequestFailed(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    /// Configure the transform target image. Must succeed before `start`
    /// is meaningful.
    pub async fn set_source(
        &self,
        image_bytes: Vec<u8>,
        mouth_mask: bool,
    ) -> Result<CommandStatus, ControlError> {
        let part = reqwest::multipart::Part::bytes(image_bytes)
            .file_name("source.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ControlError::RequestFailed(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("source_face", part)
            .text("mouth_mask", if mouth_mask { "true" } else { "false" });

        let response = self
            .client
            .post(format!("{}/set_source", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ControlError::RequestFailed(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Ask the server whether a named filter exists.
    pub async fn check_filter(&self, name: &str) -> Result<CommandStatus, ControlError> {
        self.post("check_filter", json!({ "filter_name": name })).await
    }

    /// Apply a named filter.
    pub async fn set_filter(&self, name: &str) -> Result<CommandStatus, ControlError> {
        self.post("set_filter", json!({ "filter_name": name })).await
    }

    /// List the server-side cameras and which one is currently selected.
    pub async fn get_cameras(&self) -> Result<CameraInventory, ControlError> {
        let response = self
            .client
            .get(format!("{}/get_cameras", self.base_url))
            .send()
            .await
            .map_err(|e| ControlError::RequestFailed(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Select the server-side capture camera by index.
    pub async fn set_camera(&self, index: u32) -> Result<CommandStatus, ControlError> {
        self.post("set_camera", json!({ "camera_index": index })).await
    }

    /// Start processing. The server answers `{status: "started"}`.
    pub async fn start(&self) -> Result<CommandStatus, ControlError> {
        self.post("start", json!({})).await
    }

    /// Toggle live mode.
    pub async fn live(&self) -> Result<CommandStatus, ControlError> {
        self.post("live", json!({})).await
    }

    /// Stop processing.
    pub async fn stop(&self) -> Result<CommandStatus, ControlError> {
        self.post("stop", json!({})).await
    }

    /// Reset the server to its initial state.
    pub async fn reset(&self) -> Result<CommandStatus, ControlError> {
        self.post("reset", json!({})).await
    }

    async fn post(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<CommandStatus, ControlError> {
        let response = self
            .client
            .post(format!("{}/{endpoint}", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ControlError::RequestFailed(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Map the server's `{...}` / `{error}` convention onto `Result`.
    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ControlError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ControlError::RequestFailed(e.to_string()))?;

        if status.is_success() {
            serde_json::from_slice(&body)
                .map_err(|e| ControlError::RequestFailed(format!("malformed response: {e}")))
        } else {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("server returned {status}"));
            Err(ControlError::Rejected(message))
        }
    }
}
