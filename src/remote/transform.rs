use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::sampler::Frame;
use crate::pipeline::sink::ProcessedResult;
use crate::remote::error::TransformError;

/// Sends one encoded frame to the remote transformation service.
///
/// Contract: exactly one call may be outstanding at a time. The caller
/// enforces that — this component does not detect violations. Any failure
/// maps to `TransformError::RequestFailed` rather than a session-fatal
/// error.
#[async_trait]
pub trait TransformClient: Send + Sync {
    /// Transmit `frame` and await the processed image for it.
    async fn send(&self, frame: Frame) -> Result<ProcessedResult, TransformError>;
}

/// HTTP client for the transform service's `POST /process_frame` endpoint.
///
/// The frame is uploaded as a multipart `frame` field; a 2xx response body
/// is the processed JPEG. Any non-success status maps to `RequestFailed`
/// regardless of body content.
pub struct HttpTransformClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransformClient {
    /// Create a client for the service at `base_url`
    /// (e.g. "http://127.0.0.1:8000").
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransformError> {
        let base_url = validate_base_url(base_url.into())?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransformError::RequestFailed {
                cause: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { base_url, client })
    }
}

/// Reject empty or schemeless base URLs up front, and strip a trailing
/// slash so endpoint joins stay predictable.
pub(crate) fn validate_base_url(base_url: String) -> Result<String, TransformError> {
    if base_url.is_empty() {
        return Err(TransformError::InvalidUrl(
            "base url cannot be empty".to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(TransformError::InvalidUrl(format!(
            "base url must start with http:// or https://, got: {base_url}"
        )));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

#[async_trait]
impl TransformClient for HttpTransformClient {
    async fn send(&self, frame: Frame) -> Result<ProcessedResult, TransformError> {
        let sequence = frame.sequence;
        let url = format!("{}/process_frame", self.base_url);

        let part = reqwest::multipart::Part::bytes(frame.payload)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| TransformError::RequestFailed {
                cause: e.to_string(),
            })?;
        let form = reqwest::multipart::Form::new().part("frame", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransformError::RequestFailed {
                cause: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransformError::RequestFailed {
                cause: format!("server returned {status}"),
            });
        }

        let image_bytes = response
            .bytes()
            .await
            .map_err(|e| TransformError::RequestFailed {
                cause: format!("failed to read response body: {e}"),
            })?
            .to_vec();

        Ok(ProcessedResult {
            sequence,
            image_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_base_url() {
        let result = HttpTransformClient::new("", Duration::from_secs(5));
        assert!(matches!(result, Err(TransformError::InvalidUrl(_))));
    }

    #[test]
    fn rejects_schemeless_base_url() {
        let result = HttpTransformClient::new("localhost:8000", Duration::from_secs(5));
        assert!(matches!(result, Err(TransformError::InvalidUrl(_))));
    }

    #[test]
    fn accepts_http_and_https() {
        assert!(HttpTransformClient::new("http://127.0.0.1:8000", Duration::from_secs(5)).is_ok());
        assert!(HttpTransformClient::new("https://example.com", Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let url = validate_base_url("http://127.0.0.1:8000/".to_string()).unwrap();
        assert_eq!(url, "http://127.0.0.1:8000");
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpTransformClient>();
    }
}
