//! Client for the remote damage-assessment service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::BoundingBox;
use crate::upload::ValidatedImage;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/assess-damage";

const GENERIC_FAILURE: &str =
    "An error occurred while analyzing the image. Please try again.";

// ── Response Model ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageDetected {
    Yes,
    No,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub damage_detected: DamageDetected,
    pub damage_type: Vec<String>,
    pub damage_location: String,
    pub severity: String,
    pub description: String,
    #[serde(default)]
    pub bboxes: Option<Vec<BoundingBox>>,
    #[serde(default)]
    pub annotated_image_base64: Option<String>,
}

impl AnalysisResult {
    /// Boxes reported by the service, in native pixels of the uploaded
    /// image. Never the annotated image's pixels.
    pub fn boxes(&self) -> &[BoundingBox] {
        self.bboxes.as_deref().unwrap_or_default()
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    // Non-2xx with a structured `detail` payload.
    #[error("service error ({status}): {detail}")]
    Service { status: u16, detail: String },

    #[error("service returned status {status}")]
    Status { status: u16 },
}

impl ApiError {
    /// Best-effort human-readable message: surface the service's own
    /// `detail` when it sent one, a generic fallback otherwise.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Service { detail, .. } => detail.clone(),
            ApiError::Transport(_) | ApiError::Status { .. } => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Pull a human-readable `detail` string out of an error response body.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(|d| d.to_string())
}

// ── Client ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ApiClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One multipart POST with the image under a `file` field. Blocks until
    /// the service answers; callers run this off the UI thread.
    pub fn assess(&self, image: &ValidatedImage) -> Result<AnalysisResult, ApiError> {
        let part = reqwest::blocking::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.content_type)?;
        let form = reqwest::blocking::multipart::Form::new().part("file", part);

        let response = self.client.post(&self.endpoint).multipart(form).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(match extract_detail(&body) {
                Some(detail) => ApiError::Service {
                    status: status.as_u16(),
                    detail,
                },
                None => ApiError::Status {
                    status: status.as_u16(),
                },
            });
        }

        let result: AnalysisResult = response.json()?;
        Ok(result)
    }
}
