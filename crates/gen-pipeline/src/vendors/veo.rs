/// Veo video backend (OpenAI-format video endpoints)
///
/// Creation goes through `POST /videos` as a multipart form; status through
/// `GET /videos/{id}`. Image conditioning attaches the decoded bytes as an
/// `input_reference` part.
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tasks::{AspectRatio, TaskOptions, VendorKind};

use super::{api_error, JobHandle, JobSnapshot, VendorAdapter, VendorError};
use crate::config::GenerationConfig;
use crate::request::decode_data_uri;
use crate::status::normalize_status;

const DEFAULT_SECONDS: u32 = 2;

pub struct VeoAdapter {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl VeoAdapter {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// This vendor only speaks 16x9/9x16/1x1; everything else lands on 16x9.
    fn wire_size(ratio: Option<AspectRatio>) -> &'static str {
        match ratio {
            Some(AspectRatio::Portrait) => "9x16",
            Some(AspectRatio::Square) => "1x1",
            _ => "16x9",
        }
    }

    fn base_form(prompt: &str, sub_model: &str, options: &TaskOptions) -> multipart::Form {
        multipart::Form::new()
            .text("model", sub_model.to_string())
            .text("prompt", prompt.to_string())
            .text(
                "seconds",
                options.duration_secs.unwrap_or(DEFAULT_SECONDS).to_string(),
            )
            .text("watermark", "false")
            .text("size", Self::wire_size(options.aspect_ratio))
    }

    async fn submit(&self, form: multipart::Form) -> Result<JobHandle, VendorError> {
        let url = self.config.endpoint("videos");
        tracing::info!(target: "vendors", "veo create: {url}");

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let created: CreateResponse = response
            .json()
            .await
            .map_err(|err| VendorError::InvalidResponse(err.to_string()))?;
        Ok(JobHandle {
            task_id: created.id,
            status: normalize_status(created.status.as_deref().unwrap_or_default()),
            result_url: None,
        })
    }
}

#[async_trait]
impl VendorAdapter for VeoAdapter {
    fn name(&self) -> &str {
        "Veo"
    }

    fn kind(&self) -> VendorKind {
        VendorKind::Veo
    }

    async fn create(
        &self,
        prompt: &str,
        sub_model: &str,
        options: &TaskOptions,
    ) -> Result<JobHandle, VendorError> {
        self.submit(Self::base_form(prompt, sub_model, options)).await
    }

    async fn create_with_image(
        &self,
        prompt: &str,
        image_data: &str,
        sub_model: &str,
        options: &TaskOptions,
    ) -> Result<JobHandle, VendorError> {
        let (mime, bytes) = decode_data_uri(image_data)?;
        let part = multipart::Part::bytes(bytes)
            .file_name("reference.png")
            .mime_str(&mime)
            .map_err(|err| VendorError::Configuration(format!("bad image mime type: {err}")))?;
        let form = Self::base_form(prompt, sub_model, options).part("input_reference", part);
        self.submit(form).await
    }

    async fn query(&self, task_id: &str, _sub_model: &str) -> Result<JobSnapshot, VendorError> {
        let url = self.config.endpoint(&format!("videos/{task_id}"));
        tracing::debug!(target: "vendors", "veo query: {url}");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VendorError::Api(format!(
                "failed to query task: {}",
                response.status().as_u16()
            )));
        }

        let raw: QueryResponse = response
            .json()
            .await
            .map_err(|err| VendorError::InvalidResponse(err.to_string()))?;
        Ok(JobSnapshot {
            status: normalize_status(raw.status.as_deref().unwrap_or_default()),
            progress: raw.progress,
            video_url: raw.video_url,
            thumbnail_url: None,
            duration_secs: coerce_seconds(raw.seconds.as_ref()),
            error_message: raw.error.and_then(|e| e.message),
        })
    }
}

/// The gateway reports `seconds` as either a number or a numeric string.
fn coerce_seconds(value: Option<&serde_json::Value>) -> Option<u32> {
    match value? {
        serde_json::Value::Number(n) => n.as_u64().map(|s| s as u32),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[allow(dead_code)]
    id: Option<String>,
    status: Option<String>,
    video_url: Option<String>,
    progress: Option<f32>,
    seconds: Option<serde_json::Value>,
    error: Option<QueryError>,
}

#[derive(Debug, Deserialize)]
struct QueryError {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_size_mapping() {
        assert_eq!(VeoAdapter::wire_size(Some(AspectRatio::Landscape)), "16x9");
        assert_eq!(VeoAdapter::wire_size(Some(AspectRatio::Portrait)), "9x16");
        assert_eq!(VeoAdapter::wire_size(Some(AspectRatio::Square)), "1x1");
    }

    #[test]
    fn test_unmapped_ratio_falls_back_to_landscape() {
        assert_eq!(VeoAdapter::wire_size(Some(AspectRatio::Standard)), "16x9");
        assert_eq!(VeoAdapter::wire_size(Some(AspectRatio::Vertical)), "16x9");
        assert_eq!(VeoAdapter::wire_size(None), "16x9");
    }

    #[test]
    fn test_coerce_seconds() {
        use serde_json::json;
        assert_eq!(coerce_seconds(Some(&json!(8))), Some(8));
        assert_eq!(coerce_seconds(Some(&json!("6"))), Some(6));
        assert_eq!(coerce_seconds(Some(&json!(null))), None);
        assert_eq!(coerce_seconds(None), None);
    }

    #[test]
    fn test_query_response_shape() {
        let raw: QueryResponse = serde_json::from_str(
            r#"{"id":"v1","status":"PROCESSING","video_url":null,"progress":42.5,"seconds":"4"}"#,
        )
        .unwrap();
        assert_eq!(raw.progress, Some(42.5));
        assert_eq!(coerce_seconds(raw.seconds.as_ref()), Some(4));
    }
}
