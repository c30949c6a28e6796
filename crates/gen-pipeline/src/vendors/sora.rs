/// Sora video backend
///
/// Shares the OpenAI-format `POST /videos` create endpoint with Veo but
/// supports the full canonical ratio set and reports status through the
/// unified `GET /video/query` endpoint.
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tasks::{AspectRatio, TaskOptions, VendorKind};

use super::{api_error, JobHandle, JobSnapshot, VendorAdapter, VendorError};
use crate::config::GenerationConfig;
use crate::request::decode_data_uri;
use crate::status::normalize_status;

const DEFAULT_SECONDS: u32 = 10;

pub struct SoraAdapter {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl SoraAdapter {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn wire_size(ratio: Option<AspectRatio>) -> &'static str {
        match ratio {
            Some(AspectRatio::Portrait) => "9x16",
            Some(AspectRatio::Square) => "1x1",
            Some(AspectRatio::Standard) => "4x3",
            Some(AspectRatio::Vertical) => "3x4",
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
        tracing::info!(target: "vendors", "sora create: {url}");

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
impl VendorAdapter for SoraAdapter {
    fn name(&self) -> &str {
        "Sora"
    }

    fn kind(&self) -> VendorKind {
        VendorKind::Sora
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
        let url = self.config.endpoint(&format!("video/query?id={task_id}"));
        tracing::debug!(target: "vendors", "sora query: {url}");

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
            progress: None,
            video_url: raw.video_url,
            // The unified query endpoint returns no cover image for Sora.
            thumbnail_url: None,
            duration_secs: None,
            error_message: raw.error.and_then(|e| e.message),
        })
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
    error: Option<QueryError>,
}

#[derive(Debug, Deserialize)]
struct QueryError {
    message: Option<String>,
}
