/// Grok video backend
///
/// Creation is a JSON body against `POST /video/create` with the vendor's
/// own landscape/portrait ratio vocabulary and a fixed 720P quality tier.
/// Image conditioning is declared unsupported: the upstream only accepts
/// hosted image URLs and there is no image-hosting capability here.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tasks::{AspectRatio, TaskOptions, VendorKind};

use super::{api_error, JobHandle, JobSnapshot, VendorAdapter, VendorError};
use crate::config::GenerationConfig;
use crate::status::normalize_status;

pub struct GrokAdapter {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl GrokAdapter {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Vendor vocabulary is 3:2 / 2:3 / 1:1; unmapped ratios land on 3:2.
    fn wire_ratio(ratio: Option<AspectRatio>) -> &'static str {
        match ratio {
            Some(AspectRatio::Portrait) => "2:3",
            Some(AspectRatio::Square) => "1:1",
            _ => "3:2",
        }
    }
}

#[async_trait]
impl VendorAdapter for GrokAdapter {
    fn name(&self) -> &str {
        "Grok"
    }

    fn kind(&self) -> VendorKind {
        VendorKind::Grok
    }

    async fn create(
        &self,
        prompt: &str,
        sub_model: &str,
        options: &TaskOptions,
    ) -> Result<JobHandle, VendorError> {
        let url = self.config.endpoint("video/create");
        let body = CreateRequest {
            model: sub_model,
            prompt,
            aspect_ratio: Self::wire_ratio(options.aspect_ratio),
            // The upstream offers a single quality tier.
            size: "720P",
            images: Vec::new(),
        };
        tracing::info!(target: "vendors", "grok create: {url}");

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
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

    async fn create_with_image(
        &self,
        _prompt: &str,
        _image_data: &str,
        _sub_model: &str,
        _options: &TaskOptions,
    ) -> Result<JobHandle, VendorError> {
        Err(VendorError::Unsupported(
            "grok image-to-video requires a hosted image URL; inline image data is not supported"
                .to_string(),
        ))
    }

    async fn query(&self, task_id: &str, _sub_model: &str) -> Result<JobSnapshot, VendorError> {
        let url = self.config.endpoint(&format!("video/query?id={task_id}"));
        tracing::debug!(target: "vendors", "grok query: {url}");

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
            thumbnail_url: raw.cover_url,
            duration_secs: None,
            error_message: raw.error.and_then(|e| e.message),
        })
    }
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    aspect_ratio: &'static str,
    size: &'static str,
    /// Always empty for text-only generation.
    images: Vec<String>,
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
    cover_url: Option<String>,
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
    fn test_wire_ratio_mapping() {
        assert_eq!(GrokAdapter::wire_ratio(Some(AspectRatio::Landscape)), "3:2");
        assert_eq!(GrokAdapter::wire_ratio(Some(AspectRatio::Portrait)), "2:3");
        assert_eq!(GrokAdapter::wire_ratio(Some(AspectRatio::Square)), "1:1");
        assert_eq!(GrokAdapter::wire_ratio(Some(AspectRatio::Standard)), "3:2");
        assert_eq!(GrokAdapter::wire_ratio(None), "3:2");
    }

    #[test]
    fn test_create_request_serialization() {
        let body = CreateRequest {
            model: "grok-video-3",
            prompt: "a lighthouse in a storm",
            aspect_ratio: "3:2",
            size: "720P",
            images: Vec::new(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["aspect_ratio"], "3:2");
        assert_eq!(json["size"], "720P");
        assert!(json["images"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_image_input_fails_without_network() {
        // Base URL points nowhere reachable; the call must fail fast anyway.
        let config = GenerationConfig::new("key").with_base_url("http://127.0.0.1:1/v1");
        let adapter = GrokAdapter::new(config);
        let err = adapter
            .create_with_image("p", "data:image/png;base64,AA==", "grok-video-3", &TaskOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VendorError::Unsupported(_)));
    }
}
