/// Gemini image backend
///
/// Tries the dedicated `POST /images/generations` endpoint first; gateways
/// that do not route it answer 404/400, in which case generation falls back
/// to `POST /chat/completions` with image response modalities. Replies come
/// back in several shapes, all of which must be handled: a standard data
/// array, a plain string content (data-URI, http URL, or inline markdown
/// image), a typed content-part array, or a vendor-specific top-level field.
///
/// Generation completes synchronously: a successful create yields a
/// `Completed` handle carrying the image URL and there is nothing to poll.
use async_trait::async_trait;
use serde_json::{json, Value};
use tasks::{new_task_id, AspectRatio, Resolution, TaskOptions, TaskStatus, VendorKind};

use super::{api_error, JobHandle, JobSnapshot, VendorAdapter, VendorError};
use crate::config::GenerationConfig;

pub struct GeminiAdapter {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl GeminiAdapter {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<reqwest::Response, VendorError> {
        Ok(self
            .client
            .post(url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(body)
            .send()
            .await?)
    }

    async fn create_via_chat(
        &self,
        prompt: &str,
        sub_model: &str,
        options: &TaskOptions,
        size: &str,
        ratio: AspectRatio,
    ) -> Result<JobHandle, VendorError> {
        let url = self.config.endpoint("chat/completions");
        let body = json!({
            "model": sub_model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_modalities": ["image"],
            "size": size,
            "aspect_ratio": ratio.as_str(),
            "negative_prompt": options.negative_prompt.clone().unwrap_or_default(),
            "temperature": 0.7,
        });
        tracing::info!(target: "vendors", "gemini chat fallback: {url}");

        let response = self.post_json(&url, &body).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let raw: Value = response
            .json()
            .await
            .map_err(|err| VendorError::InvalidResponse(err.to_string()))?;
        Ok(handle_from_reply(&raw))
    }
}

#[async_trait]
impl VendorAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn kind(&self) -> VendorKind {
        VendorKind::Gemini
    }

    async fn create(
        &self,
        prompt: &str,
        sub_model: &str,
        options: &TaskOptions,
    ) -> Result<JobHandle, VendorError> {
        let ratio = options.aspect_ratio.unwrap_or(AspectRatio::Square);
        let size = image_size(options.resolution, ratio);

        let url = self.config.endpoint("images/generations");
        let mut body = json!({
            "model": sub_model,
            "prompt": prompt,
            "size": size,
            "n": 1,
        });
        if ratio != AspectRatio::Landscape {
            body["aspect_ratio"] = json!(ratio.as_str());
        }
        tracing::info!(target: "vendors", "gemini create: {url}");

        let response = self.post_json(&url, &body).await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::BAD_REQUEST {
            tracing::info!(
                target: "vendors",
                "images endpoint answered {status}; falling back to chat completions"
            );
            return self
                .create_via_chat(prompt, sub_model, options, &size, ratio)
                .await;
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|err| VendorError::InvalidResponse(err.to_string()))?;
        Ok(handle_from_reply(&raw))
    }

    async fn create_with_image(
        &self,
        _prompt: &str,
        _image_data: &str,
        _sub_model: &str,
        _options: &TaskOptions,
    ) -> Result<JobHandle, VendorError> {
        Err(VendorError::Unsupported(
            "gemini image generation does not accept an input image".to_string(),
        ))
    }

    async fn query(&self, _task_id: &str, _sub_model: &str) -> Result<JobSnapshot, VendorError> {
        Err(VendorError::Unsupported(
            "gemini image generation completes at create time; there is no status endpoint"
                .to_string(),
        ))
    }
}

fn handle_from_reply(raw: &Value) -> JobHandle {
    let image_url = extract_image_url(raw);
    if image_url.is_none() {
        tracing::warn!(target: "vendors", "gemini reply carried no recognizable image reference");
    }
    JobHandle {
        task_id: new_task_id(),
        status: TaskStatus::Completed,
        result_url: image_url,
    }
}

/// `"WxH"` size token from the resolution tier and aspect ratio: the tier
/// fixes the height, the ratio fixes the width.
fn image_size(resolution: Option<Resolution>, ratio: AspectRatio) -> String {
    let height = resolution.unwrap_or(Resolution::K2).base_height();
    let (rw, rh) = ratio.dimensions();
    let width = (height as f64 * (rw as f64 / rh as f64)).round() as u32;
    format!("{width}x{height}")
}

/// Pull an image reference out of any of the reply shapes the gateway has
/// been observed to produce.
fn extract_image_url(raw: &Value) -> Option<String> {
    // Standard image-generation shape: { data: [{ url }] }.
    if let Some(url) = raw["data"][0]["url"].as_str() {
        return Some(url.to_string());
    }

    let content = &raw["choices"][0]["message"]["content"];
    if let Some(parts) = content.as_array() {
        for part in parts {
            if part["type"].as_str() == Some("image_url") {
                if let Some(url) = part["image_url"]["url"].as_str() {
                    return Some(url.to_string());
                }
            }
        }
    } else if let Some(text) = content.as_str() {
        if text.starts_with("data:image") || text.starts_with("http") {
            return Some(text.to_string());
        }
        if let Some(url) = markdown_image_url(text) {
            return Some(url);
        }
    }

    // Vendor-specific top-level fields, last resort.
    raw["image_url"]
        .as_str()
        .or_else(|| raw["url"].as_str())
        .map(str::to_string)
}

/// Target of the first inline markdown image: `![alt](url)`.
fn markdown_image_url(text: &str) -> Option<String> {
    let start = text.find("![")?;
    let rest = &text[start..];
    let open = rest.find("](")?;
    let tail = &rest[open + 2..];
    let close = tail.find(')')?;
    let url = tail[..close].trim();
    (!url.is_empty()).then(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_math() {
        assert_eq!(image_size(Some(Resolution::K2), AspectRatio::Landscape), "2560x1440");
        assert_eq!(image_size(Some(Resolution::K2), AspectRatio::Square), "1440x1440");
        assert_eq!(image_size(Some(Resolution::P720), AspectRatio::Standard), "960x720");
        // 2K is the default tier.
        assert_eq!(image_size(None, AspectRatio::Square), "1440x1440");
    }

    #[test]
    fn test_extract_from_data_array() {
        let raw = json!({ "data": [{ "url": "https://cdn.example/img.png" }] });
        assert_eq!(
            extract_image_url(&raw).as_deref(),
            Some("https://cdn.example/img.png")
        );
    }

    #[test]
    fn test_extract_from_string_content() {
        let direct = json!({
            "choices": [{ "message": { "content": "data:image/png;base64,AAAA" } }]
        });
        assert_eq!(
            extract_image_url(&direct).as_deref(),
            Some("data:image/png;base64,AAAA")
        );

        let markdown = json!({
            "choices": [{ "message": { "content": "Here it is: ![render](https://cdn.example/a.png) enjoy" } }]
        });
        assert_eq!(
            extract_image_url(&markdown).as_deref(),
            Some("https://cdn.example/a.png")
        );
    }

    #[test]
    fn test_extract_from_typed_parts() {
        let raw = json!({
            "choices": [{ "message": { "content": [
                { "type": "text", "text": "generated" },
                { "type": "image_url", "image_url": { "url": "https://cdn.example/b.png" } }
            ] } }]
        });
        assert_eq!(
            extract_image_url(&raw).as_deref(),
            Some("https://cdn.example/b.png")
        );
    }

    #[test]
    fn test_extract_from_top_level_field() {
        let raw = json!({ "image_url": "https://cdn.example/c.png" });
        assert_eq!(
            extract_image_url(&raw).as_deref(),
            Some("https://cdn.example/c.png")
        );
        let raw = json!({ "choices": [{ "message": { "content": "no image here" } }] });
        assert_eq!(extract_image_url(&raw), None);
    }
}
