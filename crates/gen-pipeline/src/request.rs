use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use tasks::{AspectRatio, ImageInputKind, Resolution, TaskOptions, VendorKind};
use uuid::Uuid;

use crate::vendors::VendorError;

/// One entry of a batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPrompt {
    pub id: String,
    pub prompt: String,
    /// Per-prompt input image as a data-URI, overriding the request-level one.
    pub image: Option<String>,
}

impl BatchPrompt {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Ephemeral description of one generation run; consumed by the orchestrator
/// and discarded.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: VendorKind,
    pub sub_model: Option<String>,
    pub prompt: String,
    /// When non-empty the request is a batch; `prompt` is ignored.
    pub batch_prompts: Vec<BatchPrompt>,
    pub aspect_ratio: Option<AspectRatio>,
    pub duration_secs: Option<u32>,
    pub resolution: Option<Resolution>,
    pub negative_prompt: Option<String>,
    pub audio_enabled: bool,
    pub seed: Option<u64>,
    pub image_data: Option<String>,
    /// Second frame for start/end-frame conditioning. Carried for task
    /// bookkeeping; the current vendors accept only the primary image.
    pub image_data2: Option<String>,
    pub image_type: Option<ImageInputKind>,
}

impl GenerationRequest {
    pub fn single(model: VendorKind, prompt: impl Into<String>) -> Self {
        Self {
            model,
            sub_model: None,
            prompt: prompt.into(),
            batch_prompts: Vec::new(),
            aspect_ratio: None,
            duration_secs: None,
            resolution: None,
            negative_prompt: None,
            audio_enabled: false,
            seed: None,
            image_data: None,
            image_data2: None,
            image_type: None,
        }
    }

    pub fn batch(model: VendorKind, prompts: Vec<BatchPrompt>) -> Self {
        Self {
            batch_prompts: prompts,
            ..Self::single(model, "")
        }
    }

    pub fn with_sub_model(mut self, sub_model: impl Into<String>) -> Self {
        self.sub_model = Some(sub_model.into());
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    pub fn with_image_data(mut self, data_uri: impl Into<String>) -> Self {
        self.image_data = Some(data_uri.into());
        self
    }

    pub fn with_negative_prompt(mut self, text: impl Into<String>) -> Self {
        self.negative_prompt = Some(text.into());
        self
    }

    /// Ordered prompt list for the run: either the batch entries with blank
    /// prompts filtered out, or the single trimmed prompt (with the
    /// request-level image attached).
    pub fn expand_prompts(&self) -> Vec<BatchPrompt> {
        if !self.batch_prompts.is_empty() {
            return self
                .batch_prompts
                .iter()
                .filter(|bp| !bp.prompt.trim().is_empty())
                .map(|bp| {
                    let mut entry = bp.clone();
                    // Entries without their own image inherit the request's.
                    entry.image = entry.image.or_else(|| self.image_data.clone());
                    entry
                })
                .collect();
        }
        let trimmed = self.prompt.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let mut entry = BatchPrompt::new(trimmed);
        entry.image = self.image_data.clone();
        vec![entry]
    }

    /// Resolve the option bag recorded on each task of this run.
    pub fn task_options(&self, default_duration: Option<u32>) -> TaskOptions {
        TaskOptions {
            sub_model: Some(
                self.sub_model
                    .clone()
                    .unwrap_or_else(|| self.model.default_sub_model().to_string()),
            ),
            aspect_ratio: self.aspect_ratio,
            duration_secs: self.duration_secs.or(default_duration),
            resolution: self.resolution,
            negative_prompt: self.negative_prompt.clone(),
            audio_enabled: self.audio_enabled,
            seed: self.seed,
            image_type: self.image_type,
        }
    }
}

/// Decode a `data:<mime>;base64,<payload>` URI into its mime type and raw
/// bytes. Vendors receive binary parts, never the URI itself.
pub fn decode_data_uri(data_uri: &str) -> Result<(String, Vec<u8>), VendorError> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or_else(|| VendorError::Configuration("image input is not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| VendorError::Configuration("data URI has no payload".to_string()))?;

    let mime = header
        .split(';')
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or("image/png")
        .to_string();

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|err| VendorError::Configuration(format!("bad base64 in data URI: {err}")))?;

    Ok((mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_prompt_expansion_trims() {
        let request = GenerationRequest::single(VendorKind::Veo, "  a red kite  ");
        let prompts = request.expand_prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].prompt, "a red kite");
    }

    #[test]
    fn test_blank_batch_entries_are_filtered() {
        let request = GenerationRequest::batch(
            VendorKind::Sora,
            vec![
                BatchPrompt::new("one"),
                BatchPrompt::new("   "),
                BatchPrompt::new("three"),
            ],
        );
        let prompts = request.expand_prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].prompt, "one");
        assert_eq!(prompts[1].prompt, "three");
    }

    #[test]
    fn test_batch_entries_inherit_the_request_image() {
        let request = GenerationRequest::batch(
            VendorKind::Veo,
            vec![
                BatchPrompt::new("own image").with_image("data:image/png;base64,BB=="),
                BatchPrompt::new("no image"),
            ],
        )
        .with_image_data("data:image/png;base64,AA==");

        let prompts = request.expand_prompts();
        assert_eq!(prompts[0].image.as_deref(), Some("data:image/png;base64,BB=="));
        assert_eq!(prompts[1].image.as_deref(), Some("data:image/png;base64,AA=="));
    }

    #[test]
    fn test_empty_single_prompt_expands_to_nothing() {
        let request = GenerationRequest::single(VendorKind::Veo, "   ");
        assert!(request.expand_prompts().is_empty());
    }

    #[test]
    fn test_task_options_fill_defaults() {
        let request = GenerationRequest::single(VendorKind::Grok, "p");
        let options = request.task_options(Some(10));
        assert_eq!(options.sub_model.as_deref(), Some("grok-video-3"));
        assert_eq!(options.duration_secs, Some(10));
    }

    #[test]
    fn test_decode_data_uri() {
        let (mime, bytes) = decode_data_uri("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_data_uri_defaults_mime() {
        let (mime, _) = decode_data_uri("data:;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/png");
    }

    #[test]
    fn test_decode_rejects_plain_urls() {
        assert!(decode_data_uri("https://example.com/a.png").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
    }
}
