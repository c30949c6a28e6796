use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a generation task: `pending → processing → {completed | failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorKind {
    Veo,
    Sora,
    Grok,
    Gemini,
}

impl VendorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veo => "veo",
            Self::Sora => "sora",
            Self::Grok => "grok",
            Self::Gemini => "gemini",
        }
    }

    pub fn generation_kind(&self) -> GenerationKind {
        match self {
            Self::Veo | Self::Sora | Self::Grok => GenerationKind::Video,
            Self::Gemini => GenerationKind::Image,
        }
    }

    pub fn default_sub_model(&self) -> &'static str {
        match self {
            Self::Veo => "veo_3_1-fast-4K",
            Self::Sora => "sora-2-all",
            Self::Grok => "grok-video-3",
            Self::Gemini => "gemini-3-pro-image-preview",
        }
    }
}

impl std::fmt::Display for VendorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Video,
    Image,
}

/// Canonical aspect-ratio set. Vendor adapters translate these to their own
/// wire vocabulary; unmapped ratios fall back to the vendor's 16:9 equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    Vertical,
}

impl AspectRatio {
    pub const ALL: &'static [AspectRatio] = &[
        Self::Landscape,
        Self::Portrait,
        Self::Square,
        Self::Standard,
        Self::Vertical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Square => "1:1",
            Self::Standard => "4:3",
            Self::Vertical => "3:4",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "16:9" => Some(Self::Landscape),
            "9:16" => Some(Self::Portrait),
            "1:1" => Some(Self::Square),
            "4:3" => Some(Self::Standard),
            "3:4" => Some(Self::Vertical),
            _ => None,
        }
    }

    /// Reference pixel dimensions for previews and size math.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Landscape => (1920, 1080),
            Self::Portrait => (1080, 1920),
            Self::Square => (1080, 1080),
            Self::Standard => (1440, 1080),
            Self::Vertical => (1080, 1440),
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::Landscape
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output resolution tier for the image vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720P")]
    P720,
    #[serde(rename = "1080P")]
    P1080,
    #[serde(rename = "2K")]
    K2,
    #[serde(rename = "4K")]
    K4,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P720 => "720P",
            Self::P1080 => "1080P",
            Self::K2 => "2K",
            Self::K4 => "4K",
        }
    }

    /// Base height in pixels; width follows from the aspect ratio.
    pub fn base_height(&self) -> u32 {
        match self {
            Self::P720 => 720,
            Self::P1080 => 1080,
            Self::K2 => 1440,
            Self::K4 => 2160,
        }
    }
}

/// How an input image is interpreted by image-to-video vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageInputKind {
    #[serde(rename = "reference")]
    Reference,
    #[serde(rename = "start-end")]
    StartEnd,
}

/// Vendor-specific parameter bag carried by a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskOptions {
    pub sub_model: Option<String>,
    pub aspect_ratio: Option<AspectRatio>,
    pub duration_secs: Option<u32>,
    pub resolution: Option<Resolution>,
    pub negative_prompt: Option<String>,
    #[serde(default)]
    pub audio_enabled: bool,
    pub seed: Option<u64>,
    pub image_type: Option<ImageInputKind>,
}

/// Canvas placement; opaque to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// One tracked generation job, from creation through terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub prompt: String,
    pub model: VendorKind,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// 0-100, non-decreasing while the task is live.
    pub progress: f32,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub error_message: Option<String>,
    pub options: TaskOptions,
    /// Input image as a data-URI, when the job was image-conditioned.
    pub image_data: Option<String>,
    pub position: Option<Position>,
}

impl Task {
    pub fn new(prompt: impl Into<String>, model: VendorKind, options: TaskOptions) -> Self {
        Self {
            id: new_task_id(),
            prompt: prompt.into(),
            model,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            progress: 0.0,
            video_url: None,
            image_url: None,
            thumbnail_url: None,
            error_message: None,
            options,
            image_data: None,
            position: None,
        }
    }

    pub fn with_image_data(mut self, image_data: impl Into<String>) -> Self {
        self.image_data = Some(image_data.into());
        self
    }

    pub fn generation_kind(&self) -> GenerationKind {
        self.model.generation_kind()
    }

    pub fn mark_completed(
        &mut self,
        video_url: Option<String>,
        image_url: Option<String>,
        thumbnail_url: Option<String>,
    ) {
        self.status = TaskStatus::Completed;
        self.progress = 100.0;
        self.video_url = video_url;
        self.image_url = image_url;
        self.thumbnail_url = thumbnail_url;
        self.completed_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.error_message = Some(message.into());
        self.completed_at = Some(Utc::now());
    }
}

/// Fresh opaque task id.
pub fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_uniqueness() {
        assert_ne!(new_task_id(), new_task_id());
    }

    #[test]
    fn test_status_terminality() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_aspect_ratio_round_trip() {
        for ratio in AspectRatio::ALL {
            assert_eq!(AspectRatio::parse(ratio.as_str()), Some(*ratio));
        }
        assert_eq!(AspectRatio::parse("21:9"), None);
    }

    #[test]
    fn test_task_lifecycle_marks() {
        let mut task = Task::new("a quiet harbor at dawn", VendorKind::Sora, TaskOptions::default());
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());

        task.mark_completed(Some("https://cdn.example/video.mp4".into()), None, None);
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100.0);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_status_serde_tokens() {
        let json = serde_json::to_string(&TaskStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let ratio: AspectRatio = serde_json::from_str("\"9:16\"").unwrap();
        assert_eq!(ratio, AspectRatio::Portrait);
    }
}
