use tasks::{AspectRatio, VendorKind};

/// Default gateway base URL; user-configurable, must carry the `/v1` prefix.
pub const DEFAULT_API_BASE: &str = "https://allapi.store/v1";

/// Explicit configuration handed to the pipeline at call time. Core logic
/// never reads ambient settings; everything it needs arrives through this.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Bearer token forwarded verbatim on every vendor call.
    pub api_key: String,
    pub api_base_url: String,
    pub default_model: VendorKind,
    pub default_aspect_ratio: AspectRatio,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            default_model: VendorKind::Veo,
            default_aspect_ratio: AspectRatio::Landscape,
        }
    }
}

impl GenerationConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// With gateway base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// With default vendor
    pub fn with_default_model(mut self, model: VendorKind) -> Self {
        self.default_model = model;
        self
    }

    /// With default aspect ratio
    pub fn with_default_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.default_aspect_ratio = ratio;
        self
    }

    /// Join a path onto the configured base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
