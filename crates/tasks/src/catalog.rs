/// Static capability tables for the supported vendors: what each backend can
/// generate, which aspect ratios it accepts, and the sub-model families a
/// front-end can offer.
use crate::task::{AspectRatio, VendorKind};

#[derive(Debug, Clone, Copy)]
pub struct ModelCaps {
    pub display_name: &'static str,
    pub max_duration_secs: u32,
    pub aspect_ratios: &'static [AspectRatio],
    pub supports_image_input: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SubModelInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub price_label: &'static str,
    pub description: &'static str,
}

pub fn caps(kind: VendorKind) -> &'static ModelCaps {
    match kind {
        VendorKind::Veo => &ModelCaps {
            display_name: "Google Veo",
            max_duration_secs: 8,
            aspect_ratios: &[AspectRatio::Landscape, AspectRatio::Portrait],
            supports_image_input: true,
        },
        VendorKind::Sora => &ModelCaps {
            display_name: "OpenAI Sora",
            max_duration_secs: 60,
            aspect_ratios: AspectRatio::ALL,
            supports_image_input: true,
        },
        VendorKind::Grok => &ModelCaps {
            display_name: "Grok Video",
            max_duration_secs: 10,
            aspect_ratios: &[
                AspectRatio::Landscape,
                AspectRatio::Portrait,
                AspectRatio::Square,
            ],
            // The upstream API only accepts hosted image URLs; inline bytes
            // are rejected by the adapter before any request is made.
            supports_image_input: false,
        },
        VendorKind::Gemini => &ModelCaps {
            display_name: "Gemini Image",
            max_duration_secs: 0,
            aspect_ratios: AspectRatio::ALL,
            supports_image_input: false,
        },
    }
}

pub fn duration_options(kind: VendorKind) -> &'static [u32] {
    match kind {
        VendorKind::Veo => &[2, 4, 6, 8],
        VendorKind::Sora => &[5, 10, 15, 20, 30, 60],
        VendorKind::Grok => &[10],
        VendorKind::Gemini => &[],
    }
}

/// Shortest offered duration, used when a request leaves it unset.
pub fn default_duration(kind: VendorKind) -> Option<u32> {
    duration_options(kind).first().copied()
}

pub fn sub_models(kind: VendorKind) -> &'static [SubModelInfo] {
    match kind {
        VendorKind::Veo => &[
            SubModelInfo {
                id: "veo_3_1-fast",
                display_name: "Veo 3.1 Fast",
                price_label: "$$",
                description: "Fast tier, 720p output",
            },
            SubModelInfo {
                id: "veo_3_1-fast-4K",
                display_name: "Veo 3.1 Fast 4K",
                price_label: "$$$",
                description: "4K output with generated audio",
            },
            SubModelInfo {
                id: "veo_3_1",
                display_name: "Veo 3.1",
                price_label: "$$$$",
                description: "High quality tier",
            },
            SubModelInfo {
                id: "veo_3_1-pro",
                display_name: "Veo 3.1 Pro",
                price_label: "$$$$$",
                description: "Highest quality tier",
            },
        ],
        VendorKind::Sora => &[SubModelInfo {
            id: "sora-2-all",
            display_name: "Sora 2 All",
            price_label: "$$",
            description: "Full-capability tier",
        }],
        VendorKind::Grok => &[SubModelInfo {
            id: "grok-video-3",
            display_name: "Grok Video 3",
            price_label: "$$",
            description: "10-second clips with synchronized audio",
        }],
        VendorKind::Gemini => &[SubModelInfo {
            id: "gemini-3-pro-image-preview",
            display_name: "Gemini 3 Pro Image",
            price_label: "$$",
            description: "Still image generation up to 4K",
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vendor_has_caps() {
        for kind in [
            VendorKind::Veo,
            VendorKind::Sora,
            VendorKind::Grok,
            VendorKind::Gemini,
        ] {
            let caps = caps(kind);
            assert!(!caps.display_name.is_empty());
            assert!(!caps.aspect_ratios.is_empty());
        }
    }

    #[test]
    fn test_default_duration_is_shortest() {
        assert_eq!(default_duration(VendorKind::Veo), Some(2));
        assert_eq!(default_duration(VendorKind::Sora), Some(5));
        assert_eq!(default_duration(VendorKind::Gemini), None);
    }

    #[test]
    fn test_default_sub_models_are_cataloged() {
        for kind in [VendorKind::Veo, VendorKind::Sora, VendorKind::Grok, VendorKind::Gemini] {
            assert!(sub_models(kind)
                .iter()
                .any(|m| m.id == kind.default_sub_model()));
        }
    }
}
