//! Quality profiles and the named compression tiers.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Quality below this triggers PNG palette quantization.
pub const PALETTE_QUALITY_CUTOFF: u8 = 75;

/// Quality below this earns the "strong" output-name tag.
const STRONG_TAG_CUTOFF: u8 = 70;

/// Quality below this earns the "extreme" output-name tag.
const EXTREME_TAG_CUTOFF: u8 = 60;

/// Settings for one compression run: a width ceiling and an encoder
/// quality.
///
/// Immutable once constructed; selected once per run and passed by
/// value into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityProfile {
    /// Maximum image width in pixels. Wider images are downscaled to
    /// exactly this width; narrower images are never upscaled.
    pub max_width: u32,
    /// Encoder quality in 1-100. Doubles as the JPEG quality setting
    /// and the PNG quantization threshold.
    pub quality: u8,
}

impl QualityProfile {
    /// Create a profile, validating both fields.
    pub fn new(max_width: u32, quality: u8) -> Result<Self> {
        if max_width == 0 {
            return Err(Error::InvalidProfile(
                "max_width must be positive".to_string(),
            ));
        }
        if quality == 0 || quality > 100 {
            return Err(Error::InvalidProfile(format!(
                "quality must be 1-100, got {}",
                quality
            )));
        }
        Ok(Self { max_width, quality })
    }

    /// Whether PNG inputs are quantized to an 8-bit palette under this
    /// profile.
    pub fn quantizes_png(&self) -> bool {
        self.quality < PALETTE_QUALITY_CUTOFF
    }

    /// Output-name tag for this profile, matching the naming convention
    /// consumers of the tool expect: 高清 (high quality), 强力 (strong,
    /// quality < 70), 极限 (extreme, quality < 60).
    pub fn tag(&self) -> &'static str {
        if self.quality < EXTREME_TAG_CUTOFF {
            "极限"
        } else if self.quality < STRONG_TAG_CUTOFF {
            "强力"
        } else {
            "高清"
        }
    }
}

/// Named compression tiers, from highest fidelity to smallest output.
///
/// The tier table is fixed at compile time; there is no per-field
/// tuning surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// 2048px ceiling, quality 85. Near-lossless for projector use.
    HighQuality,
    /// 1600px ceiling, quality 75. Good for sharing.
    Balanced,
    /// 1280px ceiling, quality 60. Phone-screen fidelity.
    Strong,
    /// 1024px ceiling, quality 50. Smallest output.
    Extreme,
}

impl Tier {
    /// All tiers, highest fidelity first.
    pub const ALL: [Tier; 4] = [Tier::HighQuality, Tier::Balanced, Tier::Strong, Tier::Extreme];

    /// The profile this tier maps to.
    pub fn profile(&self) -> QualityProfile {
        match self {
            Tier::HighQuality => QualityProfile {
                max_width: 2048,
                quality: 85,
            },
            Tier::Balanced => QualityProfile {
                max_width: 1600,
                quality: 75,
            },
            Tier::Strong => QualityProfile {
                max_width: 1280,
                quality: 60,
            },
            Tier::Extreme => QualityProfile {
                max_width: 1024,
                quality: 50,
            },
        }
    }

    /// Human-readable name for this tier.
    pub fn name(&self) -> &'static str {
        match self {
            Tier::HighQuality => "high-quality",
            Tier::Balanced => "balanced",
            Tier::Strong => "strong",
            Tier::Extreme => "extreme",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Derive the conventional output path for an input file and profile:
/// `{stem}_{tag}压缩.{ext}`, alongside the input.
///
/// This is a convenience default; [`rewrite_package`] always takes an
/// explicit output path and never computes one itself.
///
/// [`rewrite_package`]: crate::rewrite::rewrite_package
///
/// # Example
///
/// ```
/// use pptslim::{default_output_path, Tier};
///
/// let out = default_output_path("deck.pptx", &Tier::Extreme.profile());
/// assert_eq!(out.to_string_lossy(), "deck_极限压缩.pptx");
/// ```
pub fn default_output_path(input: impl AsRef<Path>, profile: &QualityProfile) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pptx".to_string());

    let filename = format!("{}_{}压缩.{}", stem, profile.tag(), ext);
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(filename),
        _ => PathBuf::from(filename),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_validation() {
        assert!(QualityProfile::new(1024, 50).is_ok());
        assert!(QualityProfile::new(0, 50).is_err());
        assert!(QualityProfile::new(1024, 0).is_err());
        assert!(QualityProfile::new(1024, 101).is_err());
        assert!(QualityProfile::new(1, 100).is_ok());
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(Tier::HighQuality.profile().max_width, 2048);
        assert_eq!(Tier::HighQuality.profile().quality, 85);
        assert_eq!(Tier::Balanced.profile().max_width, 1600);
        assert_eq!(Tier::Strong.profile().quality, 60);
        assert_eq!(Tier::Extreme.profile().max_width, 1024);
        assert_eq!(Tier::ALL.len(), 4);
    }

    #[test]
    fn test_quantization_threshold() {
        // Quantization kicks in strictly below 75.
        assert!(!Tier::HighQuality.profile().quantizes_png());
        assert!(!Tier::Balanced.profile().quantizes_png());
        assert!(Tier::Strong.profile().quantizes_png());
        assert!(Tier::Extreme.profile().quantizes_png());
    }

    #[test]
    fn test_name_tags() {
        assert_eq!(Tier::HighQuality.profile().tag(), "高清");
        assert_eq!(Tier::Balanced.profile().tag(), "高清");
        assert_eq!(Tier::Strong.profile().tag(), "强力");
        assert_eq!(Tier::Extreme.profile().tag(), "极限");
    }

    #[test]
    fn test_default_output_path() {
        let p = default_output_path("slides/deck.pptx", &Tier::Strong.profile());
        assert_eq!(p, PathBuf::from("slides/deck_强力压缩.pptx"));

        let p = default_output_path("deck.pptx", &Tier::HighQuality.profile());
        assert_eq!(p, PathBuf::from("deck_高清压缩.pptx"));
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::HighQuality.to_string(), "high-quality");
        assert_eq!(Tier::Extreme.to_string(), "extreme");
    }
}
