//! Named parameter sets for common kinds of source image.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::PipelineConfig;

/// A named starting point for tuning.
///
/// Each preset fixes the blur, threshold window, threshold constant,
/// simplification factor and minimum contour area; every other field
/// keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Preset {
    /// Balanced line and fill detail. Matches the defaults.
    #[default]
    SmartHybrid,
    /// Small window and constant: picks up faint fine lines.
    DetailFocus,
    /// More blur, fewer wobbly fragments.
    SmoothLines,
    /// Wide window for bold outlines.
    ThickLines,
    /// Heavy blur and coarse simplification: quick drawings.
    Simple,
}

impl Preset {
    /// Every preset, in display order.
    pub const ALL: [Self; 5] = [
        Self::SmartHybrid,
        Self::DetailFocus,
        Self::SmoothLines,
        Self::ThickLines,
        Self::Simple,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SmartHybrid => "Smart Hybrid",
            Self::DetailFocus => "Detail Focus",
            Self::SmoothLines => "Smooth Lines",
            Self::ThickLines => "Thick Lines",
            Self::Simple => "Simple",
        }
    }

    /// Full pipeline configuration for this preset.
    #[must_use]
    pub fn config(self) -> PipelineConfig {
        let (blur, block, c, epsilon, min_area) = match self {
            Self::SmartHybrid => (3, 9, 4.0, 0.002, 50.0),
            Self::DetailFocus => (3, 7, 2.0, 0.001, 10.0),
            Self::SmoothLines => (5, 11, 5.0, 0.0015, 20.0),
            Self::ThickLines => (5, 15, 5.0, 0.0015, 25.0),
            Self::Simple => (7, 21, 8.0, 0.003, 50.0),
        };
        PipelineConfig {
            blur_kernel_size: blur,
            threshold_block_size: block,
            threshold_constant: c,
            simplify_epsilon_factor: epsilon,
            min_contour_area: min_area,
            ..PipelineConfig::default()
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_preset_is_default_config() {
        assert_eq!(Preset::default().config(), PipelineConfig::default());
    }

    #[test]
    fn presets_differ() {
        for (i, a) in Preset::ALL.iter().enumerate() {
            for b in &Preset::ALL[i + 1..] {
                assert_ne!(a.config(), b.config(), "{a} and {b}");
            }
        }
    }

    #[test]
    fn preset_kernel_sizes_are_already_odd() {
        for preset in Preset::ALL {
            let config = preset.config();
            assert_eq!(config.normalized_blur_kernel_size(), config.blur_kernel_size);
            assert_eq!(config.normalized_block_size(), config.threshold_block_size);
        }
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&Preset::ThickLines).unwrap();
        assert_eq!(json, "\"ThickLines\"");
        let back: Preset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Preset::ThickLines);
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(Preset::DetailFocus.to_string(), "Detail Focus");
    }
}
