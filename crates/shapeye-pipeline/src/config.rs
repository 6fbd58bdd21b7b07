//! Detector configuration.
//!
//! Every threshold the pipeline uses lives here so that a cycle can be
//! reproduced (and tested) from a single value. The defaults are tuned for
//! a camera looking down at flat-colored cards on white paper.

use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

/// Saturation/value window a pixel must fall in to count towards the
/// mean color. Bounds are inclusive, on a 0-255 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvGate {
    /// Lowest accepted saturation.
    pub min_saturation: u8,
    /// Highest accepted saturation.
    pub max_saturation: u8,
    /// Lowest accepted value (brightness).
    pub min_value: u8,
    /// Highest accepted value (brightness).
    pub max_value: u8,
}

impl HsvGate {
    /// Returns `true` if the saturation/value pair passes the gate.
    #[must_use]
    pub const fn accepts(&self, saturation: u8, value: u8) -> bool {
        saturation >= self.min_saturation
            && saturation <= self.max_saturation
            && value >= self.min_value
            && value <= self.max_value
    }
}

impl Default for HsvGate {
    fn default() -> Self {
        Self {
            min_saturation: 100,
            max_saturation: 255,
            min_value: 100,
            max_value: 255,
        }
    }
}

/// Hue ranges (0-180 scale) mapped to color labels.
///
/// Green and blue are open intervals `(low, high)`. Red wraps around the
/// hue circle: anything strictly below `red_below` or strictly above
/// `red_above`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueBands {
    /// Open interval for green.
    pub green: (f64, f64),
    /// Open interval for blue.
    pub blue: (f64, f64),
    /// Red if the hue is strictly below this.
    pub red_below: f64,
    /// Red if the hue is strictly above this.
    pub red_above: f64,
}

impl Default for HueBands {
    fn default() -> Self {
        Self {
            green: (40.0, 75.0),
            blue: (90.0, 140.0),
            red_below: 10.0,
            red_above: 165.0,
        }
    }
}

/// Which contour points count as touching the region border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BorderPolicy {
    /// Reject a contour if any point lies on any of the four border lines.
    #[default]
    AnyEdge,
    /// Reject a contour only if a point sits exactly on one of the four
    /// corners. Looser; lets shapes cut by the border through.
    CornerOnly,
}

/// Configuration for the detection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Grayscale level at or above which a pixel becomes foreground.
    pub binarize_threshold: u8,

    /// Polygon approximation tolerance as a fraction of the contour's
    /// perimeter.
    pub approx_tolerance_factor: f64,

    /// Contours whose bounding box is narrower or shorter than this many
    /// pixels are discarded as noise.
    pub min_shape_dim: u32,

    /// Pixels the region moves or resizes per input command.
    pub roi_step: u32,

    /// Saturation/value gate for color sampling.
    pub hsv_gate: HsvGate,

    /// Hue bands for color naming.
    pub hue_bands: HueBands,

    /// Open interval `(low, high)` of `height / width`. A quadrilateral
    /// whose ratio lies strictly inside is a square; on or outside the
    /// bounds it is a rectangle.
    pub square_ratio: (f64, f64),

    /// Border rejection rule.
    pub border_policy: BorderPolicy,
}

impl DetectorConfig {
    /// Default binarization threshold.
    pub const DEFAULT_BINARIZE_THRESHOLD: u8 = 127;
    /// Default approximation tolerance factor.
    pub const DEFAULT_APPROX_TOLERANCE_FACTOR: f64 = 0.01;
    /// Default minimum shape dimension in pixels.
    pub const DEFAULT_MIN_SHAPE_DIM: u32 = 30;
    /// Default region step in pixels.
    pub const DEFAULT_ROI_STEP: u32 = 10;
    /// Default square ratio band.
    pub const DEFAULT_SQUARE_RATIO: (f64, f64) = (0.9, 1.1);

    /// Check the configuration for values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: String| Err(PipelineError::InvalidConfig(msg));

        if !self.approx_tolerance_factor.is_finite() || self.approx_tolerance_factor <= 0.0 {
            return invalid(format!(
                "approx_tolerance_factor must be finite and positive, got {}",
                self.approx_tolerance_factor
            ));
        }
        if self.roi_step == 0 {
            return invalid("roi_step must be at least 1".to_owned());
        }
        let gate = &self.hsv_gate;
        if gate.min_saturation > gate.max_saturation || gate.min_value > gate.max_value {
            return invalid(format!("hsv_gate bounds are inverted: {gate:?}"));
        }
        let bands = &self.hue_bands;
        for (name, (low, high)) in [("green", bands.green), ("blue", bands.blue)] {
            if !(low < high) {
                return invalid(format!("hue band {name} is empty: ({low}, {high})"));
            }
        }
        if !(bands.red_below.is_finite() && bands.red_above.is_finite()) {
            return invalid("red hue bounds must be finite".to_owned());
        }
        let (low, high) = self.square_ratio;
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return invalid(format!("square_ratio is inverted: ({low}, {high})"));
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            binarize_threshold: Self::DEFAULT_BINARIZE_THRESHOLD,
            approx_tolerance_factor: Self::DEFAULT_APPROX_TOLERANCE_FACTOR,
            min_shape_dim: Self::DEFAULT_MIN_SHAPE_DIM,
            roi_step: Self::DEFAULT_ROI_STEP,
            hsv_gate: HsvGate::default(),
            hue_bands: HueBands::default(),
            square_ratio: Self::DEFAULT_SQUARE_RATIO,
            border_policy: BorderPolicy::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let config = DetectorConfig::default();
        assert_eq!(config.binarize_threshold, 127);
        assert!((config.approx_tolerance_factor - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.min_shape_dim, 30);
        assert_eq!(config.roi_step, 10);
        assert_eq!(config.hsv_gate.min_saturation, 100);
        assert_eq!(config.hsv_gate.max_value, 255);
        assert_eq!(config.border_policy, BorderPolicy::AnyEdge);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_step_is_rejected() {
        let config = DetectorConfig {
            roi_step: 0,
            ..DetectorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn nan_tolerance_is_rejected() {
        let config = DetectorConfig {
            approx_tolerance_factor: f64::NAN,
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_hue_band_is_rejected() {
        let config = DetectorConfig {
            hue_bands: HueBands {
                blue: (140.0, 90.0),
                ..HueBands::default()
            },
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_gate_is_rejected() {
        let config = DetectorConfig {
            hsv_gate: HsvGate {
                min_value: 200,
                max_value: 100,
                ..HsvGate::default()
            },
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn gate_bounds_are_inclusive() {
        let gate = HsvGate::default();
        assert!(gate.accepts(100, 100));
        assert!(gate.accepts(255, 255));
        assert!(!gate.accepts(99, 200));
        assert!(!gate.accepts(200, 99));
    }

    #[test]
    fn serde_round_trip() {
        let config = DetectorConfig {
            border_policy: BorderPolicy::CornerOnly,
            min_shape_dim: 12,
            ..DetectorConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: DetectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DetectorConfig = serde_json::from_str(r#"{"min_shape_dim": 5}"#).unwrap();
        assert_eq!(config.min_shape_dim, 5);
        assert_eq!(config.roi_step, DetectorConfig::DEFAULT_ROI_STEP);
    }
}
