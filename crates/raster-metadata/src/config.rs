//! Configuration for the metadata extractor.

use raster_common::SamplingStride;
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::RasterMetadataExtractor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Row/column interval used when sampling bands for extrema.
    pub stride: SamplingStride,

    /// What to do when no finite sample is found.
    pub empty_extrema: EmptyExtremaPolicy,

    /// Minimum reported when defaults are substituted.
    pub empty_min: f64,

    /// Maximum reported when defaults are substituted.
    pub empty_max: f64,

    /// Extra vertices inserted along each footprint edge before reprojection.
    pub densify_points: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            stride: SamplingStride::default(),
            empty_extrema: EmptyExtremaPolicy::Default,
            empty_min: 0.0,
            empty_max: 100.0,
            densify_points: 0,
        }
    }
}

impl ExtractorConfig {
    /// Upper bound on `densify_points`.
    pub const MAX_DENSIFY_POINTS: usize = 1000;

    /// Load configuration from environment variables.
    ///
    /// `RASTER_SAMPLE_STRIDE` sets both axes; `RASTER_SAMPLE_STRIDE_ROWS` and
    /// `RASTER_SAMPLE_STRIDE_COLS` override one axis each.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RASTER_SAMPLE_STRIDE") {
            if let Ok(step) = val.parse() {
                config.stride = SamplingStride::uniform(step);
            }
        }

        if let Ok(val) = std::env::var("RASTER_SAMPLE_STRIDE_ROWS") {
            if let Ok(rows) = val.parse() {
                config.stride = SamplingStride::new(rows, config.stride.cols);
            }
        }

        if let Ok(val) = std::env::var("RASTER_SAMPLE_STRIDE_COLS") {
            if let Ok(cols) = val.parse() {
                config.stride = SamplingStride::new(config.stride.rows, cols);
            }
        }

        if let Ok(val) = std::env::var("RASTER_EMPTY_EXTREMA") {
            config.empty_extrema = EmptyExtremaPolicy::from_str(&val);
        }

        if let Ok(val) = std::env::var("RASTER_EMPTY_MIN") {
            if let Ok(min) = val.parse() {
                config.empty_min = min;
            }
        }

        if let Ok(val) = std::env::var("RASTER_EMPTY_MAX") {
            if let Ok(max) = val.parse() {
                config.empty_max = max;
            }
        }

        if let Ok(val) = std::env::var("RASTER_DENSIFY_POINTS") {
            if let Ok(points) = val.parse() {
                config.densify_points = points;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.stride.rows == 0 || self.stride.cols == 0 {
            return Err("sampling stride must be > 0 on both axes".to_string());
        }

        if !self.empty_min.is_finite() || !self.empty_max.is_finite() {
            return Err("empty_min and empty_max must be finite".to_string());
        }

        if self.empty_min > self.empty_max {
            return Err(format!(
                "empty_min ({}) must not exceed empty_max ({})",
                self.empty_min, self.empty_max
            ));
        }

        if self.densify_points > Self::MAX_DENSIFY_POINTS {
            return Err(format!(
                "densify_points must be <= {}",
                Self::MAX_DENSIFY_POINTS
            ));
        }

        Ok(())
    }
}

/// Behaviour when an extrema scan finds no finite sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyExtremaPolicy {
    /// Report the configured default min/max and carry on.
    #[default]
    Default,
    /// Abort extraction with [`crate::MetadataError::EmptyExtrema`].
    Fail,
}

impl EmptyExtremaPolicy {
    /// Parse from string (case-insensitive); unknown values keep the default.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fail" | "error" => Self::Fail,
            _ => Self::Default,
        }
    }

    /// Get the policy name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Fail => "fail",
        }
    }
}

impl std::fmt::Display for EmptyExtremaPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
