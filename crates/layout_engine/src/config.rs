//! Placement configuration
//!
//! Controls how a grouping wrapper retreats when its parent cannot grant the
//! space it needs: each retry measures the child again at a smaller relative
//! scale until the scale floor or the retry bound is reached.

use crate::{PlacementError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for grouping placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Multiplier applied to the relative scale on each retry, in (0, 1)
    pub scale_step: f64,
    /// Smallest relative scale a retry may use
    pub minimum_relative_scale: f64,
    /// Maximum number of retries per placement pass
    pub max_scale_retries: u32,
    /// Tolerance when checking delimiter glyph geometry
    pub height_tolerance: f64,
    /// Content height assumed for an empty grouping at scale 1.0
    pub empty_content_height: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            scale_step: 0.8,
            minimum_relative_scale: 0.5,
            max_scale_retries: 4,
            height_tolerance: 1e-6,
            empty_content_height: 11.0,
        }
    }
}

impl PlacementConfig {
    /// Set the retry policy
    pub fn with_retry_policy(mut self, scale_step: f64, minimum_relative_scale: f64, max_retries: u32) -> Self {
        self.scale_step = scale_step;
        self.minimum_relative_scale = minimum_relative_scale;
        self.max_scale_retries = max_retries;
        self
    }

    /// Disable scale retries entirely
    pub fn without_retries(mut self) -> Self {
        self.max_scale_retries = 0;
        self
    }

    /// Decode and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a terminating retry policy
    pub fn validate(&self) -> Result<()> {
        if !(self.scale_step > 0.0 && self.scale_step < 1.0) {
            return Err(PlacementError::InvalidConfig(format!(
                "scale_step must be in (0, 1), got {}",
                self.scale_step
            )));
        }
        if !(self.minimum_relative_scale > 0.0) {
            return Err(PlacementError::InvalidConfig(format!(
                "minimum_relative_scale must be positive, got {}",
                self.minimum_relative_scale
            )));
        }
        if !(self.empty_content_height >= 0.0) {
            return Err(PlacementError::InvalidConfig(format!(
                "empty_content_height must not be negative, got {}",
                self.empty_content_height
            )));
        }
        Ok(())
    }

    /// Scale for the next retry, `None` when no further retry is allowed.
    ///
    /// The returned scale is always strictly smaller than `current`.
    pub fn next_scale(&self, current: f64, retries_done: u32) -> Option<f64> {
        if retries_done >= self.max_scale_retries {
            return None;
        }
        let next = (current * self.scale_step).max(self.minimum_relative_scale);
        (next < current).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PlacementConfig::default().validate().is_ok());
    }

    #[test]
    fn test_next_scale_sequence() {
        let config = PlacementConfig::default();
        let mut scale = 1.0;
        let mut retries = 0;
        let mut seen = vec![scale];
        while let Some(next) = config.next_scale(scale, retries) {
            assert!(next < scale);
            scale = next;
            retries += 1;
            seen.push(scale);
        }
        assert!(retries <= config.max_scale_retries);
        assert!(scale >= config.minimum_relative_scale);
        assert_eq!(seen.len(), retries as usize + 1);
    }

    #[test]
    fn test_next_scale_stops_at_floor() {
        let config = PlacementConfig::default().with_retry_policy(0.5, 0.4, 10);
        assert_eq!(config.next_scale(1.0, 0), Some(0.5));
        assert_eq!(config.next_scale(0.5, 1), Some(0.4));
        assert_eq!(config.next_scale(0.4, 2), None);
    }

    #[test]
    fn test_without_retries() {
        let config = PlacementConfig::default().without_retries();
        assert_eq!(config.next_scale(1.0, 0), None);
    }

    #[test]
    fn test_from_json_partial() {
        let config = PlacementConfig::from_json(r#"{"scale_step": 0.9}"#).unwrap();
        assert_eq!(config.scale_step, 0.9);
        assert_eq!(config.max_scale_retries, 4);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            PlacementConfig::from_json(r#"{"scale_step": 1.5}"#),
            Err(PlacementError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlacementConfig::from_json(r#"{"minimum_relative_scale": 0}"#),
            Err(PlacementError::InvalidConfig(_))
        ));
        assert!(matches!(
            PlacementConfig::from_json("not json"),
            Err(PlacementError::ConfigDecode(_))
        ));
    }
}
