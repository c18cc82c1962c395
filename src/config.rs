//! Scene configuration.
//!
//! Every option has a default, so an empty JSON object (or no file at all)
//! yields the three-object showcase scene.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_STEP: f64 = 0.01;
pub const DEFAULT_DAMPING_FACTOR: f32 = 0.05;
pub const DEFAULT_AMBIENT_INTENSITY: f32 = 0.5;
pub const DEFAULT_DIRECTIONAL_INTENSITY: f32 = 1.0;
pub const MAX_OBJECTS: usize = 16;

/// Which of the two scene layouts to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SceneVariant {
    /// Torus knot, sphere and cuboid side by side under a directional light
    #[default]
    Showcase,
    /// A single torus knot under a point light
    Basic,
}

impl SceneVariant {
    pub fn default_object_count(self) -> usize {
        match self {
            SceneVariant::Showcase => 3,
            SceneVariant::Basic => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    pub variant: SceneVariant,
    pub ambient_intensity: f32,
    /// Key light intensity: the directional light in the showcase, the point light in the basic scene
    pub directional_intensity: f32,
    /// Overrides the variant's object count when set
    pub object_count: Option<usize>,
    /// Radians per frame for the first object; object `i` spins at `(i + 1) * base_step`
    pub base_step: f64,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub environment: Option<PathBuf>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            variant: SceneVariant::default(),
            ambient_intensity: DEFAULT_AMBIENT_INTENSITY,
            directional_intensity: DEFAULT_DIRECTIONAL_INTENSITY,
            object_count: None,
            base_step: DEFAULT_BASE_STEP,
            enable_damping: true,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            environment: None,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn object_count(&self) -> usize {
        self.object_count
            .unwrap_or_else(|| self.variant.default_object_count())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let count = self.object_count();
        if count == 0 || count > MAX_OBJECTS {
            return Err(ConfigError::Invalid(format!(
                "objectCount must be between 1 and {MAX_OBJECTS}, got {count}"
            )));
        }
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "dampingFactor must be in (0, 1], got {}",
                self.damping_factor
            )));
        }
        if !self.base_step.is_finite() || self.base_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "baseStep must be a positive number, got {}",
                self.base_step
            )));
        }
        for (name, value) in [
            ("ambientIntensity", self.ambient_intensity),
            ("directionalIntensity", self.directional_intensity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = SceneConfig::from_json("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.object_count(), 3);
    }

    #[test]
    fn test_recognized_options_are_camel_case() {
        let config = SceneConfig::from_json(
            r#"{ "ambientIntensity": 0.25, "directionalIntensity": 2.0, "objectCount": 5 }"#,
        )
        .unwrap();
        assert_eq!(config.ambient_intensity, 0.25);
        assert_eq!(config.directional_intensity, 2.0);
        assert_eq!(config.object_count(), 5);
    }

    #[test]
    fn test_basic_variant_defaults_to_one_object() {
        let config = SceneConfig::from_json(r#"{ "variant": "basic" }"#).unwrap();
        assert_eq!(config.variant, SceneVariant::Basic);
        assert_eq!(config.object_count(), 1);
    }

    #[test]
    fn test_rejects_zero_objects() {
        let err = SceneConfig::from_json(r#"{ "objectCount": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_out_of_range_damping() {
        for factor in ["0.0", "1.5", "-0.1"] {
            let json = format!(r#"{{ "dampingFactor": {factor} }}"#);
            assert!(SceneConfig::from_json(&json).is_err(), "accepted {factor}");
        }
        assert!(SceneConfig::from_json(r#"{ "dampingFactor": 1.0 }"#).is_ok());
    }

    #[test]
    fn test_rejects_negative_intensity() {
        let err = SceneConfig::from_json(r#"{ "ambientIntensity": -1 }"#).unwrap_err();
        assert!(err.to_string().contains("ambientIntensity"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = SceneConfig::from_json("{ objectCount: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SceneConfig::load_from_file("/nonexistent/scene.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
