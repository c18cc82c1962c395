// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigError, SceneConfig, SceneVariant};

#[derive(Parser, Debug, Clone)]
#[command(name = "orbit-scene")]
#[command(about = "Animated primitive scene with orbit controls", long_about = None)]
pub struct Cli {
    /// JSON scene configuration; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Scene layout
    #[arg(long, value_enum)]
    pub variant: Option<SceneVariant>,

    /// Number of objects in the scene
    #[arg(long = "objects")]
    pub object_count: Option<usize>,

    /// HDR or PNG panorama used as background and ambient light
    #[arg(long)]
    pub environment: Option<PathBuf>,

    /// Apply orbit input immediately instead of easing it out
    #[arg(long = "no-damping", default_value = "false")]
    pub no_damping: bool,

    /// Run without a window, ticking a recording backend
    #[arg(long, default_value = "false")]
    pub headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Initial window width
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    pub fn scene_config(&self) -> Result<SceneConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load_from_file(path)?,
            None => SceneConfig::default(),
        };

        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(count) = self.object_count {
            config.object_count = Some(count);
        }
        if let Some(path) = &self.environment {
            config.environment = Some(path.clone());
        }
        if self.no_damping {
            config.enable_damping = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["orbit-scene"]);
        assert!(!cli.headless);
        assert_eq!((cli.width, cli.height), (800, 600));
        assert_eq!(cli.scene_config().unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "orbit-scene",
            "--variant",
            "basic",
            "--objects",
            "2",
            "--no-damping",
            "--headless",
            "--frames",
            "10",
        ]);
        let config = cli.scene_config().unwrap();
        assert_eq!(config.variant, SceneVariant::Basic);
        assert_eq!(config.object_count(), 2);
        assert!(!config.enable_damping);
        assert_eq!(cli.frames, Some(10));
    }

    #[test]
    fn test_override_is_validated() {
        let cli = Cli::parse_from(["orbit-scene", "--objects", "99"]);
        assert!(matches!(cli.scene_config(), Err(ConfigError::Invalid(_))));
    }
}
