//! Window creation parameters and the file-backed configuration trait
//!
//! [`WindowParams`] carries everything the lifecycle manager needs to open a
//! window. Every field has a default so a partial TOML or RON file is enough:
//!
//! ```toml
//! title = "Random pixels"
//! width = 1024
//! height = 768
//! fullscreen = false
//! ```

pub use serde::{Deserialize, Serialize};

use crate::router::KeyRouting;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if std::path::Path::new(path).exists() {
            Self::load_from_file(path)
        } else {
            log::debug!("No config at {path}, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Parameters for opening a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    /// Title bar text
    pub title: String,
    /// Requested client-area width in pixels
    pub width: u32,
    /// Requested client-area height in pixels
    pub height: u32,
    /// Color depth of the pixel format (and of the display mode in fullscreen)
    pub bits: u8,
    /// Switch the display mode and open a borderless popup
    pub fullscreen: bool,
    /// Query the driver error state after each draw
    pub check_gl_errors: bool,
    /// How key messages map onto the key-down/key-up slots
    pub key_routing: KeyRouting,
}

impl WindowParams {
    /// Default title used when none is given
    pub const DEFAULT_TITLE: &'static str = "OpenGL window";

    /// Create parameters with the given title and all other fields defaulted
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the requested client-area size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the color depth
    pub fn with_bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }

    /// Enable or disable fullscreen mode
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    /// Enable or disable the driver error check in `display()`
    pub fn with_gl_error_checks(mut self, enabled: bool) -> Self {
        self.check_gl_errors = enabled;
        self
    }

    /// Choose how key messages are routed
    pub fn with_key_routing(mut self, routing: KeyRouting) -> Self {
        self.key_routing = routing;
        self
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "window size must be positive, got {}x{}",
                self.width, self.height
            ));
        }

        if self.bits == 0 {
            return Err("color depth must be at least 1 bit".to_string());
        }

        if self.title.contains('\0') {
            return Err("title must not contain NUL characters".to_string());
        }

        Ok(())
    }
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            title: Self::DEFAULT_TITLE.to_string(),
            width: 800,
            height: 600,
            bits: 32,
            fullscreen: false,
            check_gl_errors: true,
            key_routing: KeyRouting::default(),
        }
    }
}

impl Config for WindowParams {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = WindowParams::default();
        assert_eq!(params.title, "OpenGL window");
        assert_eq!((params.width, params.height), (800, 600));
        assert_eq!(params.bits, 32);
        assert!(!params.fullscreen);
        assert!(params.check_gl_errors);
        assert_eq!(params.key_routing, KeyRouting::Direct);
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let params = WindowParams::default().with_size(0, 600);
        assert!(params.validate().is_err());

        let params = WindowParams::default().with_size(800, 0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nul_in_title() {
        let params = WindowParams::new("bad\0title");
        assert!(params.validate().is_err());
        assert!(WindowParams::new("fine").validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let params: WindowParams = toml::from_str("title = \"Pixels\"\nwidth = 1024\n").unwrap();
        assert_eq!(params.title, "Pixels");
        assert_eq!(params.width, 1024);
        assert_eq!(params.height, 600);
        assert_eq!(params.bits, 32);
    }

    #[test]
    fn test_key_routing_parses_from_toml() {
        let params: WindowParams = toml::from_str("key_routing = \"swapped\"\n").unwrap();
        assert_eq!(params.key_routing, KeyRouting::Swapped);
    }

    #[test]
    fn test_ron_config() {
        let params: WindowParams =
            ron::from_str("(title: \"ron window\", fullscreen: true)").unwrap();
        assert_eq!(params.title, "ron window");
        assert!(params.fullscreen);
        assert_eq!(params.width, 800);
    }

    #[test]
    fn test_save_and_load_toml_file() {
        let path = std::env::temp_dir().join(format!("gl_window_params_{}.toml", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let params = WindowParams::new("saved").with_size(640, 480).with_bits(24);
        params.save_to_file(&path).unwrap();
        let loaded = WindowParams::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, params);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = WindowParams::load_from_file("window.ini");
        // Missing file is reported before the extension is inspected
        assert!(matches!(result, Err(ConfigError::Io(_))));

        let result = WindowParams::default().save_to_file("window.ini");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let params = WindowParams::load_or_default("definitely/not/here.toml").unwrap();
        assert_eq!(params, WindowParams::default());
    }
}
