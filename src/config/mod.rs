//! Configuration file management
//!
//! Loads TOML configuration files and provides library settings.
//! Default config path: ~/.config/piglet/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{DEFAULT_BCM_HOST_LIBRARIES, DEFAULT_EGL_LIBRARIES, DEFAULT_GLES_LIBRARIES};

/// Library settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Native library locations
    pub libraries: LibraryConfig,
    /// Compositor display settings
    pub display: DisplayConfig,
    /// Context lifecycle settings
    pub lifecycle: LifecycleConfig,
}

/// Native library candidates, tried in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// bcm_host (platform bring-up and DispManX)
    pub bcm_host: Vec<String>,
    /// EGL implementation
    pub egl: Vec<String>,
    /// OpenGL ES 2.0 implementation
    pub gles: Vec<String>,
}

/// Compositor display settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Display index (0 = main LCD / HDMI)
    pub number: u16,
    /// Compositor layer of the rendering element
    pub layer: i32,
}

/// Context lifecycle settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Release already-acquired resources when creation fails part way.
    /// false leaves them allocated (the historical behavior).
    pub rollback_on_failure: bool,
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            bcm_host: to_strings(DEFAULT_BCM_HOST_LIBRARIES),
            egl: to_strings(DEFAULT_EGL_LIBRARIES),
            gles: to_strings(DEFAULT_GLES_LIBRARIES),
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            rollback_on_failure: true,
        }
    }
}

impl Config {
    /// System-wide config path
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/piglet/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. PIGLET_CONFIG environment variable
        if let Ok(path) = std::env::var("PIGLET_CONFIG") {
            let p = std::path::Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
        }

        // 2. User config: ~/.config/piglet/config.toml
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. System config: /etc/piglet/config.toml
        let system_config = std::path::Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. PIGLET_CONFIG environment variable
    /// 2. ~/.config/piglet/config.toml (user config)
    /// 3. /etc/piglet/config.toml (system config)
    /// 4. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Render settings as TOML (for template generation)
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("piglet").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.display.number, 0);
        assert_eq!(cfg.display.layer, 0);
        assert!(cfg.lifecycle.rollback_on_failure);
        assert_eq!(cfg.libraries.bcm_host[0], "libbcm_host.so");
        assert_eq!(cfg.libraries.egl[0], "libbrcmEGL.so");
        assert_eq!(cfg.libraries.gles[0], "libbrcmGLESv2.so");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_override() {
        let cfg = Config::from_toml_str(
            r#"
            [libraries]
            egl = ["/usr/lib/libEGL.so.1"]

            [lifecycle]
            rollback_on_failure = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.libraries.egl, vec!["/usr/lib/libEGL.so.1".to_string()]);
        assert_eq!(cfg.libraries.gles, LibraryConfig::default().gles);
        assert!(!cfg.lifecycle.rollback_on_failure);
        assert_eq!(cfg.display, DisplayConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml_str("[display]\nnumber = \"zero\"").is_err());
    }

    #[test]
    fn test_round_trip_template() {
        let mut cfg = Config::default();
        cfg.display.layer = 3;
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("piglet-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[display]\nlayer = 2\n").unwrap();
        let cfg = Config::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg.display.layer, 2);

        assert!(Config::load_from_file(std::path::Path::new("/nonexistent/piglet.toml")).is_err());
    }
}
