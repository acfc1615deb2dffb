//! Configuration file support for archboard
//!
//! Reads from .archboard/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Rendering defaults
    #[serde(default)]
    pub render: RenderConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Port for `archboard serve`
    /// Default: 8423
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Rendering defaults applied when a command or request omits them
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RenderConfig {
    /// Mermaid theme name
    /// Default: "dark"
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Minimum pixel height of the diagram container
    /// Default: 500
    #[serde(default = "default_height")]
    pub height_px: u32,
}

fn default_port() -> u16 {
    8423
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_height() -> u32 {
    500
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            height_px: default_height(),
        }
    }
}

impl Config {
    /// Load config from .archboard/config.toml
    /// Returns default config if file doesn't exist
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_path() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                if let Ok(config) = toml::from_str(&contents) {
                    return config;
                }
            }
        }
        Self::default()
    }

    /// Find config.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(".archboard").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }

    /// Render options derived from the configured defaults
    pub fn render_options(&self) -> crate::render::RenderOptions {
        crate::render::RenderOptions {
            theme: self.render.theme.clone(),
            height_px: self.render.height_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8423);
        assert_eq!(config.render.theme, "dark");
        assert_eq!(config.render.height_px, 500);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
port = 9000

[render]
theme = "default"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.render.theme, "default");
        // height keeps its default when omitted
        assert_eq!(config.render.height_px, 500);
    }

    #[test]
    fn test_render_options_follow_config() {
        let config: Config = toml::from_str("[render]\ntheme = \"forest\"\nheight_px = 720\n")
            .unwrap();
        let options = config.render_options();
        assert_eq!(options.theme, "forest");
        assert_eq!(options.height_px, 720);
    }
}
