//! Configuration management for the carousel host.
//!
//! Configuration is loaded from TOML files in the following locations (in order):
//! 1. `<platform config dir>/carousel/config.toml`
//! 2. `~/.config/carousel/config.toml`
//! 3. `./carousel.toml` (current directory, for development)
//!
//! A path given on the command line replaces the search entirely.

use anyhow::{Context, Result};
use carousel_core::CarouselOptions;
use carousel_dom::PageFixture;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine options passed to the carousel at mount.
    pub carousel: CarouselOptions,
    /// The headless page the carousel is mounted on.
    pub page: PageFixture,
    /// Host behavior.
    pub behavior: BehaviorConfig,
}

/// Behavior-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Deliver transition-end automatically after every signal that starts
    /// a transition, instead of waiting for an explicit `transition_end`.
    #[serde(default = "default_false")]
    pub auto_complete_transitions: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            auto_complete_transitions: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

/// A config value that was out of range and has been replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

impl Config {
    /// Load configuration from the first config file found.
    ///
    /// Falls back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        for path in config_paths() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Replace values the engine cannot work with and report what changed.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let defaults = CarouselOptions::default();

        if self.carousel.item_width <= 0 {
            warnings.push(ConfigWarning {
                field: "carousel.item_width",
                message: format!(
                    "{} is not positive, using {}",
                    self.carousel.item_width, defaults.item_width
                ),
            });
            self.carousel.item_width = defaults.item_width;
        }
        if self.carousel.margin_gap < 0 {
            warnings.push(ConfigWarning {
                field: "carousel.margin_gap",
                message: format!("{} is negative, using 0", self.carousel.margin_gap),
            });
            self.carousel.margin_gap = 0;
        }

        let page = PageFixture::default();
        if !self.page.viewport_width.is_finite() || self.page.viewport_width < 0.0 {
            warnings.push(ConfigWarning {
                field: "page.viewport_width",
                message: format!(
                    "{} is not a valid width, using {}",
                    self.page.viewport_width, page.viewport_width
                ),
            });
            self.page.viewport_width = page.viewport_width;
        }
        if !self.page.item_width.is_finite() || self.page.item_width <= 0.0 {
            warnings.push(ConfigWarning {
                field: "page.item_width",
                message: format!(
                    "{} is not a valid width, using {}",
                    self.page.item_width, page.item_width
                ),
            });
            self.page.item_width = page.item_width;
        }

        let count = self.page.item_count;
        let before = self.page.expandable_items.len();
        self.page.expandable_items.retain(|&index| index < count);
        if self.page.expandable_items.len() != before {
            warnings.push(ConfigWarning {
                field: "page.expandable_items",
                message: format!("dropped indices beyond item_count {}", count),
            });
        }

        warnings
    }
}

/// Get the list of config file paths to search.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Platform standard
    if let Some(proj_dirs) = ProjectDirs::from("com", "carousel", "carousel") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    // 2. Unix-style: ~/.config/carousel/config.toml
    if let Some(home) = dirs_home() {
        paths.push(home.join(".config").join("carousel").join("config.toml"));
    }

    // 3. Current directory
    paths.push(PathBuf::from("carousel.toml"));

    paths
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
