use notedown_html::RenderOptions;
use notedown_syntax::{Flavour, FlavourKind, MarkdownParser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Flavour as written in the config file: `"commonmark"` or `"gfm"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlavourName {
    CommonMark,
    #[default]
    Gfm,
}

impl From<FlavourName> for FlavourKind {
    fn from(name: FlavourName) -> Self {
        match name {
            FlavourName::CommonMark => FlavourKind::CommonMark,
            FlavourName::Gfm => FlavourKind::Gfm,
        }
    }
}

/// The `[render]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub safe_links: bool,
    pub absolutize_anchor_links: bool,
    pub base_uri: Option<String>,
    /// Unset means the flavour's default.
    pub tag_filter: Option<bool>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            safe_links: true,
            absolutize_anchor_links: false,
            base_uri: None,
            tag_filter: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub flavour: FlavourName,
    /// Report structural parse errors instead of falling back to plain text.
    pub assertions: bool,
    pub render: RenderSettings,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Environment variables in the base URI
        config.render.base_uri = config
            .render
            .base_uri
            .map(|uri| Self::expand_env(&uri).unwrap_or(uri));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/notedown");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn flavour(&self) -> FlavourKind {
        self.flavour.into()
    }

    pub fn parser(&self) -> MarkdownParser {
        MarkdownParser::new(Flavour::from_kind(self.flavour())).with_assertions(self.assertions)
    }

    pub fn render_options(&self) -> RenderOptions {
        let defaults = RenderOptions::for_flavour(self.flavour());
        RenderOptions {
            use_safe_links: self.render.safe_links,
            absolutize_anchor_links: self.render.absolutize_anchor_links,
            base_uri: self.render.base_uri.clone(),
            tag_filter: self.render.tag_filter.unwrap_or(defaults.tag_filter),
            ..defaults
        }
    }

    fn expand_env(value: &str) -> Option<String> {
        match shellexpand::env(value) {
            Ok(expanded) => Some(expanded.into_owned()),
            Err(_) => None,
        }
    }
}
