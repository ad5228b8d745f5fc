//! Supported on-disk formats for config and workflow files

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::{Error, Result};

/// File format, selected by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
    Toml,
}

/// Extensions in lookup order when resolving a bare name
pub const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

impl FileFormat {
    /// Detect the format from a file path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        Self::from_extension(&ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} ({})", ext, path.display())))
    }

    /// Map an extension (without the dot) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    /// Canonical extension used when writing new files
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Yaml => "yaml",
            FileFormat::Json => "json",
            FileFormat::Toml => "toml",
        }
    }

    /// Parse text in this format
    pub fn parse<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        match self {
            FileFormat::Yaml => Ok(serde_yaml::from_str(content)?),
            FileFormat::Json => Ok(serde_json::from_str(content)?),
            FileFormat::Toml => Ok(toml::from_str(content)?),
        }
    }

    /// Render a value in this format
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            FileFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            FileFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            FileFormat::Toml => Ok(toml::to_string_pretty(value)?),
        }
    }

    /// Read and parse a file, choosing the format from its extension
    pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let format = Self::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        format.parse(&content)
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(&s.to_lowercase())
            .ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}
