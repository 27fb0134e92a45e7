//! Configuration loading and path helpers.
//!
//! Figment merges `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Segmentation settings are validated up front: a bad chunk size or overlap
//! aborts the run before any document I/O happens.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        Ok(Self { figment })
    }

    /// Wraps an already-assembled figment. Lets callers and tests supply
    /// providers without going through the file/env merge in `load`.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Segmentation settings with defaults when the config has no
    /// `[segmentation]` section. A section that is present but malformed is
    /// fatal, not defaulted. The returned settings are already validated.
    pub fn segmentation(&self) -> Result<SegmentationSettings> {
        let settings = match self.figment.extract_inner::<SegmentationSettings>("segmentation") {
            Ok(settings) => settings,
            Err(e) if e.missing() => SegmentationSettings::default(),
            Err(e) => {
                return Err(Error::InvalidConfig(format!(
                    "bad [segmentation] section: {}",
                    e
                )))
            }
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// How raw document text is cut into chunks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// "structural" or "fixed".
    pub strategy: String,
    /// Window size in words for the fixed strategy.
    pub chunk_size: usize,
    /// Fraction of the window shared between consecutive chunks, in [0, 1).
    pub overlap_fraction: f32,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            strategy: "structural".to_string(),
            chunk_size: 100,
            overlap_fraction: 0.2,
        }
    }
}

impl SegmentationSettings {
    pub fn validate(&self) -> Result<()> {
        match self.strategy.as_str() {
            "structural" | "fixed" => {}
            other => {
                return Err(Error::InvalidConfig(format!(
                    "unknown segmentation strategy '{}'",
                    other
                )))
            }
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".to_string()));
        }
        if !(0.0..1.0).contains(&self.overlap_fraction) {
            return Err(Error::InvalidConfig(format!(
                "overlap_fraction {} outside [0, 1)",
                self.overlap_fraction
            )));
        }
        let stride = (self.chunk_size as f32 * (1.0 - self.overlap_fraction)).round() as usize;
        if stride < 1 {
            return Err(Error::InvalidConfig(format!(
                "chunk_size {} with overlap_fraction {} gives a non-advancing window",
                self.chunk_size, self.overlap_fraction
            )));
        }
        Ok(())
    }

    /// Window advance in words implied by `chunk_size` and `overlap_fraction`.
    pub fn stride(&self) -> usize {
        (self.chunk_size as f32 * (1.0 - self.overlap_fraction)).round() as usize
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
