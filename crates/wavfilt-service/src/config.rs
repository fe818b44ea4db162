// SPDX-License-Identifier: LGPL-3.0-or-later

//! Service configuration.
//!
//! Resolution order: built-in defaults, then an optional TOML file
//! (`WAVFILT_CONFIG`, else `./wavfilt.toml`), then `WAVFILT_*` environment
//! variables, then [`ServiceConfig::sanitize`] clamps everything into range.
//!
//! ```toml
//! media_root = "/var/lib/wavfilt/media"
//! media_url = "/media/"
//! freq_points = 1024
//! impulse_len = 2048
//! max_plot_points = 2000
//! log_spacing = true
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{Context, Result};
use serde::Deserialize;
use wavfilt_dsp_units::analysis::{ImpulseLength, ResponseAnalyzer, Spacing};
use wavfilt_dsp_units::consts::{
    DFL_FREQ_POINTS, DFL_IMPULSE_LEN, DFL_MAX_PLOT_POINTS, MAX_IMPULSE_LEN, MIN_IMPULSE_LEN,
};

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "WAVFILT_CONFIG";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "wavfilt.toml";

const ENV_MEDIA_ROOT: &str = "WAVFILT_MEDIA_ROOT";
const ENV_MEDIA_URL: &str = "WAVFILT_MEDIA_URL";
const ENV_FREQ_POINTS: &str = "WAVFILT_FREQ_POINTS";
const ENV_IMPULSE_LEN: &str = "WAVFILT_IMPULSE_LEN";
const ENV_MAX_PLOT_POINTS: &str = "WAVFILT_MAX_PLOT_POINTS";
const ENV_LOG_SPACING: &str = "WAVFILT_LOG_SPACING";

const DFL_MEDIA_ROOT: &str = "media";
const DFL_MEDIA_URL: &str = "/media/";

const MIN_FREQ_POINTS: usize = 16;
const MAX_FREQ_POINTS: usize = 65_536;
const MIN_PLOT_POINTS: usize = 2;
const MAX_PLOT_POINTS: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Directory holding uploaded and filtered WAV files.
    pub media_root: PathBuf,
    /// URL prefix prepended to file names in download links.
    pub media_url: String,
    /// Frequency-response points.
    pub freq_points: usize,
    /// Impulse-response length in samples.
    pub impulse_len: usize,
    /// Upper bound on points per plotted curve.
    pub max_plot_points: usize,
    /// Logarithmic frequency spacing instead of linear.
    pub log_spacing: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ServiceConfig {
    pub fn defaults() -> Self {
        Self {
            media_root: PathBuf::from(DFL_MEDIA_ROOT),
            media_url: DFL_MEDIA_URL.to_owned(),
            freq_points: DFL_FREQ_POINTS,
            impulse_len: DFL_IMPULSE_LEN,
            max_plot_points: DFL_MAX_PLOT_POINTS,
            log_spacing: false,
        }
    }

    /// Load from file and process environment.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::defaults();

        if let Some(file_cfg) = load_file_config()? {
            cfg.apply_file(file_cfg);
        }

        cfg.apply_env(|name| env::var(name).ok());
        cfg.sanitize();

        Ok(cfg)
    }

    /// Load from an explicit file, ignoring the default lookup. Environment
    /// overrides still apply.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = Self::defaults();
        cfg.apply_file(read_toml(path)?);
        cfg.apply_env(|name| env::var(name).ok());
        cfg.sanitize();
        Ok(cfg)
    }

    /// Parse a TOML document on top of the defaults (no environment).
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg = Self::defaults();
        cfg.apply_file(toml::from_str::<FileConfig>(s).context("invalid TOML config")?);
        cfg.sanitize();
        Ok(cfg)
    }

    fn apply_file(&mut self, fc: FileConfig) {
        if let Some(v) = fc.media_root {
            self.media_root = v;
        }
        if let Some(v) = fc.media_url {
            self.media_url = v;
        }
        if let Some(v) = fc.freq_points {
            self.freq_points = v;
        }
        if let Some(v) = fc.impulse_len {
            self.impulse_len = v;
        }
        if let Some(v) = fc.max_plot_points {
            self.max_plot_points = v;
        }
        if let Some(v) = fc.log_spacing {
            self.log_spacing = v;
        }
    }

    /// Apply `WAVFILT_*` overrides read through `lookup`. Unparsable
    /// values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_MEDIA_ROOT) {
            self.media_root = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_MEDIA_URL) {
            self.media_url = v;
        }
        if let Some(v) = env_parse::<usize>(&lookup, ENV_FREQ_POINTS) {
            self.freq_points = v;
        }
        if let Some(v) = env_parse::<usize>(&lookup, ENV_IMPULSE_LEN) {
            self.impulse_len = v;
        }
        if let Some(v) = env_parse::<usize>(&lookup, ENV_MAX_PLOT_POINTS) {
            self.max_plot_points = v;
        }
        if let Some(v) = lookup(ENV_LOG_SPACING).and_then(|v| parse_bool(&v)) {
            self.log_spacing = v;
        }
    }

    /// Clamp instead of failing.
    pub fn sanitize(&mut self) {
        if self.media_root.as_os_str().is_empty() {
            self.media_root = PathBuf::from(DFL_MEDIA_ROOT);
        }
        if !self.media_url.ends_with('/') {
            self.media_url.push('/');
        }

        self.freq_points = self.freq_points.clamp(MIN_FREQ_POINTS, MAX_FREQ_POINTS);
        self.impulse_len = self.impulse_len.clamp(MIN_IMPULSE_LEN, MAX_IMPULSE_LEN);
        self.max_plot_points = self.max_plot_points.clamp(MIN_PLOT_POINTS, MAX_PLOT_POINTS);
    }

    /// Response analyzer configured from these settings.
    pub fn analyzer(&self) -> ResponseAnalyzer {
        let mut analyzer = ResponseAnalyzer::new();
        analyzer
            .set_freq_points(self.freq_points)
            .set_impulse_len(ImpulseLength::Fixed(self.impulse_len))
            .set_spacing(if self.log_spacing {
                Spacing::Logarithmic
            } else {
                Spacing::Linear
            });
        analyzer
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    media_root: Option<PathBuf>,
    media_url: Option<String>,
    freq_points: Option<usize>,
    impulse_len: Option<usize>,
    max_plot_points: Option<usize>,
    log_spacing: Option<bool>,
}

fn env_parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse::<T>().ok())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn load_file_config() -> Result<Option<FileConfig>> {
    if let Ok(p) = env::var(ENV_CONFIG) {
        let path = PathBuf::from(p);
        if !path.exists() {
            anyhow::bail!(
                "{ENV_CONFIG} points to a missing file: {}",
                path.display()
            );
        }
        return Ok(Some(read_toml(&path)?));
    }

    let path = PathBuf::from(LOCAL_CONFIG_FILE);
    if path.exists() {
        return Ok(Some(read_toml(&path)?));
    }

    Ok(None)
}

fn read_toml(path: &Path) -> Result<FileConfig> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<FileConfig>(&s).with_context(|| format!("invalid TOML in {}", path.display()))
}
