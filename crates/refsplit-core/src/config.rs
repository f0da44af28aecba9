use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RefsplitError, Result};

/// Root application configuration, loaded from `~/.config/refsplit/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub split: SplitConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory receiving `<name>.correct`, `<name>.many.correct` and `<name>.log`.
    pub output_dir: String,
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Tag of the reference fields.
    pub tag: String,
    /// Records splitting one reference into more parts than this go to the "many" output.
    pub limit_split: usize,
    /// References with fewer pubnotes than this are never resolved.
    pub min_pubnotes: usize,
    pub provenance_note: String,
    /// Send the normalized form of report numbers to the matcher instead of the raw value.
    pub normalize_report_numbers: bool,
    pub year_tag: String,
    pub year_code: char,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Marcxml,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Marcxml => "marcxml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = RefsplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "marcxml" | "xml" => Ok(Self::Marcxml),
            "json" => Ok(Self::Json),
            other => Err(RefsplitError::ConfigError(format!(
                "unknown output format: {other}"
            ))),
        }
    }
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            output_format: OutputFormat::Marcxml,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            tag: "999".to_string(),
            limit_split: 5,
            min_pubnotes: 2,
            provenance_note: "Split reference".to_string(),
            normalize_report_numbers: true,
            year_tag: "773".to_string(),
            year_code: 'y',
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/refsplit/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("REFSPLIT_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("refsplit")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.split.tag.len() != 3 || !self.split.tag.chars().all(|c| c.is_ascii_digit()) {
            return Err(RefsplitError::ConfigError(format!(
                "split.tag must be a three digit field tag, got {:?}",
                self.split.tag
            )));
        }
        if self.split.min_pubnotes < 2 {
            return Err(RefsplitError::ConfigError(
                "split.min_pubnotes must be at least 2".to_string(),
            ));
        }
        Ok(())
    }

    /// Every key understood by [`AppConfig::get`].
    pub const KEYS: &'static [&'static str] = &[
        "core.output_dir",
        "core.output_format",
        "split.tag",
        "split.limit_split",
        "split.min_pubnotes",
        "split.provenance_note",
        "split.normalize_report_numbers",
        "split.year_tag",
        "split.year_code",
        "logging.level",
    ];

    /// Look up a single value by dotted key, e.g. `split.limit_split`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "core.output_dir" => self.core.output_dir.clone(),
            "core.output_format" => self.core.output_format.to_string(),
            "split.tag" => self.split.tag.clone(),
            "split.limit_split" => self.split.limit_split.to_string(),
            "split.min_pubnotes" => self.split.min_pubnotes.to_string(),
            "split.provenance_note" => self.split.provenance_note.clone(),
            "split.normalize_report_numbers" => self.split.normalize_report_numbers.to_string(),
            "split.year_tag" => self.split.year_tag.clone(),
            "split.year_code" => self.split.year_code.to_string(),
            "logging.level" => self.logging.level.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Apply `REFSPLIT_OUTPUT_DIR` and `REFSPLIT_LOG` overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("REFSPLIT_OUTPUT_DIR") {
            self.core.output_dir = dir;
        }
        if let Ok(level) = std::env::var("REFSPLIT_LOG") {
            self.logging.level = level;
        }
    }

    // ─── Derived paths ─────────────────────────────────────

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.core.output_dir)
    }
}
