//! Post-processor configuration
//!
//! Provides the [`PostConfig`] value handed to the emitter, optimizer and
//! export driver at call time. A configuration is built from defaults, an
//! optional config file (JSON or TOML), and an argument string, in that order.

use crate::args::PostArgs;
use postkit_core::{ConfigError, Error, MeasurementSystem, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest number of decimals accepted for coordinates and feeds
pub const MAX_PRECISION: usize = 10;

/// Dust collector directives added around the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DustCollection {
    /// Turn dust collection on at start (M208)
    pub on_at_start: bool,
    /// Turn dust collection off at end (M209)
    pub off_at_end: bool,
}

impl Default for DustCollection {
    fn default() -> Self {
        Self {
            on_at_start: true,
            off_at_end: false,
        }
    }
}

/// Complete post-processor configuration
///
/// Missing keys take their defaults; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostConfig {
    /// Skip the "Exported by" header block
    pub suppress_header: bool,
    /// Drop every comment line and comment command
    pub suppress_comments: bool,
    /// Prefix every line with an N word
    pub line_numbers: bool,
    /// Offer the program for review before saving
    pub show_editor: bool,
    /// Decimal digits; `None` uses the unit system default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<usize>,
    /// Lines issued before the first operation
    pub preamble: String,
    /// Lines issued after the last operation
    pub postamble: String,
    /// Lines issued before every operation
    pub pre_operation: String,
    /// Lines issued after every operation
    pub post_operation: String,
    /// Lines issued before every tool change
    pub tool_change: String,
    /// Output unit system
    pub units: MeasurementSystem,
    /// Drop a command name equal to the previous one
    pub modal_suppression: bool,
    /// Do not append G43 after tool changes
    pub suppress_tool_length_offset: bool,
    /// Drop axis words whose value did not change
    pub axis_modal: bool,
    /// Emit a tool measuring block after the tool list
    pub measure_tool: bool,
    /// Destination used for remote posting; empty asks the picker
    pub job_author: String,
    /// Hand the finished program to the uploader
    pub remote_post: bool,
    /// Programs larger than this many bytes skip the review step
    pub editor_size_limit: usize,
    /// Dust collector directives
    pub dust_collection: DustCollection,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            suppress_header: false,
            suppress_comments: false,
            line_numbers: false,
            show_editor: true,
            precision: None,
            preamble: "G17 G54 G40 G49 G80 G90".to_string(),
            postamble: "M05\nG17 G54 G90 G80 G40\nM300\nM2\n".to_string(),
            pre_operation: String::new(),
            post_operation: String::new(),
            tool_change: String::new(),
            units: MeasurementSystem::Metric,
            modal_suppression: false,
            suppress_tool_length_offset: false,
            axis_modal: false,
            measure_tool: false,
            job_author: String::new(),
            remote_post: true,
            editor_size_limit: 200_000,
            dust_collection: DustCollection::default(),
        }
    }
}

impl PostConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by an argument string
    pub fn from_arg_string(args: &str) -> std::result::Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_arg_string(args)?;
        Ok(config)
    }

    /// Apply an argument string; on error the config is left untouched
    pub fn apply_arg_string(&mut self, args: &str) -> std::result::Result<(), ConfigError> {
        let parsed = PostArgs::parse_str(args)?;
        let mut updated = self.clone();
        parsed.apply_to(&mut updated);
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Decimal digits used for lengths and feeds
    pub fn precision(&self) -> usize {
        self.precision
            .unwrap_or_else(|| self.units.default_precision())
    }

    /// Preamble with the dust collector start directive applied
    pub fn effective_preamble(&self) -> String {
        if self.dust_collection.on_at_start && !self.preamble.contains("M208") {
            format!("{}\nM208\n", self.preamble.trim_end())
        } else {
            self.preamble.clone()
        }
    }

    /// Postamble with the dust collector stop directive applied
    pub fn effective_postamble(&self) -> String {
        if self.dust_collection.off_at_end
            && !self.postamble.contains("M209")
            && self.postamble.contains("M300")
        {
            self.postamble.replace("M300", "M209\nM300")
        } else {
            self.postamble.clone()
        }
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("postkit").join("post.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                reason: format!("Invalid JSON config: {}", e),
            })?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                reason: format!("Invalid TOML config: {}", e),
            })?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
        };

        config.validate()?;
        tracing::debug!("Loaded post configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.precision() > MAX_PRECISION {
            return Err(ConfigError::InvalidValue {
                key: "precision".to_string(),
                reason: format!("must be at most {}", MAX_PRECISION),
            });
        }
        Ok(())
    }
}
