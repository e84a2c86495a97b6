use crate::document_model::{Document, LineEnding};
use log::{debug, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct RcConfig {
    pub case_sensitive: bool,
    pub wrap_search: bool,
    pub use_regex: bool,
    pub color: bool,
    pub line_ending: String,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            wrap_search: true,
            use_regex: false,
            color: true,
            line_ending: "unix".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct RcLoader;

impl RcLoader {
    /// Get the path to the RC file
    /// Looks for .quillrc in:
    /// 1. Current directory
    /// 2. Home directory (~/.quillrc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(".quillrc");
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        if let Ok(home) = env::var("HOME") {
            let home_rc = Path::new(&home).join(".quillrc");
            if home_rc.exists() {
                return Some(home_rc);
            }
        }

        None
    }

    /// Load the RC file if one exists, falling back to defaults.
    pub fn load_config() -> RcConfig {
        let Some(rc_path) = Self::get_rc_path() else {
            debug!("no .quillrc found, using defaults");
            return RcConfig::default();
        };

        match Self::load_from(&rc_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{e}");
                RcConfig::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<RcConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loading config from {}", path.display());
        let mut config = RcConfig::default();
        Self::parse_config_content(&content, &mut config);
        Ok(config)
    }

    fn parse_config_content(content: &str, config: &mut RcConfig) {
        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    fn parse_config_line(line: &str, config: &mut RcConfig) {
        // Remove inline comments
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        // Handle "set" commands (vim-style)
        if let Some(stripped) = line.strip_prefix("set ") {
            match stripped.trim() {
                "ignorecase" | "ic" => config.case_sensitive = false,
                "noignorecase" | "noic" => config.case_sensitive = true,
                "wrapscan" | "ws" => config.wrap_search = true,
                "nowrapscan" | "nows" => config.wrap_search = false,
                "magic" => config.use_regex = true,
                "nomagic" => config.use_regex = false,
                "color" => config.color = true,
                "nocolor" => config.color = false,
                setting => {
                    if let Some(value) = setting.strip_prefix("fileformat=") {
                        Self::set_line_ending(value, config);
                    } else {
                        debug!("ignoring unknown setting '{setting}'");
                    }
                }
            }
        }
        // Handle direct key-value pairs
        else if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            let enabled = value == "true" || value == "1" || value == "yes";

            match key.trim() {
                "case_sensitive" => config.case_sensitive = enabled,
                "ignorecase" => config.case_sensitive = !enabled,
                "wrap_search" | "wrapscan" => config.wrap_search = enabled,
                "regex" | "magic" => config.use_regex = enabled,
                "color" => config.color = enabled,
                "fileformat" | "line_ending" => Self::set_line_ending(value, config),
                key => debug!("ignoring unknown setting '{key}'"),
            }
        }
    }

    fn set_line_ending(value: &str, config: &mut RcConfig) {
        match value {
            "unix" | "dos" | "mac" => config.line_ending = value.to_string(),
            _ => {} // Invalid value, ignore
        }
    }

    pub fn line_ending(config: &RcConfig) -> LineEnding {
        match config.line_ending.as_str() {
            "dos" => LineEnding::Windows,
            "mac" => LineEnding::Mac,
            _ => LineEnding::Unix,
        }
    }

    /// Apply search settings, and the line ending for documents not read from disk.
    pub fn apply_to_document(document: &mut Document, config: &RcConfig) {
        document.search.case_sensitive = config.case_sensitive;
        document.search.wrap_search = config.wrap_search;
        document.search.use_regex = config.use_regex;

        if document.filename.is_none() {
            document.line_ending = Self::line_ending(config);
        }
    }

    /// Generate a sample RC file content
    pub fn generate_sample_rc() -> String {
        r#"# quill configuration file (.quillrc)
# Lines starting with # or " are comments

# Search settings
set noignorecase       # Case-sensitive search (or set ignorecase)
set wrapscan           # Next/previous match wraps around (or set nowrapscan)
set nomagic            # Literal patterns (or set magic for regular expressions)

# Output
set color              # Highlight matches (or set nocolor)

# File format for new files
set fileformat=unix    # Line endings: unix, dos, or mac

# Alternative key=value syntax:
# case_sensitive=true
# wrap_search=true
# regex=false
# color=true
# line_ending=unix
"#
        .to_string()
    }
}
