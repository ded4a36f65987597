mod defaults;
mod validation;

use crate::cli::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use defaults::{
    default_ceiling_bytes, default_compressed_key, default_legacy_key, default_max_content_chars,
    default_max_decoded_bytes, default_overhead_reserve, default_stripped_content_chars,
};
pub use validation::{validate, MIN_CONTENT_CHARS};

/// Tunable limits and key names of a conversation store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Maximum byte length of the persisted payload
    #[serde(default = "default_ceiling_bytes")]
    pub ceiling_bytes: usize,
    /// Bytes kept free under the ceiling once a lone message has to be
    /// stripped or truncated. Not applied while evicting older messages.
    #[serde(default = "default_overhead_reserve")]
    pub overhead_reserve: usize,
    /// Absolute per-message character cap applied before compression
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// Character cap applied when multimodal metadata is stripped
    #[serde(default = "default_stripped_content_chars")]
    pub stripped_content_chars: usize,
    /// Inflated payloads above this size are treated as corrupt
    #[serde(default = "default_max_decoded_bytes")]
    pub max_decoded_bytes: usize,
    #[serde(default = "default_compressed_key")]
    pub compressed_key: String,
    #[serde(default = "default_legacy_key")]
    pub legacy_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ceiling_bytes: default_ceiling_bytes(),
            overhead_reserve: default_overhead_reserve(),
            max_content_chars: default_max_content_chars(),
            stripped_content_chars: default_stripped_content_chars(),
            max_decoded_bytes: default_max_decoded_bytes(),
            compressed_key: default_compressed_key(),
            legacy_key: default_legacy_key(),
        }
    }
}

impl StoreConfig {
    pub fn with_ceiling(mut self, ceiling_bytes: usize) -> Self {
        self.ceiling_bytes = ceiling_bytes;
        self
    }

    pub fn with_max_content_chars(mut self, max_content_chars: usize) -> Self {
        self.max_content_chars = max_content_chars;
        self
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        validate(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionSection {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub verbose: Option<bool>,
}

/// Contents of `.convostore.yaml` (or `.yml`/`.json`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub session: SessionSection,
}

/// Resolved settings of the `convo` driver.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub session_dir: Option<PathBuf>,
    pub verbose: bool,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = FileConfig::load()?;
        Self::from_sources(args, &file_config, |name| env::var(name).ok())
    }

    /// CLI args > environment > config file > defaults
    pub fn from_sources<F>(args: &Args, file_config: &FileConfig, env_var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut store = file_config.store.clone().unwrap_or_default();

        let parse_usize = |name: &str| -> Result<Option<usize>> {
            match env_var(name) {
                Some(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .map(Some)
                    .with_context(|| format!("{} must be a non-negative integer, got '{}'", name, raw)),
                None => Ok(None),
            }
        };

        if let Some(v) = parse_usize("CONVO_CEILING_BYTES")? {
            store.ceiling_bytes = v;
        }
        if let Some(v) = parse_usize("CONVO_OVERHEAD_RESERVE")? {
            store.overhead_reserve = v;
        }
        if let Some(v) = parse_usize("CONVO_MAX_CONTENT_CHARS")? {
            store.max_content_chars = v;
        }
        if let Some(v) = parse_usize("CONVO_MAX_DECODED_BYTES")? {
            store.max_decoded_bytes = v;
        }

        if let Some(ceiling) = args.ceiling {
            store.ceiling_bytes = ceiling;
        }

        store
            .validate()
            .context("Invalid conversation store configuration")?;

        let session_dir = args
            .session_dir
            .clone()
            .or_else(|| env_var("CONVO_SESSION_DIR").map(PathBuf::from))
            .or_else(|| file_config.session.dir.clone());

        let verbose = args.verbose
            || env_var("CONVO_VERBOSE")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .or(file_config.session.verbose)
                .unwrap_or(false);

        Ok(Config {
            store,
            session_dir,
            verbose,
        })
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".convostore.yaml"),
            PathBuf::from(".convostore.yml"),
            PathBuf::from(".convostore.json"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("convostore");
            paths.push(config_dir.join("convostore.yaml"));
            paths.push(config_dir.join("convostore.yml"));
            paths.push(config_dir.join("convostore.json"));
        }

        paths
    }
}
