//! Run configuration: credentials from the environment, tuning from a file.
//!
//! Credentials (required unless the run is a dry run):
//! - `MONDAY_API_KEY`  API token
//! - `MONDAY_BOARD_ID` numeric board id
//! - `MONDAY_GROUP_ID` optional target group
//! - `MONDAY_API_URL`  optional endpoint override
//!
//! Tuning is read from `$FINDER_CONFIG_PATH`, then `config/finder.toml`,
//! then `config/finder.json`, and falls back to built-in defaults.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyze::{LabelRules, ScoringConfig};
use crate::crm::{BoardTarget, ColumnRole, MappedColumn};
use crate::ingest::providers::QuerySettings;
use crate::upload::UploadOptions;

pub const ENV_CONFIG_PATH: &str = "FINDER_CONFIG_PATH";
pub const ENV_API_KEY: &str = "MONDAY_API_KEY";
pub const ENV_BOARD_ID: &str = "MONDAY_BOARD_ID";
pub const ENV_GROUP_ID: &str = "MONDAY_GROUP_ID";
pub const ENV_API_URL: &str = "MONDAY_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub board_id: u64,
    pub group_id: Option<String>,
    pub api_url: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = present(ENV_API_KEY).ok_or_else(|| anyhow!("{ENV_API_KEY} is not set"))?;
        let raw_board = present(ENV_BOARD_ID).ok_or_else(|| anyhow!("{ENV_BOARD_ID} is not set"))?;
        let board_id = raw_board
            .parse::<u64>()
            .with_context(|| format!("{ENV_BOARD_ID} must be numeric, got {raw_board:?}"))?;

        Ok(Self {
            api_key,
            board_id,
            group_id: present(ENV_GROUP_ID),
            api_url: present(ENV_API_URL),
        })
    }

    pub fn target(&self) -> BoardTarget {
        BoardTarget {
            board_id: self.board_id,
            group_id: self.group_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_status_label")]
    pub status_label: String,
    #[serde(default = "default_true")]
    pub attach_notes: bool,
    #[serde(default = "default_upload_delay_ms")]
    pub delay_ms: u64,
    /// Per-request timeout for board calls.
    #[serde(default = "default_upload_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_status_label() -> String {
    "New Lead".to_string()
}

fn default_true() -> bool {
    true
}

fn default_upload_delay_ms() -> u64 {
    1000
}

fn default_upload_timeout_secs() -> u64 {
    30
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            status_label: default_status_label(),
            attach_notes: true,
            delay_ms: default_upload_delay_ms(),
            timeout_secs: default_upload_timeout_secs(),
        }
    }
}

impl UploadSettings {
    pub fn options(&self) -> UploadOptions {
        UploadOptions {
            status_label: self.status_label.clone(),
            attach_notes: self.attach_notes,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub search: QuerySettings,
    #[serde(default = "LabelRules::default_types")]
    pub type_rules: LabelRules,
    #[serde(default = "LabelRules::default_locations")]
    pub location_rules: LabelRules,
    /// Known column ids; these win over title matching.
    #[serde(default)]
    pub columns: HashMap<ColumnRole, MappedColumn>,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default = "default_true")]
    pub backup: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            search: QuerySettings::default(),
            type_rules: LabelRules::default_types(),
            location_rules: LabelRules::default_locations(),
            columns: HashMap::new(),
            upload: UploadSettings::default(),
            backup: true,
        }
    }
}

impl FinderConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, &ext).with_context(|| format!("parsing {}", path.display()))
    }

    /// `$FINDER_CONFIG_PATH`, then `config/finder.toml`, then
    /// `config/finder.json`, then defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            return Self::load_from(&pb);
        }
        for candidate in ["config/finder.toml", "config/finder.json"] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default())
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<FinderConfig> {
    match hint_ext {
        "json" => Ok(serde_json::from_str(s)?),
        "toml" => Ok(toml::from_str(s)?),
        _ => match toml::from_str(s) {
            Ok(cfg) => Ok(cfg),
            Err(toml_err) => serde_json::from_str(s)
                .map_err(|_| anyhow!("unsupported config format: {toml_err}")),
        },
    }
}
