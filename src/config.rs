//! Configuration for pitchline.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PITCHLINE_HOME, PITCHLINE_TOLERANCE)
//! 2. Config file (.pitchline/config.yaml)
//! 3. Defaults (~/.pitchline, built-in reconcile settings)
//!
//! Config file discovery:
//! - Searches current directory and parents for .pitchline/config.yaml
//! - `paths.home` in the config file is relative to the .pitchline/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::ReconcileSettings;
use crate::extract::TeamMap;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub reconcile: Option<ReconcileSettings>,
    #[serde(default)]
    pub teams: Option<TeamsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .pitchline/)
    pub home: Option<String>,
}

/// Keywords that attribute commentary lines to a side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamsConfig {
    #[serde(default = "default_home_keywords")]
    pub home_keywords: Vec<String>,
    #[serde(default = "default_away_keywords")]
    pub away_keywords: Vec<String>,
}

fn default_home_keywords() -> Vec<String> {
    vec!["red".to_string(), "home".to_string()]
}

fn default_away_keywords() -> Vec<String> {
    vec!["black".to_string(), "away".to_string()]
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            home_keywords: default_home_keywords(),
            away_keywords: default_away_keywords(),
        }
    }
}

impl TeamsConfig {
    /// Compile the keyword lists into a team map
    pub fn team_map(&self) -> Result<TeamMap> {
        TeamMap::from_keywords(&self.home_keywords, &self.away_keywords)
            .context("Invalid team keyword in config")
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Absolute path to pitchline home (run outputs)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Engine parameters
    pub reconcile: ReconcileSettings,
    /// Team attribution keywords
    pub teams: TeamsConfig,
}

impl ResolvedConfig {
    /// Directory holding per-run output folders
    pub fn runs_dir(&self) -> PathBuf {
        self.home.join("runs")
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(".pitchline").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Apply a PITCHLINE_TOLERANCE value to the match tolerance
fn apply_tolerance_override(settings: &mut ReconcileSettings, raw: Option<String>) -> Result<()> {
    if let Some(raw) = raw {
        settings.match_tolerance_seconds = raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid PITCHLINE_TOLERANCE: {}", raw))?;
    }
    Ok(())
}

/// Load configuration starting the file search at `start`
fn load_config_from(start: Option<PathBuf>) -> Result<ResolvedConfig> {
    // Default home directory
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".pitchline");

    let config_file = start.and_then(find_config_file_from);

    let (home, mut reconcile, teams) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        let home = if let Ok(env_home) = std::env::var("PITCHLINE_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            let pitchline_dir = config_path.parent().unwrap_or(Path::new("."));
            resolve_path(pitchline_dir, home_path)
        } else {
            default_home.clone()
        };

        (
            home,
            config.reconcile.unwrap_or_default(),
            config.teams.unwrap_or_default(),
        )
    } else {
        // No config file - use env vars or defaults
        let home = std::env::var("PITCHLINE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        (home, ReconcileSettings::default(), TeamsConfig::default())
    };

    apply_tolerance_override(&mut reconcile, std::env::var("PITCHLINE_TOLERANCE").ok())?;
    reconcile.validate().context("Invalid reconcile settings")?;
    teams.team_map()?;

    Ok(ResolvedConfig {
        home,
        config_file,
        reconcile,
        teams,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    load_config_from(std::env::current_dir().ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
