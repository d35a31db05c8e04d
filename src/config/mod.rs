use clap::ValueEnum;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

use crate::domain::DEFAULT_RADIUS_M;

pub const ENV_USER_AGENT: &str = "CLINICMAP_USER_AGENT";
pub const ENV_DIRECTORY_URL: &str = "CLINICMAP_DIRECTORY_URL";
pub const ENV_DIRECTORY_API_KEY: &str = "CLINICMAP_DIRECTORY_API_KEY";

fn default_radius() -> u32 {
    DEFAULT_RADIUS_M
}
fn default_zoom() -> u8 {
    15
}
fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_radius")]
    pub radius: u32,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub services: Option<ServiceConfig>,
}

/// Which location a directory lookup is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentScope {
    /// The free-text location the user searched for
    #[default]
    Query,
    /// Each facility's own coordinates
    Facility,
}

fn default_user_agent() -> String {
    format!("clinicmap/{}", env!("CARGO_PKG_VERSION"))
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}
fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}
fn default_overpass_timeout_secs() -> u64 {
    25
}

/// Endpoints and identity used for every outbound request
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    /// Server-side `[timeout:N]` written into the Overpass query
    #[serde(default = "default_overpass_timeout_secs")]
    pub overpass_timeout_secs: u64,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            nominatim_url: default_nominatim_url(),
            overpass_url: default_overpass_url(),
            overpass_timeout_secs: default_overpass_timeout_secs(),
            directory: DirectoryConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Apply `CLINICMAP_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(agent) = get(ENV_USER_AGENT) {
            self.user_agent = agent;
        }
        if let Some(url) = get(ENV_DIRECTORY_URL) {
            self.directory.url = url;
        }
        if let Some(key) = get(ENV_DIRECTORY_API_KEY) {
            self.directory.api_key = Some(key);
        }
    }
}

/// Treat a blank string the same as an absent one
fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

fn default_directory_enabled() -> bool {
    true
}
fn default_directory_url() -> String {
    "https://www.practo.com/api/v1/doctors".to_string()
}

/// Third-party doctor directory used for best-effort enrichment
#[derive(Debug, Deserialize, Clone)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_enabled")]
    pub enabled: bool,
    #[serde(default = "default_directory_url")]
    pub url: String,
    #[serde(default, deserialize_with = "non_blank")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub scope: EnrichmentScope,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_directory_enabled(),
            url: default_directory_url(),
            api_key: None,
            scope: EnrichmentScope::default(),
        }
    }
}

impl DirectoryConfig {
    /// Enabled and holding an API key
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("clinicmap.toml"));
    paths.push(PathBuf::from(".clinicmap.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("clinicmap").join("config.toml"));
        paths.push(config_dir.join("clinicmap.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".clinicmap.toml"));
        paths.push(home.join(".config").join("clinicmap").join("config.toml"));
    }

    paths
}
