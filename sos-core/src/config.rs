use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::{Path, PathBuf}, time::Duration};

use crate::query::{DEFAULT_TIMEOUT_SECS, request_timeout};

/// One saved SOS server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    /// GetObservation timeout in seconds; the built-in default applies when
    /// unset and `0` disables the client-side timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<i64>,
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        request_timeout(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS as i64))
    }
}

/// Server the CLI should talk to, after resolving `--server` against the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedServer {
    /// Config entry name, or `None` when a bare URL was given.
    pub name: Option<String>,
    pub url: String,
    /// `None` means no client-side timeout.
    pub timeout: Option<Duration>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Name of the server used when `--server` is not given.
    pub default_server: Option<String>,

    /// Example TOML:
    /// [servers.coast]
    /// url = "https://sos.example.org/service"
    /// timeout_secs = 120
    #[serde(default)]
    pub servers: HashMap<String, ServerConfig>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "sos-client", "sos-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Add or replace a server. The first server ever saved becomes the default.
    pub fn upsert_server(&mut self, name: &str, url: &str, timeout_secs: Option<i64>) {
        self.servers.insert(
            name.to_string(),
            ServerConfig { url: url.trim().to_string(), timeout_secs },
        );

        if self.default_server.is_none() {
            self.default_server = Some(name.to_string());
        }
    }

    pub fn set_default_server(&mut self, name: &str) -> Result<()> {
        if !self.servers.contains_key(name) {
            return Err(anyhow!("Unknown server '{name}'"));
        }
        self.default_server = Some(name.to_string());
        Ok(())
    }

    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.get(name)
    }

    /// Resolve `--server`: a configured name, a literal http(s) URL, or the default.
    pub fn resolve_server(&self, requested: Option<&str>) -> Result<ResolvedServer> {
        let name = match requested {
            Some(value) if value.starts_with("http://") || value.starts_with("https://") => {
                return Ok(ResolvedServer {
                    name: None,
                    url: value.to_string(),
                    timeout: request_timeout(DEFAULT_TIMEOUT_SECS as i64),
                });
            }
            Some(name) => name,
            None => self.default_server.as_deref().ok_or_else(|| {
                anyhow!(
                    "No default server configured.\n\
                     Hint: run `sos configure <name> <url>` first, or pass --server <url>."
                )
            })?,
        };

        let server = self.server(name).ok_or_else(|| {
            anyhow!("Unknown server '{name}'. Run `sos servers` to list configured servers.")
        })?;

        Ok(ResolvedServer {
            name: Some(name.to_string()),
            url: server.url.clone(),
            timeout: server.timeout(),
        })
    }

    /// Server names, sorted.
    pub fn server_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.servers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
