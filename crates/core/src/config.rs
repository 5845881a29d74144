// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading.
//!
//! Sources, in priority order: environment variables (`BAY_` prefix,
//! `__` as the nesting delimiter), a TOML config file, then these defaults.
//! The config file path is resolved from `BAY_CONFIG_FILE`, then
//! `./config.toml`, then `/etc/bay/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite://bay.db` in phase 1; `postgres://...` for multi-instance.
    pub url: String,
    pub echo: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://bay.db".to_string(), echo: false }
    }
}

/// Bay-process-to-runtime-container connection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectMode {
    /// Dial the container's IP on a shared Docker network.
    ContainerNetwork,
    /// Dial a published host port.
    HostPort,
    /// Prefer container-network, fall back to host-port.
    Auto,
}

impl Default for ConnectMode {
    fn default() -> Self {
        Self::Auto
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub socket: String,
    /// Network to attach runtime containers to. Empty means Docker's default
    /// bridge network.
    pub network: Option<String>,
    pub connect_mode: ConnectMode,
    pub host_address: String,
    pub publish_ports: bool,
    /// Fixed host port; `None`/`0` means engine-assigned.
    pub host_port: Option<u16>,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: "unix:///var/run/docker.sock".to_string(),
            network: None,
            connect_mode: ConnectMode::default(),
            host_address: "127.0.0.1".to_string(),
            publish_ports: true,
            host_port: None,
        }
    }
}

/// Kept for config-shape parity with the driver-selection knob; no
/// Kubernetes driver is implemented.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct K8sConfig {
    pub namespace: String,
    pub kubeconfig: Option<String>,
}

impl Default for K8sConfig {
    fn default() -> Self {
        Self { namespace: "bay".to_string(), kubeconfig: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverType {
    Docker,
    K8s,
}

impl Default for DriverType {
    fn default() -> Self {
        Self::Docker
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    #[serde(rename = "type")]
    pub kind: DriverType,
    pub docker: DockerConfig,
    pub k8s: K8sConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { kind: DriverType::default(), docker: DockerConfig::default(), k8s: K8sConfig::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSpec {
    pub cpus: f64,
    /// Human-readable memory amount, e.g. `"1g"`, `"512m"`.
    pub memory: String,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self { cpus: 1.0, memory: "1g".to_string() }
    }
}

/// A named runtime profile: image, resource caps, capability set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub id: String,
    pub image: String,
    /// Selects which adapter talks to the runtime container (e.g. `ship`).
    pub runtime_type: String,
    pub resources: ResourceSpec,
    pub capabilities: Vec<String>,
    /// Seconds of inactivity before the session is eligible for idle reclaim.
    pub idle_timeout: u64,
    /// In-container HTTP port the runtime listens on. Ship defaults to
    /// 8123; this is intentionally not hardcoded anywhere else.
    pub runtime_port: Option<u16>,
    pub env: HashMap<String, String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            image: "ship:latest".to_string(),
            runtime_type: "ship".to_string(),
            resources: ResourceSpec::default(),
            capabilities: vec!["filesystem".to_string(), "shell".to_string(), "python".to_string()],
            idle_timeout: 1800,
            runtime_port: Some(8123),
            env: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Host path under which managed workspace volumes are rooted. Never
    /// exposed to the runtime container.
    pub root_path: String,
    pub default_size_limit_mb: u64,
    /// Fixed in-container mount path.
    pub mount_path: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root_path: "/var/lib/bay/workspaces".to_string(),
            default_size_limit_mb: 1024,
            mount_path: "/workspace".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdempotencyConfig {
    pub enabled: bool,
    pub ttl_hours: u64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self { enabled: true, ttl_hours: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub jwt_expire_minutes: u64,
    pub blocked_hosts: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-in-production".to_string(),
            jwt_algorithm: "HS256".to_string(),
            jwt_expire_minutes: 60,
            blocked_hosts: vec![
                "169.254.0.0/16".to_string(),
                "10.0.0.0/8".to_string(),
                "172.16.0.0/12".to_string(),
                "192.168.0.0/16".to_string(),
            ],
        }
    }
}

fn default_profiles() -> Vec<ProfileConfig> {
    vec![
        ProfileConfig {
            id: "python-default".to_string(),
            image: "ship:latest".to_string(),
            resources: ResourceSpec { cpus: 1.0, memory: "1g".to_string() },
            ..ProfileConfig::default()
        },
        ProfileConfig {
            id: "python-data".to_string(),
            image: "ship:data".to_string(),
            resources: ResourceSpec { cpus: 2.0, memory: "4g".to_string() },
            ..ProfileConfig::default()
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub driver: DriverConfig,
    pub workspace: WorkspaceConfig,
    pub security: SecurityConfig,
    pub idempotency: IdempotencyConfig,
    pub profiles: Vec<ProfileConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            driver: DriverConfig::default(),
            workspace: WorkspaceConfig::default(),
            security: SecurityConfig::default(),
            idempotency: IdempotencyConfig::default(),
            profiles: default_profiles(),
        }
    }
}

/// Error loading or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnvVar { var: &'static str, value: String },
}

impl Settings {
    pub fn get_profile(&self, profile_id: &str) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|p| p.id == profile_id)
    }

    /// Load settings from, in priority order: environment variables, the
    /// resolved config file, then built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match Self::config_file_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("BAY_CONFIG_FILE") {
            return Some(PathBuf::from(path));
        }
        for candidate in ["config.toml", "/etc/bay/config.toml"] {
            let path = Path::new(candidate);
            if path.exists() {
                return Some(path.to_path_buf());
            }
        }
        None
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Overlay `BAY_`-prefixed environment variables on top of file/default
    /// values, mirroring the most commonly overridden knobs.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = std::env::var("BAY_SERVER__HOST") {
            self.server.host = v;
        }
        if let Some(v) = parse_env("BAY_SERVER__PORT")? {
            self.server.port = v;
        }
        if let Ok(v) = std::env::var("BAY_DATABASE__URL") {
            self.database.url = v;
        }
        if let Some(v) = parse_env("BAY_DATABASE__ECHO")? {
            self.database.echo = v;
        }
        if let Ok(v) = std::env::var("BAY_DRIVER__DOCKER__SOCKET") {
            self.driver.docker.socket = v;
        }
        if let Ok(v) = std::env::var("BAY_DRIVER__DOCKER__NETWORK") {
            self.driver.docker.network = Some(v);
        }
        if let Ok(v) = std::env::var("BAY_SECURITY__JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvVar { var, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
