// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker driver implementation, via `bollard`.
//!
//! Supports three connectivity modes between Bay and runtime containers:
//! - `container_network`: Bay reaches the runtime by its container IP on a
//!   shared Docker network.
//! - `host_port`: Bay reaches the runtime via a published host port
//!   (`<host_address>:<host_port>`).
//! - `auto`: prefer container-network, fall back to host-port.
//!
//! This matters because Bay may run on the host (the common case, where it
//! cannot reach a container IP on a user-defined bridge without also being
//! attached to that bridge) or inside a container itself with the Docker
//! socket mounted (where it can reach sibling containers directly).
//!
//! `runtime_port` always comes from the profile; it is never hardcoded here.

use bollard::container::{
    Config, CreateContainerOptions, LogsOptions, RemoveContainerOptions, StopContainerOptions,
};
use bollard::models::{ContainerStateStatusEnum, HostConfig, PortBinding};
use bollard::volume::{CreateVolumeOptions, RemoveVolumeOptions};
use bollard::Docker;
use futures_util::StreamExt;
use std::collections::HashMap;

use async_trait::async_trait;
use bay_core::{ConnectMode, DockerConfig};

use crate::driver::{ContainerInfo, ContainerStatus, CreateSpec, Driver};
use crate::error::DriverError;

/// Fixed in-container mount point for the workspace volume. Matches
/// `bay_core::WorkspaceConfig::mount_path`; kept as a local constant since
/// the driver layer shouldn't depend on the config crate's defaults.
const WORKSPACE_MOUNT_PATH: &str = "/workspace";

fn parse_memory(spec: &str) -> Result<i64, DriverError> {
    let spec = spec.trim().to_lowercase();
    let (digits, multiplier) = match spec.chars().last() {
        Some('k') => (&spec[..spec.len() - 1], 1024_f64),
        Some('m') => (&spec[..spec.len() - 1], 1024_f64 * 1024.0),
        Some('g') => (&spec[..spec.len() - 1], 1024_f64 * 1024.0 * 1024.0),
        _ => (spec.as_str(), 1.0),
    };
    let value: f64 = digits
        .parse()
        .map_err(|_| DriverError::Engine(format!("invalid memory spec: {spec}")))?;
    Ok((value * multiplier) as i64)
}

fn is_not_found(err: &bollard::errors::Error) -> bool {
    matches!(err, bollard::errors::Error::DockerResponseServerError { status_code, .. } if *status_code == 404)
}

pub struct DockerDriver {
    client: Docker,
    network: Option<String>,
    connect_mode: ConnectMode,
    host_address: String,
    publish_ports: bool,
    host_port: Option<u16>,
}

impl DockerDriver {
    pub fn new(cfg: &DockerConfig) -> Result<Self, DriverError> {
        let socket = cfg.socket.strip_prefix("unix://").unwrap_or(&cfg.socket);
        let client = Docker::connect_with_unix(socket, 120, bollard::API_DEFAULT_VERSION)
            .map_err(|e| DriverError::Engine(e.to_string()))?;
        Ok(Self {
            client,
            network: cfg.network.clone(),
            connect_mode: cfg.connect_mode,
            host_address: cfg.host_address.clone(),
            publish_ports: cfg.publish_ports,
            host_port: cfg.host_port,
        })
    }

    async fn network_exists(&self, name: &str) -> bool {
        self.client.inspect_network::<String>(name, None).await.is_ok()
    }

    fn resolve_container_ip(&self, info: &bollard::models::ContainerInspectResponse) -> Option<String> {
        let networks = info.network_settings.as_ref()?.networks.as_ref()?;
        if networks.is_empty() {
            return None;
        }
        if let Some(name) = &self.network {
            if let Some(endpoint) = networks.get(name) {
                if let Some(ip) = &endpoint.ip_address {
                    if !ip.is_empty() {
                        return Some(ip.clone());
                    }
                }
            }
        }
        networks.values().find_map(|e| e.ip_address.clone().filter(|ip| !ip.is_empty()))
    }

    fn resolve_host_port(
        &self,
        info: &bollard::models::ContainerInspectResponse,
        runtime_port: u16,
    ) -> Option<(String, u16)> {
        let ports = info.network_settings.as_ref()?.ports.as_ref()?;
        let key = format!("{runtime_port}/tcp");
        let bindings = ports.get(&key)?.as_ref()?;
        let binding = bindings.first()?;
        let host_port: u16 = binding.host_port.as_ref()?.parse().ok()?;
        let host_ip = binding.host_ip.clone().unwrap_or_default();
        let host_ip = if host_ip.is_empty() || host_ip == "0.0.0.0" || host_ip == "::" {
            self.host_address.clone()
        } else {
            host_ip
        };
        Some((host_ip, host_port))
    }

    fn endpoint_from(&self, info: &bollard::models::ContainerInspectResponse, runtime_port: u16) -> Option<String> {
        if matches!(self.connect_mode, ConnectMode::ContainerNetwork | ConnectMode::Auto) {
            if let Some(ip) = self.resolve_container_ip(info) {
                return Some(format!("http://{ip}:{runtime_port}"));
            }
        }
        if matches!(self.connect_mode, ConnectMode::HostPort | ConnectMode::Auto) {
            if let Some((host, port)) = self.resolve_host_port(info, runtime_port) {
                return Some(format!("http://{host}:{port}"));
            }
        }
        None
    }
}

#[async_trait]
impl Driver for DockerDriver {
    async fn create(&self, spec: CreateSpec<'_>) -> Result<String, DriverError> {
        let mut labels = HashMap::from([
            ("bay.owner".to_string(), spec.owner.to_string()),
            ("bay.sandbox_id".to_string(), spec.sandbox_id.to_string()),
            ("bay.session_id".to_string(), spec.session_id.to_string()),
            ("bay.workspace_id".to_string(), spec.workspace_id.to_string()),
            ("bay.profile_id".to_string(), spec.profile_id.to_string()),
            ("bay.runtime_port".to_string(), spec.runtime_port.to_string()),
        ]);
        labels.retain(|_, v| !v.is_empty());

        let mem_limit = parse_memory(spec.memory)?;
        let nano_cpus = (spec.cpus * 1e9) as i64;

        let mut env: Vec<String> = spec.env.iter().map(|(k, v)| format!("{k}={v}")).collect();
        env.push(format!("BAY_SESSION_ID={}", spec.session_id));
        env.push(format!("BAY_SANDBOX_ID={}", spec.sandbox_id));
        env.push(format!("BAY_WORKSPACE_PATH={WORKSPACE_MOUNT_PATH}"));

        let network_mode = match &self.network {
            Some(name) if self.network_exists(name).await => Some(name.clone()),
            Some(name) => {
                tracing::warn!(network = %name, "docker network not found, falling back to default");
                None
            }
            None => None,
        };

        let expose_key = format!("{}/tcp", spec.runtime_port);
        let mut exposed_ports: HashMap<String, HashMap<(), ()>> = HashMap::new();
        exposed_ports.insert(expose_key.clone(), HashMap::new());

        let publish =
            self.publish_ports && matches!(self.connect_mode, ConnectMode::HostPort | ConnectMode::Auto);
        let port_bindings = publish.then(|| {
            HashMap::from([(
                expose_key,
                Some(vec![PortBinding {
                    host_ip: Some("0.0.0.0".to_string()),
                    host_port: self.host_port.filter(|p| *p != 0).map(|p| p.to_string()),
                }]),
            )])
        });

        let host_config = HostConfig {
            binds: Some(vec![format!("{}:{WORKSPACE_MOUNT_PATH}:rw", spec.workspace_driver_ref)]),
            memory: Some(mem_limit),
            nano_cpus: Some(nano_cpus),
            pids_limit: Some(256),
            port_bindings,
            network_mode: network_mode
                .filter(|_| matches!(self.connect_mode, ConnectMode::ContainerNetwork | ConnectMode::Auto)),
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.image.to_string()),
            env: Some(env),
            labels: Some(labels),
            exposed_ports: Some(exposed_ports),
            host_config: Some(host_config),
            ..Default::default()
        };

        let name = format!("bay-session-{}", spec.session_id);
        let result = self
            .client
            .create_container(Some(CreateContainerOptions { name, platform: None }), config)
            .await
            .map_err(|e| DriverError::Engine(e.to_string()))?;

        Ok(result.id)
    }

    async fn start(&self, container_id: &str, runtime_port: u16) -> Result<String, DriverError> {
        self.client
            .start_container::<String>(container_id, None)
            .await
            .map_err(|e| DriverError::Engine(e.to_string()))?;

        let info = self
            .client
            .inspect_container(container_id, None)
            .await
            .map_err(|e| DriverError::Engine(e.to_string()))?;

        if let Some(endpoint) = self.endpoint_from(&info, runtime_port) {
            return Ok(endpoint);
        }

        let name = info.name.as_deref().unwrap_or(container_id).trim_start_matches('/').to_string();
        let endpoint = format!("http://{name}:{runtime_port}");
        tracing::warn!(container_id, endpoint, "docker.endpoint.fallback_name");
        Ok(endpoint)
    }

    async fn stop(&self, container_id: &str) -> Result<(), DriverError> {
        match self
            .client
            .stop_container(container_id, Some(StopContainerOptions { t: 10 }))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(DriverError::Engine(e.to_string())),
        }
    }

    async fn destroy(&self, container_id: &str) -> Result<(), DriverError> {
        match self
            .client
            .remove_container(
                container_id,
                Some(RemoveContainerOptions { force: true, ..Default::default() }),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(DriverError::Engine(e.to_string())),
        }
    }

    async fn status(
        &self,
        container_id: &str,
        runtime_port: Option<u16>,
    ) -> Result<ContainerInfo, DriverError> {
        let info = match self.client.inspect_container(container_id, None).await {
            Ok(info) => info,
            Err(e) if is_not_found(&e) => {
                return Ok(ContainerInfo {
                    container_id: container_id.to_string(),
                    status: ContainerStatus::NotFound,
                    endpoint: None,
                    exit_code: None,
                })
            }
            Err(e) => return Err(DriverError::Engine(e.to_string())),
        };

        let state = info.state.clone().unwrap_or_default();
        let status = match state.status {
            Some(ContainerStateStatusEnum::RUNNING) => ContainerStatus::Running,
            Some(ContainerStateStatusEnum::CREATED) => ContainerStatus::Created,
            Some(ContainerStateStatusEnum::EXITED) | Some(ContainerStateStatusEnum::DEAD) => {
                ContainerStatus::Exited
            }
            Some(ContainerStateStatusEnum::REMOVING) => ContainerStatus::Removing,
            _ => ContainerStatus::Exited,
        };

        let endpoint = match (status, runtime_port) {
            (ContainerStatus::Running, Some(port)) => self.endpoint_from(&info, port),
            _ => None,
        };

        Ok(ContainerInfo {
            container_id: container_id.to_string(),
            status,
            endpoint,
            exit_code: state.exit_code,
        })
    }

    async fn logs(&self, container_id: &str, tail: usize) -> Result<String, DriverError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        };
        let mut stream = self.client.logs(container_id, Some(options));
        let mut out = String::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bollard::container::LogOutput::StdOut { message })
                | Ok(bollard::container::LogOutput::StdErr { message }) => {
                    out.push_str(&String::from_utf8_lossy(&message));
                }
                Ok(_) => {}
                Err(e) if is_not_found(&e) => return Ok(String::new()),
                Err(e) => return Err(DriverError::Engine(e.to_string())),
            }
        }
        Ok(out)
    }

    async fn create_volume(
        &self,
        name: &str,
        mut labels: HashMap<String, String>,
    ) -> Result<String, DriverError> {
        labels.insert("bay.managed".to_string(), "true".to_string());
        let volume = self
            .client
            .create_volume(CreateVolumeOptions::<String> { name: name.to_string(), labels, ..Default::default() })
            .await
            .map_err(|e| DriverError::Engine(e.to_string()))?;
        Ok(volume.name)
    }

    async fn delete_volume(&self, name: &str) -> Result<(), DriverError> {
        match self.client.remove_volume(name, Some(RemoveVolumeOptions { force: true })).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(DriverError::Engine(e.to_string())),
        }
    }

    async fn volume_exists(&self, name: &str) -> Result<bool, DriverError> {
        match self.client.inspect_volume(name).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(DriverError::Engine(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
