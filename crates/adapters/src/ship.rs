// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the Ship runtime container.
//!
//! Pure transport: every Ship endpoint lives under a fixed namespace
//! (`/fs/*`, `/ipython/exec`, `/shell/exec`, `/meta`, `/health`); this client
//! has no retry policy and no opinion about sandbox/session state.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::RuntimeError;
use crate::runtime::{DirEntry, ExecOutcome, RuntimeClient, RuntimeMeta};

pub struct ShipClient {
    base_url: String,
    http: reqwest::Client,
    default_timeout: Duration,
}

impl ShipClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, default_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            default_timeout,
        }
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
        timeout: Duration,
    ) -> Result<Value, RuntimeError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url).timeout(timeout);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                RuntimeError::Timeout
            } else {
                RuntimeError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::Response { status: status.as_u16(), body });
        }

        response.json::<Value>().await.map_err(|e| RuntimeError::Decode(e.to_string()))
    }

    async fn get(&self, path: &str) -> Result<Value, RuntimeError> {
        self.request(reqwest::Method::GET, path, None, self.default_timeout).await
    }

    async fn post(&self, path: &str, body: Value, timeout: Duration) -> Result<Value, RuntimeError> {
        self.request(reqwest::Method::POST, path, Some(body), timeout).await
    }
}

#[derive(Deserialize)]
struct MetaResponse {
    #[serde(default)]
    runtime: RuntimeSection,
    #[serde(default)]
    workspace: WorkspaceSection,
    #[serde(default)]
    capabilities: HashMap<String, bool>,
}

#[derive(Deserialize, Default)]
struct RuntimeSection {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_unknown")]
    version: String,
    #[serde(default = "default_api_version")]
    api_version: String,
}

#[derive(Deserialize, Default)]
struct WorkspaceSection {
    #[serde(default = "default_mount_path")]
    mount_path: String,
}

fn default_name() -> String {
    "ship".to_string()
}
fn default_unknown() -> String {
    "unknown".to_string()
}
fn default_api_version() -> String {
    "v1".to_string()
}
fn default_mount_path() -> String {
    "/workspace".to_string()
}

#[async_trait]
impl RuntimeClient for ShipClient {
    async fn get_meta(&self) -> Result<RuntimeMeta, RuntimeError> {
        let raw = self.get("/meta").await?;
        let parsed: MetaResponse =
            serde_json::from_value(raw).map_err(|e| RuntimeError::Decode(e.to_string()))?;
        Ok(RuntimeMeta {
            name: parsed.runtime.name,
            version: parsed.runtime.version,
            api_version: parsed.runtime.api_version,
            mount_path: parsed.workspace.mount_path,
            capabilities: parsed.capabilities,
        })
    }

    async fn health(&self) -> Result<(), RuntimeError> {
        self.get("/health").await?;
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<String, RuntimeError> {
        let result = self.post("/fs/read_file", json!({ "path": path }), self.default_timeout).await?;
        Ok(result.get("content").and_then(Value::as_str).unwrap_or_default().to_string())
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), RuntimeError> {
        self.post(
            "/fs/write_file",
            json!({ "path": path, "content": content, "mode": "w" }),
            self.default_timeout,
        )
        .await?;
        Ok(())
    }

    async fn list_files(&self, path: &str) -> Result<Vec<DirEntry>, RuntimeError> {
        let result = self
            .post("/fs/list_dir", json!({ "path": path, "show_hidden": false }), self.default_timeout)
            .await?;
        let files = result.get("files").and_then(Value::as_array).cloned().unwrap_or_default();
        Ok(files
            .into_iter()
            .filter_map(|f| {
                Some(DirEntry {
                    name: f.get("name")?.as_str()?.to_string(),
                    path: f.get("path")?.as_str()?.to_string(),
                    is_dir: f.get("is_dir").and_then(Value::as_bool).unwrap_or(false),
                    size: f.get("size").and_then(Value::as_u64).unwrap_or(0),
                })
            })
            .collect())
    }

    async fn delete_file(&self, path: &str) -> Result<(), RuntimeError> {
        self.post("/fs/delete_file", json!({ "path": path }), self.default_timeout).await?;
        Ok(())
    }

    async fn upload_file(&self, path: &str, bytes: Vec<u8>) -> Result<u64, RuntimeError> {
        let size = bytes.len() as u64;
        let file_name = path.rsplit('/').next().unwrap_or(path).to_string();
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().text("file_path", path.to_string()).part("file", part);

        let url = format!("{}/fs/upload", self.base_url);
        let response = self
            .http
            .post(&url)
            .timeout(self.default_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { RuntimeError::Timeout } else { RuntimeError::Transport(e.to_string()) })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::Response { status: status.as_u16(), body });
        }
        let body: Value = response.json().await.map_err(|e| RuntimeError::Decode(e.to_string()))?;
        Ok(body.get("size").and_then(Value::as_u64).unwrap_or(size))
    }

    async fn download_file(&self, path: &str) -> Result<Vec<u8>, RuntimeError> {
        let url = format!("{}/fs/download", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("file_path", path)])
            .timeout(self.default_timeout)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { RuntimeError::Timeout } else { RuntimeError::Transport(e.to_string()) })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::Response { status: status.as_u16(), body });
        }
        response.bytes().await.map(|b| b.to_vec()).map_err(|e| RuntimeError::Decode(e.to_string()))
    }

    async fn exec_shell(
        &self,
        command: &str,
        timeout_secs: u64,
        cwd: Option<&str>,
    ) -> Result<ExecOutcome, RuntimeError> {
        let mut payload = json!({ "command": command, "timeout": timeout_secs });
        if let Some(cwd) = cwd {
            payload["cwd"] = json!(cwd);
        }
        let result = self
            .post("/shell/exec", payload, Duration::from_secs(timeout_secs + 5))
            .await?;

        let exit_code = result.get("exit_code").and_then(Value::as_i64).map(|c| c as i32);
        Ok(ExecOutcome {
            success: exit_code == Some(0),
            output: result.get("output").and_then(Value::as_str).unwrap_or_default().to_string(),
            error: result.get("error").and_then(Value::as_str).map(str::to_string),
            exit_code,
        })
    }

    async fn exec_python(&self, code: &str, timeout_secs: u64) -> Result<ExecOutcome, RuntimeError> {
        let result = self
            .post(
                "/ipython/exec",
                json!({ "code": code, "timeout": timeout_secs, "silent": false }),
                Duration::from_secs(timeout_secs + 5),
            )
            .await?;

        let output_text = result
            .get("output")
            .and_then(Value::as_object)
            .and_then(|o| o.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(ExecOutcome {
            success: result.get("success").and_then(Value::as_bool).unwrap_or(false),
            output: output_text,
            error: result.get("error").and_then(Value::as_str).map(str::to_string),
            exit_code: None,
        })
    }
}

#[cfg(test)]
#[path = "ship_tests.rs"]
mod tests;
