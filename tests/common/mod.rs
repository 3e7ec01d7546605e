#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;

use buildpro_api::config::{AppConfig, DatabaseBackend};
use buildpro_api::database::models::indexes;
use buildpro_api::database::MemoryStore;
use buildpro_api::routes::app;
use buildpro_api::state::AppState;

/// A server bound to a free port, backed by a fresh in-memory store and a
/// temporary uploads directory. Dropped with the test.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
    pub uploads: TempDir,
}

pub fn test_config(uploads: &Path) -> AppConfig {
    let mut config = AppConfig::development();
    config.database.backend = DatabaseBackend::Memory;
    config.api.enable_seed = true;
    config.api.enable_request_logging = false;
    config.uploads.dir = uploads.to_path_buf();
    config
}

/// Application state over an empty memory store.
pub fn memory_state(config: AppConfig) -> AppState {
    AppState::new(Arc::new(MemoryStore::new(indexes())), config)
}

pub async fn spawn_server() -> Result<TestServer> {
    let uploads = tempfile::tempdir().context("failed to create uploads dir")?;
    spawn_with(test_config(uploads.path()), uploads).await
}

pub async fn spawn_with(config: AppConfig, uploads: TempDir) -> Result<TestServer> {
    spawn_state(memory_state(config), uploads).await
}

/// Serve an already-built state, for tests that swap in their own store.
pub async fn spawn_state(state: AppState, uploads: TempDir) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let router = app(state.clone());
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test server")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        port,
        base_url,
        client: reqwest::Client::new(),
        state,
        uploads,
    })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(res: reqwest::Response) -> Result<(StatusCode, Value)> {
        let status = res.status();
        let body = res.json::<Value>().await.context("response was not JSON")?;
        Ok((status, body))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        Self::read(self.client.get(self.url(path)).send().await?).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        Self::read(self.client.post(self.url(path)).json(body).send().await?).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        Self::read(self.client.put(self.url(path)).json(body).send().await?).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        Self::read(self.client.delete(self.url(path)).send().await?).await
    }

    /// POST a body and return the new record's id.
    pub async fn create(&self, path: &str, body: &Value) -> Result<String> {
        let (status, body) = self.post_json(path, body).await?;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("created record has no id")
    }
}

pub fn error_of(body: &Value) -> &str {
    body.get("error").and_then(Value::as_str).unwrap_or("")
}

/// A well-formed object id that no record uses.
pub const MISSING_ID: &str = "65a1b2c3d4e5f60718293a4b";
