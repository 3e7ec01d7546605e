//! HTTP client for the BuildPro API.
//!
//! One method per endpoint. Every call resolves to the server's response
//! envelope; transport and decode failures are folded into an envelope with
//! `success: false` so callers handle a single shape.

use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use url::Url;

use crate::api::Pagination;
use crate::database::models::{
    CreateCustomer, CreateFile, CreateProject, CreateTask, CustomerView, FileView, ProjectView, TaskView,
    UpdateCustomer, UpdateFile, UpdateProject, UpdateTask,
};
use crate::handlers::upload::UploadedFile;
use crate::types::{TaskPriority, TaskStatus};

/// The `{success, data?, error?, message?, pagination?}` envelope. Extra
/// top-level fields (`deletedCount`, seed groups, ...) land in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> ApiEnvelope<T> {
    pub fn failure(message: impl Into<String>, fallback: &str) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: None,
            error: Some(if message.is_empty() { fallback.to_string() } else { message }),
            message: None,
            pagination: None,
            extra: Map::new(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Query string for the list endpoints. Unset values are left out.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pairs: Vec<(String, String)>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any named filter (`status`, `projectId`, `customer`, ...).
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    pub fn search(self, term: &str) -> Self {
        self.param("search", term)
    }

    pub fn sort(self, sort_by: &str, sort_order: &str) -> Self {
        self.param("sortBy", sort_by).param("sortOrder", sort_order)
    }

    pub fn page(self, page: u64) -> Self {
        self.param("page", page)
    }

    pub fn limit(self, limit: u64) -> Self {
        self.param("limit", limit)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Body of `POST /api/seed`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedOptions {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub clear: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub seed_type: Option<String>,
}

#[derive(Clone)]
pub struct BuildProClient {
    client: reqwest::Client,
    base: Url,
}

impl BuildProClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base.join(path.trim_start_matches('/'))
    }

    async fn exchange<T: DeserializeOwned>(request: RequestBuilder) -> Result<ApiEnvelope<T>, reqwest::Error> {
        request.send().await?.json::<ApiEnvelope<T>>().await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        build: impl FnOnce(&reqwest::Client, Url) -> RequestBuilder,
        path: &str,
        fallback: &str,
    ) -> ApiEnvelope<T> {
        let url = match self.url(path) {
            Ok(url) => url,
            Err(e) => return ApiEnvelope::failure(e.to_string(), fallback),
        };
        match Self::exchange(build(&self.client, url)).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!("{} {}: {}", fallback, path, e);
                ApiEnvelope::failure(e.to_string(), fallback)
            }
        }
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, params: &ListParams, fallback: &str) -> ApiEnvelope<T> {
        self.send(|c, url| c.get(url).query(params.pairs()), path, fallback).await
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> ApiEnvelope<T> {
        self.send(|c, url| c.get(url), path, fallback).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ApiEnvelope<T> {
        self.send(|c, url| c.post(url).json(body), path, fallback).await
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ApiEnvelope<T> {
        self.send(|c, url| c.put(url).json(body), path, fallback).await
    }

    async fn remove<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> ApiEnvelope<T> {
        self.send(|c, url| c.delete(url), path, fallback).await
    }

    // Customers

    pub async fn get_customers(&self, params: &ListParams) -> ApiEnvelope<Vec<CustomerView>> {
        self.list("api/customers", params, "Failed to fetch customers").await
    }

    pub async fn get_customer(&self, id: &str) -> ApiEnvelope<CustomerView> {
        self.fetch(&format!("api/customers/{}", id), "Failed to fetch customer").await
    }

    pub async fn create_customer(&self, input: &CreateCustomer) -> ApiEnvelope<CustomerView> {
        self.post_json("api/customers", input, "Failed to create customer").await
    }

    pub async fn update_customer(&self, id: &str, input: &UpdateCustomer) -> ApiEnvelope<CustomerView> {
        self.put_json(&format!("api/customers/{}", id), input, "Failed to update customer")
            .await
    }

    pub async fn delete_customer(&self, id: &str) -> ApiEnvelope<CustomerView> {
        self.remove(&format!("api/customers/{}", id), "Failed to delete customer").await
    }

    // Projects

    pub async fn get_projects(&self, params: &ListParams) -> ApiEnvelope<Vec<ProjectView>> {
        self.list("api/projects", params, "Failed to fetch projects").await
    }

    pub async fn get_project(&self, id: &str) -> ApiEnvelope<ProjectView> {
        self.fetch(&format!("api/projects/{}", id), "Failed to fetch project").await
    }

    pub async fn create_project(&self, input: &CreateProject) -> ApiEnvelope<ProjectView> {
        self.post_json("api/projects", input, "Failed to create project").await
    }

    pub async fn update_project(&self, id: &str, input: &UpdateProject) -> ApiEnvelope<ProjectView> {
        self.put_json(&format!("api/projects/{}", id), input, "Failed to update project")
            .await
    }

    pub async fn delete_project(&self, id: &str) -> ApiEnvelope<ProjectView> {
        self.remove(&format!("api/projects/{}", id), "Failed to delete project").await
    }

    // Tasks

    pub async fn get_tasks(&self, params: &ListParams) -> ApiEnvelope<Vec<TaskView>> {
        self.list("api/tasks", params, "Failed to fetch tasks").await
    }

    pub async fn get_task(&self, id: &str) -> ApiEnvelope<TaskView> {
        self.fetch(&format!("api/tasks/{}", id), "Failed to fetch task").await
    }

    pub async fn create_task(&self, input: &CreateTask) -> ApiEnvelope<TaskView> {
        self.post_json("api/tasks", input, "Failed to create task").await
    }

    pub async fn update_task(&self, id: &str, input: &UpdateTask) -> ApiEnvelope<TaskView> {
        self.put_json(&format!("api/tasks/{}", id), input, "Failed to update task").await
    }

    pub async fn delete_task(&self, id: &str) -> ApiEnvelope<TaskView> {
        self.remove(&format!("api/tasks/{}", id), "Failed to delete task").await
    }

    pub async fn bulk_delete_tasks(&self, task_ids: &[String]) -> ApiEnvelope<Value> {
        let body = json!({ "operation": "delete", "taskIds": task_ids });
        self.post_json("api/tasks/bulk", &body, "Failed to delete tasks").await
    }

    pub async fn bulk_update_task_status(&self, task_ids: &[String], status: TaskStatus) -> ApiEnvelope<Value> {
        let body = json!({
            "operation": "updateStatus",
            "taskIds": task_ids,
            "updateData": { "status": status },
        });
        self.post_json("api/tasks/bulk", &body, "Failed to update task status").await
    }

    pub async fn bulk_update_task_priority(&self, task_ids: &[String], priority: TaskPriority) -> ApiEnvelope<Value> {
        let body = json!({
            "operation": "updatePriority",
            "taskIds": task_ids,
            "updateData": { "priority": priority },
        });
        self.post_json("api/tasks/bulk", &body, "Failed to update task priority").await
    }

    // Files

    pub async fn get_files(&self, params: &ListParams) -> ApiEnvelope<Vec<FileView>> {
        self.list("api/files", params, "Failed to fetch files").await
    }

    pub async fn get_file(&self, id: &str) -> ApiEnvelope<FileView> {
        self.fetch(&format!("api/files/{}", id), "Failed to fetch file").await
    }

    pub async fn create_file(&self, input: &CreateFile) -> ApiEnvelope<FileView> {
        self.post_json("api/files", input, "Failed to create file").await
    }

    pub async fn update_file(&self, id: &str, input: &UpdateFile) -> ApiEnvelope<FileView> {
        self.put_json(&format!("api/files/{}", id), input, "Failed to update file").await
    }

    pub async fn delete_file(&self, id: &str) -> ApiEnvelope<FileView> {
        self.remove(&format!("api/files/{}", id), "Failed to delete file").await
    }

    // Uploads

    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>, content_type: &str) -> ApiEnvelope<UploadedFile> {
        self.upload(file_name, bytes, content_type, "image", "Failed to upload image")
            .await
    }

    pub async fn upload_file(&self, file_name: &str, bytes: Vec<u8>, content_type: &str) -> ApiEnvelope<UploadedFile> {
        self.upload(file_name, bytes, content_type, "file", "Failed to upload file")
            .await
    }

    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
        file_type: &str,
        fallback: &str,
    ) -> ApiEnvelope<UploadedFile> {
        let part = match Part::bytes(bytes).file_name(file_name.to_string()).mime_str(content_type) {
            Ok(part) => part,
            Err(e) => return ApiEnvelope::failure(e.to_string(), fallback),
        };
        let form = Form::new().part("file", part).text("fileType", file_type.to_string());
        self.send(|c, url| c.post(url).multipart(form), "api/upload", fallback)
            .await
    }

    // Seed

    pub async fn seed(&self, options: &SeedOptions) -> ApiEnvelope<Value> {
        self.post_json("api/seed", options, "Failed to seed database").await
    }

    pub async fn seed_status(&self) -> ApiEnvelope<Value> {
        self.fetch("api/seed", "Failed to check seed status").await
    }

    // Service

    pub async fn health(&self) -> ApiEnvelope<Value> {
        self.fetch("health", "Failed to reach server").await
    }
}
