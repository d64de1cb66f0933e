// src/api_client.rs
use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::model::{NewWorkout, UnitType, Workout, WorkoutId, WorkoutUpdate};

// Paths follow the `/api/workout/...` convention; import/export keep their own names.
pub const LIST_ALL_PATH: &str = "/api/workout/getAll";
pub const SEARCH_PATH: &str = "/api/workout/getByName";
pub const CREATE_PATH: &str = "/api/workout/create";
pub const UPDATE_PATH: &str = "/api/workout/updateByID";
pub const DELETE_PATH: &str = "/api/workout/deleteByID";
pub const CONVERT_UNITS_PATH: &str = "/api/workout/convertUnits";
pub const IMPORT_PATH: &str = "/api/ImportWorkouts";
pub const EXPORT_PATH: &str = "/api/ExportWorkouts";
pub const CONNECT_DATABASE_PATH: &str = "/api/workout/database/connect";
pub const DATABASE_NAME_PATH: &str = "/api/workout/database/name";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-success status. `message` is the backend's own explanation, if it sent one.
    #[error("Server returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("Request to workout server failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response from workout server: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct DatabaseNameBody {
    name: Option<String>,
}

/// The REST surface the view controller talks to.
#[async_trait]
pub trait WorkoutBackend: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Workout>, ApiError>;
    async fn search_by_name(&self, query: &str) -> Result<Vec<Workout>, ApiError>;
    async fn create(&self, workout: &NewWorkout) -> Result<(), ApiError>;
    async fn update(&self, update: &WorkoutUpdate) -> Result<(), ApiError>;
    async fn delete(&self, id: WorkoutId) -> Result<(), ApiError>;
    async fn convert_units(&self, target: UnitType) -> Result<(), ApiError>;
    async fn import_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<(), ApiError>;
    async fn export_csv(&self) -> Result<Vec<u8>, ApiError>;
    async fn connect_database(&self, path: &str) -> Result<(), ApiError>;
    async fn database_name(&self) -> Result<Option<String>, ApiError>;
}

pub struct HttpBackend {
    http_client: Client,
    server_url: String,
}

impl HttpBackend {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    async fn fetch_workouts(&self, request: reqwest::RequestBuilder) -> Result<Vec<Workout>, ApiError> {
        let response = ensure_success(request.send().await?).await?;
        let workouts: Vec<Workout> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("workout list: {e}")))?;
        info!("Received {} workouts", workouts.len());
        Ok(workouts)
    }
}

/// Turns a non-success response into `ApiError::Server`, pulling the message out of
/// a `{"message": ...}` body or, failing that, the raw text.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!("Request failed with status: {}. Body: {}", status, body);
    Err(ApiError::Server {
        status,
        message: extract_error_message(&body),
    })
}

pub fn extract_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.filter(|m| !m.trim().is_empty()),
        Err(_) if body.starts_with('{') => None,
        Err(_) => Some(body.trim_matches('"').to_string()),
    }
}

#[async_trait]
impl WorkoutBackend for HttpBackend {
    async fn list_all(&self) -> Result<Vec<Workout>, ApiError> {
        let url = self.url(LIST_ALL_PATH);
        debug!("GET {}", url);
        self.fetch_workouts(self.http_client.get(&url)).await
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<Workout>, ApiError> {
        if query.trim().is_empty() {
            return self.list_all().await;
        }
        let url = self.url(SEARCH_PATH);
        debug!("GET {} name={:?}", url, query);
        // reqwest percent-encodes query pairs
        self.fetch_workouts(self.http_client.get(&url).query(&[("name", query)]))
            .await
    }

    async fn create(&self, workout: &NewWorkout) -> Result<(), ApiError> {
        let url = self.url(CREATE_PATH);
        info!("POST {} for '{}'", url, workout.name);
        ensure_success(self.http_client.post(&url).json(workout).send().await?).await?;
        Ok(())
    }

    async fn update(&self, update: &WorkoutUpdate) -> Result<(), ApiError> {
        let url = self.url(UPDATE_PATH);
        info!("PUT {} for id {}", url, update.id);
        ensure_success(self.http_client.put(&url).json(update).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, id: WorkoutId) -> Result<(), ApiError> {
        let url = self.url(DELETE_PATH);
        info!("DELETE {} for id {}", url, id.id);
        ensure_success(self.http_client.delete(&url).json(&id).send().await?).await?;
        Ok(())
    }

    async fn convert_units(&self, target: UnitType) -> Result<(), ApiError> {
        let url = self.url(CONVERT_UNITS_PATH);
        info!("PUT {} to {}", url, target);
        ensure_success(self.http_client.put(&url).json(&target).send().await?).await?;
        Ok(())
    }

    async fn import_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<(), ApiError> {
        let url = self.url(IMPORT_PATH);
        info!("POST {} with '{}' ({} bytes)", url, file_name, contents.len());
        let part = multipart::Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("file", part);
        ensure_success(self.http_client.post(&url).multipart(form).send().await?).await?;
        Ok(())
    }

    async fn export_csv(&self) -> Result<Vec<u8>, ApiError> {
        let url = self.url(EXPORT_PATH);
        info!("POST {}", url);
        let response = ensure_success(self.http_client.post(&url).send().await?).await?;
        let bytes = response.bytes().await?;
        debug!("Export payload is {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn connect_database(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(CONNECT_DATABASE_PATH);
        info!("POST {} path={:?}", url, path);
        ensure_success(
            self.http_client
                .post(&url)
                .query(&[("path", path)])
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn database_name(&self) -> Result<Option<String>, ApiError> {
        let url = self.url(DATABASE_NAME_PATH);
        debug!("GET {}", url);
        let response = self.http_client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = ensure_success(response).await?.text().await?;
        let body = body.trim();
        if body.is_empty() || body == "null" {
            return Ok(None);
        }
        let parsed: DatabaseNameBody = serde_json::from_str(body)
            .map_err(|e| ApiError::Decode(format!("database name: {e}")))?;
        Ok(parsed.name.filter(|n| !n.trim().is_empty()))
    }
}
