use anyhow::Result;
use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use workout_logger_lib::{
    extract_error_message, ApiError, HttpBackend, NewWorkout, UnitType, WorkoutBackend, WorkoutId,
    WorkoutUpdate,
};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl Recorded {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    replies: Arc<Mutex<HashMap<String, (StatusCode, String)>>>,
}

impl StubState {
    fn reply(&self, path: &str, status: StatusCode, body: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.requests().pop().expect("no request reached the stub")
    }
}

async fn record(State(state): State<StubState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path = parts.uri.path().to_string();
    state.requests.lock().unwrap().push(Recorded {
        method: parts.method.to_string(),
        path: path.clone(),
        query: parts.uri.query().map(str::to_string),
        content_type: parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    });
    let reply = state.replies.lock().unwrap().get(&path).cloned();
    match reply {
        Some((status, body)) => (status, body).into_response(),
        None => (StatusCode::OK, String::new()).into_response(),
    }
}

async fn spawn_stub_server() -> Result<(HttpBackend, StubState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = StubState::default();
    let app = Router::new().fallback(record).with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    // Trailing slash is trimmed so paths join cleanly
    let backend = HttpBackend::new(&format!("http://{addr}/"), Duration::from_secs(5))?;
    Ok((backend, state))
}

fn new_workout() -> NewWorkout {
    NewWorkout {
        name: "Morning Run".to_string(),
        start_date_time: NaiveDate::from_ymd_opt(2025, 10, 21)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap(),
        duration: 45,
        distance: 5.0,
        unit: UnitType::Kilometers,
        notes: "Felt good".to_string(),
    }
}

const LISTING: &str = r#"[{"id":1,"name":"Morning Run","startDateTime":"2025-10-21T07:30","duration":45,"distance":5.0,"unit":"KILOMETERS","notes":"Felt good"}]"#;

#[tokio::test]
async fn test_list_all_decodes_workouts() -> Result<()> {
    let (backend, stub) = spawn_stub_server().await?;
    stub.reply("/api/workout/getAll", StatusCode::OK, LISTING);

    let workouts = backend.list_all().await?;
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].name, "Morning Run");
    assert_eq!(workouts[0].unit, UnitType::Kilometers);

    let request = stub.last();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/api/workout/getAll");
    Ok(())
}

#[tokio::test]
async fn test_search_encodes_name_and_empty_query_lists_all() -> Result<()> {
    let (backend, stub) = spawn_stub_server().await?;
    stub.reply("/api/workout/getByName", StatusCode::OK, LISTING);
    stub.reply("/api/workout/getAll", StatusCode::OK, "[]");

    backend.search_by_name("run").await?;
    let request = stub.last();
    assert_eq!(request.path, "/api/workout/getByName");
    assert_eq!(request.query.as_deref(), Some("name=run"));

    backend.search_by_name("hill repeats").await?;
    let query = stub.last().query.unwrap_or_default();
    assert!(query == "name=hill+repeats" || query == "name=hill%20repeats", "{query}");

    assert!(backend.search_by_name("   ").await?.is_empty());
    assert_eq!(stub.last().path, "/api/workout/getAll");
    Ok(())
}

#[tokio::test]
async fn test_create_update_delete_bodies() -> Result<()> {
    let (backend, stub) = spawn_stub_server().await?;

    backend.create(&new_workout()).await?;
    let request = stub.last();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("POST", "/api/workout/create"));
    assert_eq!(
        request.json(),
        json!({
            "name": "Morning Run",
            "startDateTime": "2025-10-21T07:30",
            "duration": 45,
            "distance": 5.0,
            "unit": "KILOMETERS",
            "notes": "Felt good"
        })
    );

    backend
        .update(&WorkoutUpdate {
            id: 4,
            fields: new_workout(),
        })
        .await?;
    let request = stub.last();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("PUT", "/api/workout/updateByID"));
    assert_eq!(request.json()["id"], json!(4));
    assert_eq!(request.json()["name"], json!("Morning Run"));

    backend.delete(WorkoutId { id: 4 }).await?;
    let request = stub.last();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("DELETE", "/api/workout/deleteByID"));
    assert_eq!(request.json(), json!({ "id": 4 }));
    Ok(())
}

#[tokio::test]
async fn test_convert_sends_bare_unit_string() -> Result<()> {
    let (backend, stub) = spawn_stub_server().await?;
    backend.convert_units(UnitType::Miles).await?;

    let request = stub.last();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, "/api/workout/convertUnits");
    assert_eq!(request.json(), json!("MILES"));
    Ok(())
}

#[tokio::test]
async fn test_import_uploads_multipart_file() -> Result<()> {
    let (backend, stub) = spawn_stub_server().await?;
    let csv = b"name,startDateTime\nRun,2025-10-21T07:30\n".to_vec();
    backend.import_csv("runs.csv", csv).await?;

    let request = stub.last();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/ImportWorkouts");
    let content_type = request.content_type.unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"), "{content_type}");
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"runs.csv\""));
    assert!(body.contains("Run,2025-10-21T07:30"));
    Ok(())
}

#[tokio::test]
async fn test_export_returns_raw_bytes() -> Result<()> {
    let (backend, stub) = spawn_stub_server().await?;
    stub.reply("/api/ExportWorkouts", StatusCode::OK, "id,name\n1,Run\n");

    let bytes = backend.export_csv().await?;
    assert_eq!(bytes, b"id,name\n1,Run\n");
    assert_eq!(stub.last().method, "POST");
    Ok(())
}

#[tokio::test]
async fn test_database_connect_and_name() -> Result<()> {
    let (backend, stub) = spawn_stub_server().await?;

    backend.connect_database("/data/workouts.db").await?;
    let request = stub.last();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/workout/database/connect");
    assert_eq!(request.query.as_deref(), Some("path=%2Fdata%2Fworkouts.db"));

    stub.reply("/api/workout/database/name", StatusCode::OK, r#"{"name":"workouts.db"}"#);
    assert_eq!(backend.database_name().await?.as_deref(), Some("workouts.db"));

    stub.reply("/api/workout/database/name", StatusCode::OK, "");
    assert_eq!(backend.database_name().await?, None);

    stub.reply("/api/workout/database/name", StatusCode::OK, r#"{"name":null}"#);
    assert_eq!(backend.database_name().await?, None);

    stub.reply("/api/workout/database/name", StatusCode::NOT_FOUND, "");
    assert_eq!(backend.database_name().await?, None);
    Ok(())
}

#[tokio::test]
async fn test_server_errors_carry_backend_message() -> Result<()> {
    let (backend, stub) = spawn_stub_server().await?;
    stub.reply(
        "/api/workout/deleteByID",
        StatusCode::NOT_FOUND,
        r#"{"error":"Not Found","message":"Workout with ID 99 not found."}"#,
    );
    match backend.delete(WorkoutId { id: 99 }).await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message.as_deref(), Some("Workout with ID 99 not found."));
        }
        other => panic!("expected server error, got {other:?}"),
    }

    stub.reply("/api/workout/create", StatusCode::BAD_REQUEST, "Name is required");
    let err = backend.create(&new_workout()).await.unwrap_err();
    assert_eq!(err.server_message(), Some("Name is required"));

    stub.reply("/api/workout/getAll", StatusCode::OK, "not json");
    assert!(matches!(backend.list_all().await, Err(ApiError::Decode(_))));

    assert_eq!(stub.requests().len(), 3);
    Ok(())
}

#[test]
fn test_extract_error_message_fallbacks() {
    assert_eq!(
        extract_error_message(r#"{"message":"Bad unit"}"#).as_deref(),
        Some("Bad unit")
    );
    assert_eq!(extract_error_message(r#"{"error":"Internal"}"#), None);
    assert_eq!(extract_error_message(r#"{"message":"  "}"#), None);
    assert_eq!(extract_error_message("{broken"), None);
    assert_eq!(extract_error_message("  plain text  ").as_deref(), Some("plain text"));
    assert_eq!(extract_error_message(""), None);
}
