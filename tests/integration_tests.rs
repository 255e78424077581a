//! Integration tests
//!
//! Drive the full router against the in-memory store

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use linguix_gateway::config::Settings;
use linguix_gateway::handlers::create_router;
use linguix_gateway::store::{DocumentStore, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Settings that never reach the network
fn create_test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.upstream.base_url = "http://127.0.0.1:1".to_string();
    settings.passthrough.enabled = false;
    settings
}

fn create_test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn DocumentStore> = store.clone();
    let app = create_router(create_test_settings(), Some(shared)).expect("Failed to create router");
    (app, store)
}

fn create_app_without_store() -> Router {
    create_router(create_test_settings(), None).expect("Failed to create router")
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).to_string()))
    };
    (status, value)
}

fn quiz_body(user_id: &str) -> Value {
    json!({
        "userId": user_id,
        "language": "ar",
        "score": 8,
        "total": 10,
        "date": "2025-05-20"
    })
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _store) = create_test_app();
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "linguix-gateway");
    assert_eq!(body["details"]["store"], "connected");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_check_reports_missing_store() {
    let app = create_app_without_store();
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["details"]["store"], "not_configured");
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let (app, _store) = create_test_app();
    let (status, body) = send(&app, get("/health/live")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
    assert!(body["details"]["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_chat_without_authorization_is_rejected() {
    let (app, _store) = create_test_app();
    let request = json_request(
        Method::POST,
        "/api/grok3",
        json!({"messages": [{"role": "user", "content": "Hello"}]}),
    );

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Authorization"));
}

#[tokio::test]
async fn test_save_quiz_progress_and_read_back() {
    let (app, store) = create_test_app();

    let (status, body) = send(&app, json_request(Method::POST, "/api/saveQuizProgress", quiz_body("u1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Progress saved");
    assert_eq!(body["id"].as_str().unwrap().len(), 24);
    assert_eq!(store.count("quiz_progress").await, 1);

    send(&app, json_request(Method::POST, "/api/saveQuizProgress", quiz_body("u2"))).await;

    let (status, body) = send(&app, get("/api/getQuizProgress/u1")).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["userId"], "u1");
    assert_eq!(records[0]["score"], 8.0);
    assert!(records[0]["id"].is_string());
}

#[tokio::test]
async fn test_save_quiz_progress_missing_field() {
    let (app, store) = create_test_app();
    let mut body = quiz_body("u1");
    body.as_object_mut().unwrap().remove("total");

    let (status, response) = send(&app, json_request(Method::POST, "/api/saveQuizProgress", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("total"));
    assert_eq!(store.count("quiz_progress").await, 0);
}

#[tokio::test]
async fn test_quiz_progress_for_unknown_user_is_empty() {
    let (app, _store) = create_test_app();
    let (status, body) = send(&app, get("/api/getQuizProgress/nobody")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_progress_created_and_listed_newest_first() {
    let (app, _store) = create_test_app();

    for attempt in 1..=2 {
        let body = json!({"userId": "u1", "language": "ur", "quizData": {"attempt": attempt}});
        let (status, response) = send(&app, json_request(Method::POST, "/api/progress", body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(response["id"].is_string());
        // Timestamps are stored with millisecond precision
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let (status, body) = send(&app, get("/api/progress/u1/ur")).await;
    assert_eq!(status, StatusCode::OK);

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["quizData"]["attempt"], 2);
    assert_eq!(records[1]["quizData"]["attempt"], 1);
}

#[tokio::test]
async fn test_progress_lookup_without_records_is_not_found() {
    let (app, _store) = create_test_app();
    let (status, body) = send(&app, get("/api/progress/u1/fr")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_progress_missing_quiz_data() {
    let (app, store) = create_test_app();
    let body = json!({"userId": "u1", "language": "ur"});

    let (status, response) = send(&app, json_request(Method::POST, "/api/progress", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("quizData"));
    assert_eq!(store.count("progress").await, 0);
}

#[tokio::test]
async fn test_sample_assignments_inserted_once() {
    let (app, _store) = create_test_app();

    let (status, body) = send(&app, json_request(Method::POST, "/api/insertSampleAssignments", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 2);

    let (status, body) = send(&app, json_request(Method::POST, "/api/insertSampleAssignments", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 0);

    let (_, body) = send(&app, get("/api/getAssignments")).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|assignment| assignment["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Practice Greetings in Arabic", "Urdu Vocabulary Quiz"]);
}

#[tokio::test]
async fn test_save_assignment_then_list() {
    let (app, _store) = create_test_app();
    let body = json!({"title": "T", "description": "D", "dueDate": "2025-01-01"});

    let (status, response) = send(&app, json_request(Method::POST, "/api/saveAssignment", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["message"], "Assignment saved");

    let (status, body) = send(&app, get("/api/getAssignments")).await;
    assert_eq!(status, StatusCode::OK);
    let assignments = body.as_array().unwrap();
    assert!(assignments.iter().any(|assignment| assignment["title"] == "T"));
    assert!(assignments[0]["dueDate"].as_str().unwrap().starts_with("2025-01-01T00:00:00"));
}

#[tokio::test]
async fn test_save_assignment_invalid_due_date() {
    let (app, store) = create_test_app();
    let body = json!({"title": "T", "description": "D", "dueDate": "soon"});

    let (status, response) = send(&app, json_request(Method::POST, "/api/saveAssignment", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("dueDate"));
    assert_eq!(store.count("assignments").await, 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _store) = create_test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/saveAssignment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_persistence_routes_fail_without_store() {
    let app = create_app_without_store();

    let requests = vec![
        json_request(Method::POST, "/api/saveQuizProgress", quiz_body("u1")),
        get("/api/getQuizProgress/u1"),
        get("/api/getAssignments"),
        json_request(Method::POST, "/api/insertSampleAssignments", json!({})),
        json_request(
            Method::POST,
            "/api/saveAssignment",
            json!({"title": "T", "description": "D", "dueDate": "2025-01-01"}),
        ),
        json_request(Method::POST, "/api/progress", json!({"userId": "u", "language": "l", "quizData": {}})),
        get("/api/progress/u/l"),
    ];

    for request in requests {
        let uri = request.uri().to_string();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert!(body["error"].as_str().unwrap().contains("Document store unavailable"), "{}", uri);
    }
}

#[tokio::test]
async fn test_placeholder_routes_not_implemented() {
    let (app, _store) = create_test_app();

    for path in ["/api/ai-suggestion", "/api/daily-words", "/api/exercises", "/api/dialogues"] {
        let (status, body) = send(&app, get(path)).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "{}", path);
        assert_eq!(body, json!({"error": "Not implemented"}));
    }
}

#[tokio::test]
async fn test_placeholder_routes_answer_any_method_with_json() {
    let (app, _store) = create_test_app();

    let (status, body) = send(&app, json_request(Method::POST, "/api/dialogues", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body, json!({"error": "Not implemented"}));
}

#[tokio::test]
async fn test_lookups_with_missing_path_parameters_are_bad_requests() {
    let (app, _store) = create_test_app();

    for (path, expected) in [
        ("/api/getQuizProgress", "Missing userId"),
        ("/api/getQuizProgress/", "Missing userId"),
        ("/api/progress/", "Missing userId"),
        ("/api/progress/u1", "Missing language"),
        ("/api/progress/u1/", "Missing language"),
    ] {
        let (status, body) = send(&app, get(path)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body["error"], expected, "{}", path);
    }

    let (status, _) = send(&app, get("/api/progress//ur")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assignments_listed_alongside_older_string_dates() {
    let (app, store) = create_test_app();
    store
        .insert_one(
            "assignments",
            bson::doc! { "title": "Old", "description": "D", "dueDate": "2025-01-01" },
        )
        .await
        .unwrap();

    let (status, body) = send(&app, get("/api/getAssignments")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Old");
    assert_eq!(body[0]["dueDate"], "2025-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_options_preflight_short_circuits() {
    let (app, _store) = create_test_app();

    for path in ["/api/grok3", "/api/saveAssignment", "/api/anything/else", "/health"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(path)
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", path);

        let headers = response.headers().clone();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET, POST, PUT, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type, Authorization");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn test_cors_headers_on_every_response() {
    let (app, _store) = create_test_app();

    for request in [get("/health"), get("/api/progress/u1/none"), get("/unknown"), get("/api/dialogues")] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["access-control-allow-methods"], "GET, POST, PUT, OPTIONS");
    }
}

#[tokio::test]
async fn test_unknown_routes_not_found_when_passthrough_disabled() {
    let (app, _store) = create_test_app();

    let (status, body) = send(&app, get("/api/v1/models")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("/api/v1/models"));

    let (status, _) = send(&app, get("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_size_limit() {
    let mut settings = create_test_settings();
    settings.server.max_request_size = 64;
    let app = create_router(settings, Some(Arc::new(MemoryStore::new()))).unwrap();

    let body = json!({"title": "x".repeat(200), "description": "D", "dueDate": "2025-01-01"}).to_string();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/saveAssignment")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
