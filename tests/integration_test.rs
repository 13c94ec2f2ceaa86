//! Integration tests for the toolfit HTTP service.
//!
//! These tests verify the API behavior and error handling.
//! Run with: cargo test

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use toolfit::{health_handler, router, AppState, Config, OperatingMode, SchemaDocument};
use tower::ServiceExt;

fn contract() -> Value {
    json!({
        "openapi": "3.0.1",
        "info": { "title": "Workshop", "version": "1.0" },
        "paths": {
            "/workshop/api/mechanic/": {
                "get": {
                    "operationId": "get_mechanics",
                    "summary": "List mechanics",
                    "responses": {
                        "200": {
                            "description": "mechanics",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Mechanics" } } }
                        }
                    }
                }
            },
            "/workshop/api/mechanic/{id}": {
                "get": {
                    "operationId": "get_mechanic",
                    "parameters": [{ "name": "id", "in": "path", "schema": { "type": "integer" } }],
                    "responses": {
                        "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Mechanic" } } } }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Mechanic": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "mentor": { "$ref": "#/components/schemas/Mechanic" }
                    }
                },
                "Mechanics": { "type": "array", "items": { "$ref": "#/components/schemas/Mechanic" } }
            }
        }
    })
}

/// Helper to create a ready state around the test contract.
fn ready_state(config: Config) -> Arc<AppState> {
    let document = SchemaDocument::from_value(contract()).unwrap();
    Arc::new(AppState::from_document(config, document))
}

fn unready_state() -> Arc<AppState> {
    let config = Config {
        openapi_spec_path: "/nonexistent/contract.json".into(),
        mode: OperatingMode::Lenient,
        ..Config::default()
    };
    Arc::new(AppState::new(config).unwrap())
}

/// Helper to make a JSON request to the router.
async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let req = match method {
        "GET" => Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
        "POST" => Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.unwrap_or(json!({})).to_string()))
            .unwrap(),
        _ => panic!("Unsupported method"),
    };

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

// ============================================================================
// Health Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_200() {
    let app = Router::new().route("/health", get(health_handler));
    let (status, body) = json_request(app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_endpoint_returns_200_with_contract() {
    let app = router(ready_state(Config::default()));
    let (status, body) = json_request(app, "GET", "/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["tools"], 2);
    assert_eq!(body["title"], "Workshop");
}

#[tokio::test]
async fn test_ready_endpoint_returns_503_without_contract() {
    let app = router(unready_state());
    let (status, body) = json_request(app, "GET", "/ready", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["tools"], 0);
    assert!(body.get("title").is_none());
}

// ============================================================================
// Truncation Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_truncate_small_payload_unchanged() {
    let app = router(ready_state(Config::default()));
    let content = json!({ "ok": true }).to_string();

    let (status, body) =
        json_request(app, "POST", "/truncate", Some(json!({ "content": content }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "unchanged");
    assert_eq!(body["content"], content);
}

#[tokio::test]
async fn test_truncate_uses_configured_budget() {
    let config = Config {
        max_content_length: 500,
        ..Config::default()
    };
    let app = router(ready_state(config));
    let content = json!({ "vehicle": "car", "report": "r".repeat(3000) }).to_string();

    let (status, body) =
        json_request(app, "POST", "/truncate", Some(json!({ "content": content }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "fields");
    assert_eq!(body["fields_truncated"], 1);
    assert!(body["length"].as_u64().unwrap() <= 500);

    let inner: Value = serde_json::from_str(body["content"].as_str().unwrap()).unwrap();
    assert_eq!(inner["vehicle"], "car");
}

#[tokio::test]
async fn test_truncate_request_budget_overrides_config() {
    let app = router(ready_state(Config::default()));
    let content = "plain text ".repeat(50);

    let (status, body) = json_request(
        app,
        "POST",
        "/truncate",
        Some(json!({ "content": content, "max_length": 40 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "fallback");
    assert_eq!(body["length"], 40);
    assert_eq!(body["original_length"], 550);
    assert!(body["content"].as_str().unwrap().ends_with("[TRUNCATED]"));
}

#[tokio::test]
async fn test_truncate_zero_budget_returns_400() {
    let app = router(ready_state(Config::default()));

    let (status, body) = json_request(
        app,
        "POST",
        "/truncate",
        Some(json!({ "content": "abc", "max_length": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("max_length"));
}

#[tokio::test]
async fn test_truncate_works_without_contract() {
    let app = router(unready_state());

    let (status, body) = json_request(
        app,
        "POST",
        "/truncate",
        Some(json!({ "content": "x".repeat(100), "max_length": 30 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["length"], 30);
}

#[tokio::test]
async fn test_truncate_messages_only_touches_tool_output() {
    let app = router(ready_state(Config::default()));
    let big = json!({ "rows": [{ "dump": "d".repeat(2000) }] }).to_string();

    let (status, body) = json_request(
        app,
        "POST",
        "/messages/truncate",
        Some(json!({
            "max_length": 300,
            "messages": [
                { "role": "user", "content": "u".repeat(1000) },
                { "role": "tool", "content": big, "tool_call_id": "call_1" }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"].as_str().unwrap().len(), 1000);
    assert!(messages[1]["content"].as_str().unwrap().chars().count() <= 300);
    assert_eq!(messages[1]["tool_call_id"], "call_1");
}

// ============================================================================
// Contract and Tool Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_openapi_is_reference_free() {
    let app = router(ready_state(Config::default()));
    let (status, body) = json_request(app, "GET", "/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.to_string().contains("$ref"));

    let list = &body["paths"]["/workshop/api/mechanic/"]["get"]["responses"]["200"];
    assert_eq!(list["description"], "mechanics");
    assert!(list["content"]["application/json"].get("schema").is_none());

    let single = &body["paths"]["/workshop/api/mechanic/{id}"]["get"]["responses"]["200"]
        ["content"]["application/json"]["schema"];
    assert_eq!(single["properties"]["name"]["type"], "string");
    assert_eq!(
        single["properties"]["mentor"]["description"],
        "Circular reference to Mechanic"
    );
}

#[tokio::test]
async fn test_list_tools() {
    let app = router(ready_state(Config::default()));
    let (status, body) = json_request(app, "GET", "/tools", None).await;

    assert_eq!(status, StatusCode::OK);
    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], "get_mechanics");
    assert_eq!(tools[0]["method"], "GET");
    assert!(tools[0].get("outputSchema").is_none());
    assert_eq!(tools[1]["inputSchema"]["required"], json!(["id"]));
}

#[tokio::test]
async fn test_get_tool_by_name_and_404() {
    let state = ready_state(Config::default());

    let (status, body) =
        json_request(router(state.clone()), "GET", "/tools/get_mechanic", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "/workshop/api/mechanic/{id}");
    assert_eq!(body["outputSchema"]["type"], "object");

    let (status, body) = json_request(router(state), "GET", "/tools/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_tools_unavailable_without_contract() {
    let (status, body) = json_request(router(unready_state()), "GET", "/tools", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("OPENAPI_SPEC"));
}

#[tokio::test]
async fn test_state_loads_contract_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", contract()).unwrap();

    let config = Config {
        openapi_spec_path: file.path().to_path_buf(),
        mode: OperatingMode::Strict,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config).unwrap());

    assert!(state.is_ready());
    assert_eq!(state.tools.len(), 2);
}
