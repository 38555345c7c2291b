#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{json, Value};

use gawiga::config::Config;
use gawiga::state::AppState;
use gawiga::token::decode_jwt;

/// Builds a JWT-shaped token (unsigned, like the ones the backend issues).
pub fn make_token(payload: &Value) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("header.{}.signature", encoded)
}

pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// A live token for the canonical test user.
pub fn live_token() -> String {
    make_token(&json!({"id": "user_abc", "exp": now_secs() + 3600}))
}

/// An expired token for the canonical test user.
pub fn expired_token() -> String {
    make_token(&json!({"id": "user_abc", "exp": 1000}))
}

/// Calls the mock backend observes, for assertions.
#[derive(Clone, Default)]
pub struct Captures {
    pub auth_calls: Arc<Mutex<Vec<Value>>>,
    pub created: Arc<Mutex<Vec<(String, Value)>>>,
    pub list_queries: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
    pub verification_calls: Arc<AtomicUsize>,
    pub fail_verification: Arc<AtomicBool>,
}

async fn auth_with_password(
    State(captures): State<Captures>,
    Path(_collection): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    captures.auth_calls.lock().unwrap().push(body.clone());

    if body["identity"] == "a@b.com" && body["password"] == "x" {
        (
            StatusCode::OK,
            Json(json!({
                "token": live_token(),
                "record": {"id": "user_abc", "email": "a@b.com"},
            })),
        )
            .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": 400, "message": "Failed to authenticate."})),
        )
            .into_response()
    }
}

async fn auth_refresh(Path(_collection): Path<String>, headers: HeaderMap) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    // Only tokens for the known account refresh successfully.
    let decoded = decode_jwt(token);
    let known_account = {
        use sonic_rs::JsonValueTrait;
        decoded.payload.get("id").as_str() == Some("user_abc")
    };

    if decoded.valid && known_account {
        (
            StatusCode::OK,
            Json(json!({
                "token": live_token(),
                "record": {"id": "user_abc", "email": "a@b.com"},
            })),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "code": 401,
                "message": "The request requires valid record authorization token to be set.",
            })),
        )
            .into_response()
    }
}

async fn request_verification(
    State(captures): State<Captures>,
    Path(_collection): Path<String>,
) -> Response {
    captures.verification_calls.fetch_add(1, Ordering::SeqCst);

    if captures.fail_verification.load(Ordering::SeqCst) {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": 400, "message": "Failed to send verification email."})),
        )
            .into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn create_record(
    State(captures): State<Captures>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    captures
        .created
        .lock()
        .unwrap()
        .push((collection, body.clone()));

    let mut record = body;
    record["id"] = json!("rec_1");
    (StatusCode::OK, Json(record)).into_response()
}

async fn list_records(
    State(captures): State<Captures>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    captures
        .list_queries
        .lock()
        .unwrap()
        .push((collection.clone(), params.clone()));

    let page: i64 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: i64 = params
        .get("perPage")
        .and_then(|p| p.parse().ok())
        .unwrap_or(30);

    (
        StatusCode::OK,
        Json(json!({
            "page": page,
            "perPage": per_page,
            "totalPages": 1,
            "totalItems": 1,
            "items": [{"id": "rec_1", "collection": collection}],
        })),
    )
        .into_response()
}

async fn get_record(Path((_collection, id)): Path<(String, String)>) -> Response {
    if id == "missing" {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"code": 404, "message": "The requested resource wasn't found."})),
        )
            .into_response()
    } else {
        (StatusCode::OK, Json(json!({"id": id, "nome": "Maria"}))).into_response()
    }
}

async fn update_record(
    Path((_collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut record = body;
    record["id"] = json!(id);
    (StatusCode::OK, Json(record)).into_response()
}

async fn delete_record(Path((_collection, _id)): Path<(String, String)>) -> StatusCode {
    StatusCode::NO_CONTENT
}

fn mock_backend_router(captures: Captures) -> Router {
    Router::new()
        .route(
            "/api/collections/{collection}/auth-with-password",
            post(auth_with_password),
        )
        .route("/api/collections/{collection}/auth-refresh", post(auth_refresh))
        .route(
            "/api/collections/{collection}/request-verification",
            post(request_verification),
        )
        .route(
            "/api/collections/{collection}/records",
            get(list_records).post(create_record),
        )
        .route(
            "/api/collections/{collection}/records/{id}",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .with_state(captures)
}

/// Serves a router on an ephemeral port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A lambda endpoint stub: GET serves phrases, POST echoes, DELETE acks.
async fn lambda_get() -> Response {
    (StatusCode::OK, Json(json!(["bom dia"]))).into_response()
}

async fn lambda_post(Json(body): Json<Value>) -> Response {
    if body.get("boom").is_some() {
        return (StatusCode::IM_A_TEAPOT, Json(json!({"error": "boom"}))).into_response();
    }
    (StatusCode::OK, Json(json!({"received": body}))).into_response()
}

async fn lambda_delete(Json(body): Json<Value>) -> Response {
    (StatusCode::OK, Json(json!({"deleted": body}))).into_response()
}

fn lambda_router() -> Router {
    Router::new().route(
        "/frases",
        get(lambda_get).post(lambda_post).delete(lambda_delete),
    )
}

/// A fully wired test environment: the app under test plus its mock
/// collaborators.
pub struct TestEnv {
    pub server: axum_test::TestServer,
    pub captures: Captures,
}

/// Spawns the mock backend and lambda stub and builds the app against them.
pub async fn test_env() -> TestEnv {
    let captures = Captures::default();
    let backend_url = spawn(mock_backend_router(captures.clone())).await;
    let lambda_url = format!("{}/frases", spawn(lambda_router()).await);

    let config = Config {
        pocketbase_url: backend_url,
        pocketbase_collection: "users".to_string(),
        lambda_url,
        session_duration_days: 7,
        production: false,
        host: "127.0.0.1".to_string(),
        port: 0,
    };

    let server = axum_test::TestServer::new(gawiga::app(AppState::new(config)))
        .expect("test server should start");

    TestEnv { server, captures }
}
