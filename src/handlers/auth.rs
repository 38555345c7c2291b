use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sonic_rs::{JsonValueMutTrait, JsonValueTrait, Value};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::{
    config::Config,
    error::{AppError, Result},
    pocketbase,
    state::AppState,
    token::{decode_jwt, token_from_request, SESSION_COOKIE},
    validation::auth::*,
};

/// Creates the HTTP-only session cookie carrying the backend-issued token.
fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);

    cookie.set_http_only(true);
    if config.production {
        cookie.set_secure(true);
    }
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::seconds(config.session_duration_days * 86400));
    cookie.set_path("/");

    cookie
}

/// Removes the session cookie using the same attribute set it was created
/// with, so browsers actually drop it.
fn clear_session_cookie(cookies: &Cookies, config: &Config) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");

    cookie.set_http_only(true);
    if config.production {
        cookie.set_secure(true);
    }
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_path("/");

    cookies.remove(cookie);
}

fn parse_json_body(body: &Bytes) -> Result<Value> {
    sonic_rs::from_slice(body)
        .map_err(|_| AppError::Validation("Invalid JSON payload".to_string()))
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    body: Bytes,
) -> Result<Response> {
    let payload = parse_json_body(&body)?;

    let email = normalize_email(payload.get("email").as_str().unwrap_or(""));
    let password = payload.get("password").as_str().unwrap_or("").to_string();
    validate_credentials(&email, &password)?;

    let pb = pocketbase::Client::for_request(&state, None);
    let auth = pb
        .auth_with_password(&state.config.pocketbase_collection, &email, &password)
        .await
        .map_err(|e| {
            // Generic message only: never echo backend detail for login.
            tracing::warn!("Login rejected for {}: {}", email, e);
            AppError::Authentication("Invalid credentials".to_string())
        })?;

    cookies.add(session_cookie(&state.config, auth.token.clone()));
    tracing::info!("✅ User logged in: {}", email);

    Ok((
        StatusCode::OK,
        Json(sonic_rs::json!({
            "success": true,
            "token": auth.token,
            "record": auth.record,
        })),
    )
        .into_response())
}

/// Handles account creation.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    body: Bytes,
) -> Result<Response> {
    let payload = parse_json_body(&body)?;

    let email = payload.get("email").as_str().unwrap_or("").to_string();
    let password = payload.get("password").as_str().unwrap_or("").to_string();
    let password_confirm = payload
        .get("passwordConfirm")
        .as_str()
        .unwrap_or("")
        .to_string();
    validate_signup(&email, &password, &password_confirm)?;

    let mut create_data = sonic_rs::json!({
        "email": email,
        "password": password,
        "passwordConfirm": password_confirm,
    });
    if let Some(obj) = create_data.as_object_mut() {
        if let Some(name) = payload.get("name").as_str().filter(|n| !n.is_empty()) {
            obj.insert(&"name", name);
        }
        if let Some(visibility) = payload.get("emailVisibility").as_bool() {
            obj.insert(&"emailVisibility", visibility);
        }
    }

    let collection = state.config.pocketbase_collection.clone();
    let pb = pocketbase::Client::for_request(&state, None);
    let record = pb
        .create(&collection, &create_data)
        .await
        .map_err(as_creation_failure)?;

    // Best-effort email verification; a failure here must not block signup.
    if let Err(e) = pb.request_verification(&collection, &email).await {
        tracing::warn!("⚠️ Verification request failed (non-fatal): {}", e);
    }

    let auth = pb
        .auth_with_password(&collection, &email, &password)
        .await
        .map_err(as_creation_failure)?;

    cookies.add(session_cookie(&state.config, auth.token.clone()));
    tracing::info!("✅ Account created: {}", email);

    Ok((
        StatusCode::CREATED,
        Json(sonic_rs::json!({
            "success": true,
            "token": auth.token,
            "record": record,
        })),
    )
        .into_response())
}

/// Maps a backend failure during signup to a 400 with the backend's message.
fn as_creation_failure(e: AppError) -> AppError {
    match e {
        AppError::Backend { message, .. } => AppError::Validation(message),
        other => other,
    }
}

/// Handles user logout.
///
/// Idempotent: clearing an absent cookie is still a success.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    clear_session_cookie(&cookies, &state.config);

    Ok((
        StatusCode::OK,
        Json(sonic_rs::json!({
            "success": true,
            "message": "Logged out successfully",
        })),
    )
        .into_response())
}

/// Refreshes the session token against the backend.
#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Result<Response> {
    let Some(token) = token_from_request(&headers, &cookies) else {
        return Err(AppError::Authentication("No token found".to_string()));
    };

    // Cheap local check first: a structurally broken or expired token will
    // never refresh, so drop the cookie without a backend round-trip.
    if !decode_jwt(&token).valid {
        clear_session_cookie(&cookies, &state.config);
        return Err(AppError::Authentication("Token refresh failed".to_string()));
    }

    let pb = pocketbase::Client::for_request(&state, Some(token));
    match pb.auth_refresh(&state.config.pocketbase_collection).await {
        Ok(auth) => {
            cookies.add(session_cookie(&state.config, auth.token.clone()));
            Ok((
                StatusCode::OK,
                Json(sonic_rs::json!({
                    "success": true,
                    "token": auth.token,
                })),
            )
                .into_response())
        }
        Err(e) => {
            tracing::warn!("❌ Token refresh failed: {}", e);
            clear_session_cookie(&cookies, &state.config);
            Err(AppError::Authentication("Token refresh failed".to_string()))
        }
    }
}

fn unauthorized_user() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(sonic_rs::json!({
            "success": false,
            "user": null,
            "error": "Unauthorized",
        })),
    )
        .into_response()
}

/// Returns the current user derived from the session token.
///
/// Lean variant: decodes the token locally instead of round-tripping to the
/// backend, trading freshness for latency. The token was issued by the
/// backend and round-trips through an HTTP-only cookie; expiry is still
/// checked here.
#[axum::debug_handler]
pub async fn current_user(headers: HeaderMap, cookies: Cookies) -> Response {
    let Some(token) = token_from_request(&headers, &cookies) else {
        return unauthorized_user();
    };

    let decoded = decode_jwt(&token);
    if !decoded.valid {
        return unauthorized_user();
    }

    (
        StatusCode::OK,
        Json(sonic_rs::json!({
            "success": true,
            "token": token,
            "user": decoded.payload,
        })),
    )
        .into_response()
}
