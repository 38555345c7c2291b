use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{error::Result, state::AppState};

/// Forwards a phrase fetch to the external function endpoint.
///
/// Pure pass-through: the proxy attaches no auth and does not inspect the
/// payload.
#[axum::debug_handler]
pub async fn get(State(state): State<AppState>) -> Result<Response> {
    let response = state.http.get(&state.config.lambda_url).send().await?;
    let body = response.text().await?;

    Ok((StatusCode::OK, [(http::header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Forwards a phrase submission to the external function endpoint.
#[axum::debug_handler]
pub async fn post(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    forward(&state, reqwest::Method::POST, body).await
}

/// Forwards a phrase deletion to the external function endpoint.
#[axum::debug_handler]
pub async fn delete(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    forward(&state, reqwest::Method::DELETE, body).await
}

async fn forward(state: &AppState, method: reqwest::Method, body: Bytes) -> Result<Response> {
    let response = state
        .http
        .request(method, &state.config.lambda_url)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?;

    let status = if response.status().is_success() {
        StatusCode::OK
    } else {
        StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    };
    let body = response.text().await?;

    Ok((status, [(http::header::CONTENT_TYPE, "application/json")], body).into_response())
}
