use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use sonic_rs::JsonValueMutTrait;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    pocketbase,
    services::pagination,
    state::AppState,
    token,
};

/// The backing collection for patient records.
const COLLECTION: &str = "paciente";
/// The default page size for patient listings.
const DEFAULT_PER_PAGE: i64 = 10;
/// The default sort order (newest first).
const DEFAULT_SORT: &str = "-created";

/// The query parameters for listing patients.
#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

fn require_token(headers: &HeaderMap, cookies: &Cookies) -> Result<String> {
    token::token_from_request(headers, cookies).ok_or(AppError::Unauthorized)
}

/// Lists patients, paginated and filtered by activity status.
#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let token = require_token(&headers, &cookies)?;
    let pg = pagination::parse(
        query.page.as_deref(),
        query.per_page.as_deref(),
        DEFAULT_PER_PAGE,
    );

    let filter = match query.status.as_deref().unwrap_or("ativo") {
        "todos" => None,
        "inativo" => Some("ativo = false"),
        _ => Some("ativo = true"),
    };
    let sort = query.sort.as_deref().unwrap_or(DEFAULT_SORT);

    let pb = pocketbase::Client::for_request(&state, Some(token));
    let list = pb
        .get_list(COLLECTION, pg.page, pg.per_page, sort, filter)
        .await?;

    Ok((
        StatusCode::OK,
        Json(sonic_rs::json!({
            "success": true,
            "page": list.page,
            "perPage": list.per_page,
            "totalPages": list.total_pages,
            "totalItems": list.total_items,
            "items": list.items,
        })),
    )
        .into_response())
}

/// Creates a patient record, stamping the caller as its owner.
#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    body: Bytes,
) -> Result<Response> {
    let token = require_token(&headers, &cookies)?;

    let mut payload: sonic_rs::Value = sonic_rs::from_slice(&body)
        .map_err(|_| AppError::Validation("Invalid JSON payload".to_string()))?;

    if let Some(owner) = token::owner_id(&token) {
        if let Some(obj) = payload.as_object_mut() {
            obj.insert(&"owner", owner.as_str());
        }
    }

    let pb = pocketbase::Client::for_request(&state, Some(token));
    let record = pb.create(COLLECTION, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(sonic_rs::json!({ "success": true, "record": record })),
    )
        .into_response())
}

/// Fetches a single patient by id.
#[axum::debug_handler]
pub async fn get_by_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<String>,
) -> Result<Response> {
    let token = require_token(&headers, &cookies)?;

    let pb = pocketbase::Client::for_request(&state, Some(token));
    let record = pb.get_one(COLLECTION, &id).await?;

    Ok((
        StatusCode::OK,
        Json(sonic_rs::json!({ "success": true, "record": record })),
    )
        .into_response())
}

/// Updates a patient by id.
#[axum::debug_handler]
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response> {
    let token = require_token(&headers, &cookies)?;

    let payload: sonic_rs::Value = sonic_rs::from_slice(&body)
        .map_err(|_| AppError::Validation("Invalid JSON payload".to_string()))?;

    let pb = pocketbase::Client::for_request(&state, Some(token));
    let record = pb.update(COLLECTION, &id, &payload).await?;

    Ok((
        StatusCode::OK,
        Json(sonic_rs::json!({ "success": true, "record": record })),
    )
        .into_response())
}

/// Deletes a patient by id.
#[axum::debug_handler]
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<String>,
) -> Result<Response> {
    let token = require_token(&headers, &cookies)?;

    let pb = pocketbase::Client::for_request(&state, Some(token));
    pb.delete(COLLECTION, &id).await?;

    Ok((
        StatusCode::OK,
        Json(sonic_rs::json!({ "success": true })),
    )
        .into_response())
}
