use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    pocketbase::{self, RecordList},
    services::pagination,
    state::AppState,
    token,
};

/// The default page size for report listings.
const DEFAULT_PER_PAGE: i64 = 20;
/// The default sort order (newest first).
const DEFAULT_SORT: &str = "-created";

/// The query parameters for report listings.
#[derive(Deserialize)]
pub struct ReportQuery {
    pub collection: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
    pub sort: Option<String>,
}

fn list_body(list: &RecordList) -> sonic_rs::Value {
    sonic_rs::json!({
        "page": list.page,
        "perPage": list.per_page,
        "totalPages": list.total_pages,
        "totalItems": list.total_items,
        "items": list.items,
    })
}

/// Lists report records.
///
/// With a `collection` parameter this returns one paginated collection;
/// without it, the first page of both report collections is returned for
/// callers predating the parameter.
#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Query(query): Query<ReportQuery>,
) -> Result<Response> {
    let token = token::token_from_request(&headers, &cookies).ok_or(AppError::Unauthorized)?;
    let pg = pagination::parse(
        query.page.as_deref(),
        query.per_page.as_deref(),
        DEFAULT_PER_PAGE,
    );
    let sort = query.sort.as_deref().unwrap_or(DEFAULT_SORT);

    let pb = pocketbase::Client::for_request(&state, Some(token));

    if let Some(collection) = query.collection.as_deref().filter(|c| !c.is_empty()) {
        let list = pb
            .get_list(collection, pg.page, pg.per_page, sort, None)
            .await?;

        return Ok((
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
            .into_response());
    }

    let fatur = pb
        .get_list("faturamento_mensal", 1, pg.per_page, sort, None)
        .await?;
    let receber = pb
        .get_list("valores_receber", 1, pg.per_page, sort, None)
        .await?;

    Ok((
        StatusCode::OK,
        Json(sonic_rs::json!({
            "success": true,
            "fatur": list_body(&fatur),
            "receber": list_body(&receber),
        })),
    )
        .into_response())
}
