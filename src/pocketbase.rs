use axum::http::StatusCode;
use serde::Deserialize;
use sonic_rs::{JsonValueTrait, Value};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// An authentication response from the record service.
#[derive(Debug, Deserialize)]
pub struct AuthData {
    /// The issued bearer token.
    pub token: String,
    /// The authenticated account record.
    pub record: Value,
}

/// One page of records from a collection listing.
#[derive(Debug, Deserialize)]
pub struct RecordList {
    pub page: i64,
    #[serde(rename = "perPage")]
    pub per_page: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    #[serde(rename = "totalItems")]
    pub total_items: i64,
    pub items: Vec<Value>,
}

/// A scoped client for the PocketBase record service.
///
/// One instance is built per incoming request with that request's token, so
/// no auth state is ever shared across requests. The underlying
/// `reqwest::Client` connection pool is the only shared piece.
pub struct Client {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl Client {
    /// Creates a client scoped to one request.
    ///
    /// # Arguments
    ///
    /// * `state` - The application state (transport + config).
    /// * `token` - The caller's token, if any.
    pub fn for_request(state: &AppState, token: Option<String>) -> Self {
        Client {
            base_url: state.config.pocketbase_url.trim_end_matches('/').to_string(),
            http: state.http.clone(),
            token,
        }
    }

    fn collection_url(&self, collection: &str, suffix: &str) -> String {
        format!(
            "{}/api/collections/{}/{}",
            self.base_url, collection, suffix
        )
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        // PocketBase expects the raw token in the Authorization header.
        match &self.token {
            Some(token) => req.header(http::header::AUTHORIZATION, token),
            None => req,
        }
    }

    async fn read<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.text().await?;

        if status.is_success() {
            let body = if body.is_empty() { "{}" } else { body.as_str() };
            return sonic_rs::from_str(body)
                .map_err(|e| AppError::Internal(format!("Invalid backend response: {}", e)));
        }

        // PocketBase errors carry a {code, message, data} envelope.
        let message = sonic_rs::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").as_str().map(str::to_string))
            .unwrap_or_else(|| format!("Backend request failed with status {}", status));

        Err(AppError::Backend { status, message })
    }

    /// Authenticates an account with its password and returns the auth data.
    pub async fn auth_with_password(
        &self,
        collection: &str,
        identity: &str,
        password: &str,
    ) -> Result<AuthData> {
        let url = self.collection_url(collection, "auth-with-password");
        let response = self
            .http
            .post(&url)
            .json(&sonic_rs::json!({
                "identity": identity,
                "password": password,
            }))
            .send()
            .await?;

        let value = Self::read::<Value>(response).await?;
        Self::auth_data(value)
    }

    /// Refreshes the client's token against the backend.
    pub async fn auth_refresh(&self, collection: &str) -> Result<AuthData> {
        let url = self.collection_url(collection, "auth-refresh");
        let response = self.authorize(self.http.post(&url)).send().await?;

        let value = Self::read::<Value>(response).await?;
        Self::auth_data(value)
    }

    fn auth_data(value: Value) -> Result<AuthData> {
        let token = value
            .get("token")
            .as_str()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Internal("Backend returned no token".to_string()))?;
        let record = value
            .get("record")
            .cloned()
            .unwrap_or_else(|| sonic_rs::json!({}));

        Ok(AuthData { token, record })
    }

    /// Requests an email-verification message for an account.
    pub async fn request_verification(&self, collection: &str, email: &str) -> Result<()> {
        let url = self.collection_url(collection, "request-verification");
        let response = self
            .http
            .post(&url)
            .json(&sonic_rs::json!({ "email": email }))
            .send()
            .await?;

        Self::read::<Value>(response).await?;
        Ok(())
    }

    /// Creates a record in a collection.
    pub async fn create(&self, collection: &str, payload: &Value) -> Result<Value> {
        let url = self.collection_url(collection, "records");
        let response = self
            .authorize(self.http.post(&url))
            .json(payload)
            .send()
            .await?;

        Self::read(response).await
    }

    /// Fetches a single record by id.
    pub async fn get_one(&self, collection: &str, id: &str) -> Result<Value> {
        let url = self.collection_url(collection, &format!("records/{}", id));
        let response = self.authorize(self.http.get(&url)).send().await?;

        Self::read(response).await
    }

    /// Updates a record by id.
    pub async fn update(&self, collection: &str, id: &str, payload: &Value) -> Result<Value> {
        let url = self.collection_url(collection, &format!("records/{}", id));
        let response = self
            .authorize(self.http.patch(&url))
            .json(payload)
            .send()
            .await?;

        Self::read(response).await
    }

    /// Deletes a record by id.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.collection_url(collection, &format!("records/{}", id));
        let response = self.authorize(self.http.delete(&url)).send().await?;

        Self::read::<Value>(response).await?;
        Ok(())
    }

    /// Fetches one page of records.
    pub async fn get_list(
        &self,
        collection: &str,
        page: i64,
        per_page: i64,
        sort: &str,
        filter: Option<&str>,
    ) -> Result<RecordList> {
        let url = self.collection_url(collection, "records");
        let mut query: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
            ("sort", sort.to_string()),
        ];
        if let Some(filter) = filter {
            query.push(("filter", filter.to_string()));
        }

        let response = self
            .authorize(self.http.get(&url))
            .query(&query)
            .send()
            .await?;

        Self::read(response).await
    }

    /// Fetches every record of a collection, paging through the backend.
    pub async fn get_full_list(&self, collection: &str, sort: &str) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let list = self.get_list(collection, page, 200, sort, None).await?;
            let total_pages = list.total_pages;
            items.extend(list.items);

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}
