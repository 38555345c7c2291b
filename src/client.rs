use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use reqwest::Method;
use sonic_rs::{JsonValueTrait, Value};
use tokio::sync::{Mutex, RwLock};

use crate::error::{AppError, Result};

/// A request lifecycle callback (e.g. toggling a progress indicator).
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle hooks invoked around every outgoing request. `on_end` always
/// runs, whether the request succeeded or not.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_start: Option<Hook>,
    pub on_end: Option<Hook>,
}

struct HookGuard(Option<Hook>);

impl Drop for HookGuard {
    fn drop(&mut self) {
        if let Some(hook) = &self.0 {
            hook();
        }
    }
}

/// A client for the practice-management API.
///
/// Wraps outgoing requests with bearer-token injection and, on a 401,
/// exactly one token refresh followed by one retry of the original call.
///
/// The refresh is single-flight: a tokio mutex plus a generation counter
/// ensure that concurrent 401s share one refresh attempt instead of issuing
/// N parallel ones. A caller that loses the race observes the bumped
/// generation and reuses the fresh token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    refresh_gate: Arc<Mutex<()>>,
    token_generation: Arc<AtomicU64>,
    hooks: Hooks,
}

impl ApiClient {
    /// Creates a client for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
            refresh_gate: Arc::new(Mutex::new(())),
            token_generation: Arc::new(AtomicU64::new(0)),
            hooks: Hooks::default(),
        }
    }

    /// Installs lifecycle hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replaces the stored bearer token.
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
        self.token_generation.fetch_add(1, Ordering::Release);
    }

    /// Returns the stored bearer token, if any.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Performs a GET request.
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    /// Performs a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Performs a PUT request with a JSON body.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Performs a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let response = self.send(method.clone(), path, body).await?;
        if response.status() != reqwest::StatusCode::UNAUTHORIZED {
            return Self::parse(response).await;
        }

        // One refresh, one retry. The retried call is final: a second 401
        // propagates instead of looping.
        self.refresh_token().await?;
        let response = self.send(method, path, body).await?;
        Self::parse(response).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        if let Some(hook) = &self.hooks.on_start {
            hook();
        }
        let _end = HookGuard(self.hooks.on_end.clone());

        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(http::header::CONTENT_TYPE, "application/json");

        if let Some(token) = self.token.read().await.as_deref() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        Ok(req.send().await?)
    }

    async fn parse(response: reqwest::Response) -> Result<Value> {
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.text().await?;

        if !status.is_success() {
            let message = sonic_rs::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").as_str().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(AppError::Backend { status, message });
        }

        if body.is_empty() {
            return Ok(sonic_rs::json!({}));
        }
        sonic_rs::from_str(&body)
            .map_err(|e| AppError::Internal(format!("Invalid API response: {}", e)))
    }

    async fn refresh_token(&self) -> Result<()> {
        let seen = self.token_generation.load(Ordering::Acquire);
        let _gate = self.refresh_gate.lock().await;

        // Someone else refreshed while we waited for the gate; reuse theirs.
        if self.token_generation.load(Ordering::Acquire) != seen {
            return Ok(());
        }

        let response = self.send(Method::POST, "/api/auth/refresh", None).await?;
        let value = Self::parse(response).await?;
        let token = value
            .get("token")
            .as_str()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Internal("Refresh returned no token".to_string()))?;

        *self.token.write().await = Some(token);
        self.token_generation.fetch_add(1, Ordering::Release);
        Ok(())
    }
}
