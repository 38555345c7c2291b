use std::env;

use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The base URL of the PocketBase record service.
    pub pocketbase_url: String,
    /// The PocketBase auth collection used for login/signup.
    pub pocketbase_collection: String,
    /// The fixed external function endpoint the lambda proxy forwards to.
    pub lambda_url: String,
    /// The duration of a session cookie in days.
    pub session_duration_days: i64,
    /// Whether the server runs in production (enables secure cookies).
    pub production: bool,
    /// The address the server binds to.
    pub host: String,
    /// The port the server binds to.
    pub port: u16,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            pocketbase_url: env::var("POCKETBASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string()),
            pocketbase_collection: env::var("POCKETBASE_COLLECTION")
                .unwrap_or_else(|_| "users".to_string()),
            lambda_url: env::var("LAMBDA_URL").context("LAMBDA_URL must be set")?,
            session_duration_days: env::var("SESSION_DURATION_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("Invalid SESSION_DURATION_DAYS")?,
            production: env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Invalid PORT")?,
        })
    }
}
