use crate::config::Config;

/// The application's state.
///
/// Deliberately small: a `Config` plus one shared `reqwest::Client` acting as
/// a connection pool. Per-user auth state never lives here — a scoped
/// `pocketbase::Client` carrying the caller's token is built fresh for every
/// request, so concurrent requests cannot observe each other's credentials.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// The shared HTTP transport used for all upstream calls.
    pub http: reqwest::Client,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::new();
        tracing::info!("✅ HTTP transport initialized (shared connection pool)");

        AppState { config, http }
    }
}
