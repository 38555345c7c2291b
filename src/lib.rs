pub mod client;
pub mod config;
pub mod error;
pub mod pocketbase;
pub mod state;
pub mod token;

pub mod handlers {
    pub mod auth;
    pub mod lambda;
    pub mod pacientes;
    pub mod reports;
    pub mod sessoes;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod services {
    pub mod pagination;
}

pub mod validation {
    pub mod auth;
}

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;

use crate::state::AppState;

/// Builds the application router with the route guard and cookie layer.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/user", get(handlers::auth::current_user))
        .route(
            "/api/pacientes",
            get(handlers::pacientes::list).post(handlers::pacientes::create),
        )
        .route(
            "/api/pacientes/{id}",
            get(handlers::pacientes::get_by_id)
                .put(handlers::pacientes::update)
                .delete(handlers::pacientes::delete),
        )
        .route(
            "/api/sessoes",
            get(handlers::sessoes::list).post(handlers::sessoes::create),
        )
        .route(
            "/api/sessoes/{id}",
            get(handlers::sessoes::get_by_id)
                .put(handlers::sessoes::update)
                .delete(handlers::sessoes::delete),
        )
        .route("/api/reports", get(handlers::reports::list))
        .route(
            "/api/lambda",
            get(handlers::lambda::get)
                .post(handlers::lambda::post)
                .delete(handlers::lambda::delete),
        )
        .layer(from_fn(middleware_layer::auth::route_guard))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
