//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, Backend, middleware::auth_middleware};

pub mod account;
pub mod auth;
pub mod health;
pub mod rates;

/// Creates the API router, with the session middleware on protected routes.
pub fn api_routes<B: Backend>(state: AppState<B>) -> Router<AppState<B>> {
    // Protected routes that require a session
    let protected_routes = Router::new()
        .merge(auth::protected_routes::<B>())
        .merge(account::routes::<B>())
        .merge(rates::routes::<B>())
        .layer(middleware::from_fn_with_state(
            state,
            auth_middleware::<B>,
        ));

    Router::new()
        .merge(health::routes::<B>())
        .merge(auth::public_routes::<B>())
        .merge(protected_routes)
}
