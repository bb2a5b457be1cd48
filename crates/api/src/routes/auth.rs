//! Authentication routes for registration, login and logout.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use somon_shared::auth::{AccountSummary, LoginRequest, LoginResponse, RegisterRequest};
use tracing::info;

use crate::{ApiError, AppState, Backend, middleware::AuthUser};

/// Routes reachable without a session.
pub fn public_routes<B: Backend>() -> Router<AppState<B>> {
    Router::new()
        .route("/auth/register", post(register::<B>))
        .route("/auth/login", post(login::<B>))
}

/// Routes that need the session middleware applied.
pub fn protected_routes<B: Backend>() -> Router<AppState<B>> {
    Router::new().route("/auth/logout", post(logout::<B>))
}

fn session_cookie(name: &str, value: String) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .build()
}

/// POST /auth/register - Open an account with the starting grant.
async fn register<B: Backend>(
    State(state): State<AppState<B>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountSummary>), ApiError> {
    let account = state
        .auth
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    info!(account_id = %account.id, "account registered");
    Ok((StatusCode::CREATED, Json(account.summary())))
}

/// POST /auth/login - Issue a session token.
///
/// The token is returned in the body and set as an HttpOnly cookie.
async fn login<B: Backend>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let outcome = state.auth.login(&payload.email, &payload.password).await?;

    let token = outcome.token.as_str().to_owned();
    let jar = jar.add(session_cookie(&state.cookie_name, token.clone()));

    Ok((
        jar,
        Json(LoginResponse {
            account: outcome.account.summary(),
            token,
            expires_at: outcome.expires_at,
        }),
    ))
}

/// POST /auth/logout - Revoke the current session and clear the cookie.
async fn logout<B: Backend>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
    user: AuthUser,
) -> Result<(CookieJar, StatusCode), ApiError> {
    state.auth.logout(user.token().as_str()).await?;

    let jar = jar.remove(session_cookie(&state.cookie_name, String::new()));
    Ok((jar, StatusCode::NO_CONTENT))
}
