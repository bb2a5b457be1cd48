//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use somon_core::auth::SessionToken;
use somon_shared::types::AccountId;

use crate::{ApiError, AppState, Backend};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that resolves session tokens.
///
/// The token is taken from `Authorization: Bearer` first, then from the
/// session cookie. A resolved session is stored in the request extensions
/// as an [`AuthUser`].
pub async fn auth_middleware<B: Backend>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_bearer_token(request.headers())
        .map(str::to_owned)
        .or_else(|| jar.get(&state.cookie_name).map(|c| c.value().to_owned()));

    let Some(token) = token else {
        return ApiError::unauthorized("A bearer token or session cookie is required")
            .into_response();
    };

    match state.auth.resolve(&token).await {
        Ok(account_id) => {
            request.extensions_mut().insert(AuthUser {
                account_id,
                token: SessionToken::from_raw(token),
            });
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// The account behind an authenticated request.
///
/// ```ignore
/// async fn handler(user: AuthUser) -> impl IntoResponse {
///     let account_id = user.account_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    account_id: AccountId,
    token: SessionToken,
}

impl AuthUser {
    /// Returns the authenticated account's ID.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Returns the token the request was authenticated with.
    #[must_use]
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
