//! Request context and authentication extractors.
//!
//! Every handler that touches storage takes a [`RequestContext`], which owns
//! the request's store handle. [`RequireAuth`] additionally resolves the
//! bearer token to a [`User`] and rejects the request with `401` otherwise.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use crate::db::StoreHandle;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::auth::{AuthError, AuthService, parse_bearer_header};
use crate::state::AppState;

/// Per-request store handle plus the caller, when authenticated.
///
/// The handle is released when the context is dropped at the end of the
/// request.
#[derive(Debug)]
pub struct RequestContext {
    store: StoreHandle,
    user: Option<User>,
}

impl RequestContext {
    /// The store handle for this request.
    pub const fn store(&mut self) -> &mut StoreHandle {
        &mut self.store
    }

    /// The authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth(CredentialsInvalid)` for anonymous requests.
    pub fn require_user(&self) -> Result<&User, AppError> {
        self.user
            .as_ref()
            .ok_or(AppError::Auth(AuthError::CredentialsInvalid))
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let store = state.store().acquire().await?;
        Ok(Self { store, user: None })
    }
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(ctx): RequireAuth) -> ApiResult<UserOut> {
///     Ok(Json(UserOut::from(ctx.require_user()?)))
/// }
/// ```
pub struct RequireAuth(pub RequestContext);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Reject malformed headers before taking a connection.
        let token = parse_bearer_header(parts.headers.get(AUTHORIZATION))?;

        let mut store = state.store().acquire().await?;
        let user = AuthService::new(&mut store)
            .resolve_authenticated_user(state.tokens(), token)
            .await?;

        Span::current().record("user_id", user.id.as_i32());
        set_sentry_user(&user.id, user.username.as_str());

        Ok(Self(RequestContext {
            store,
            user: Some(user),
        }))
    }
}
