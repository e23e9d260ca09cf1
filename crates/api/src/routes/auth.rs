//! Login and current-user handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use super::extract::FormPayload;
use crate::middleware::{RequestContext, RequireAuth};
use crate::models::UserOut;
use crate::response::ApiResult;
use crate::services::auth::{AccessToken, AuthService};
use crate::state::AppState;

/// OAuth2 password-flow login form.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Exchange a username and password for an access token.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    FormPayload(form): FormPayload<LoginForm>,
) -> ApiResult<AccessToken> {
    let token = AuthService::new(ctx.store())
        .login(state.tokens(), &form.username, &form.password)
        .await?;

    Ok(Json(token))
}

/// The authenticated caller.
#[instrument(skip_all)]
pub async fn me(RequireAuth(ctx): RequireAuth) -> ApiResult<UserOut> {
    Ok(Json(ctx.require_user()?.into()))
}
