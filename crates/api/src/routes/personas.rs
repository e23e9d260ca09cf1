//! Persona route handlers.

use axum::Json;
use tracing::instrument;

use directorio_core::PersonaId;

use super::extract::{PathParam, Payload, QueryParams};
use crate::db::{Page, PersonaRepository};
use crate::error::AppError;
use crate::middleware::{RequestContext, RequireAuth};
use crate::models::{PersonaIn, PersonaOut};
use crate::response::ApiResult;

fn not_found() -> AppError {
    AppError::NotFound("Persona not found".to_owned())
}

/// List personas.
#[instrument(skip_all, fields(offset = page.offset, limit = page.limit))]
pub async fn list(
    QueryParams(page): QueryParams<Page>,
    mut ctx: RequestContext,
) -> ApiResult<Vec<PersonaOut>> {
    let personas = PersonaRepository::new(ctx.store())
        .list(page.clamped())
        .await?;

    Ok(Json(personas.into_iter().map(PersonaOut::from).collect()))
}

/// Show one persona.
#[instrument(skip_all, fields(persona_id = %id))]
pub async fn show(
    PathParam(id): PathParam<PersonaId>,
    mut ctx: RequestContext,
) -> ApiResult<PersonaOut> {
    let persona = PersonaRepository::new(ctx.store())
        .get(id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(persona.into()))
}

/// Create a persona.
#[instrument(skip_all)]
pub async fn create(
    RequireAuth(mut ctx): RequireAuth,
    Payload(input): Payload<PersonaIn>,
) -> ApiResult<PersonaOut> {
    let new = input.into_new()?;
    let persona = PersonaRepository::new(ctx.store()).create(&new).await?;

    tracing::info!(persona_id = %persona.id, "persona created");
    Ok(Json(persona.into()))
}

/// Replace a persona's fields.
#[instrument(skip_all, fields(persona_id = %id))]
pub async fn update(
    RequireAuth(mut ctx): RequireAuth,
    PathParam(id): PathParam<PersonaId>,
    Payload(input): Payload<PersonaIn>,
) -> ApiResult<PersonaOut> {
    let new = input.into_new()?;
    let persona = PersonaRepository::new(ctx.store())
        .update(id, &new)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(persona_id = %persona.id, "persona updated");
    Ok(Json(persona.into()))
}
