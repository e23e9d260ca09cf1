//! Direccion route handlers.

use axum::Json;
use tracing::instrument;

use directorio_core::DireccionId;

use super::extract::{PathParam, Payload, QueryParams};
use crate::db::{DireccionRepository, Page};
use crate::error::AppError;
use crate::middleware::{RequestContext, RequireAuth};
use crate::models::{DireccionIn, DireccionOut};
use crate::response::ApiResult;

/// List addresses.
#[instrument(skip_all, fields(offset = page.offset, limit = page.limit))]
pub async fn list(
    QueryParams(page): QueryParams<Page>,
    mut ctx: RequestContext,
) -> ApiResult<Vec<DireccionOut>> {
    let direcciones = DireccionRepository::new(ctx.store())
        .list(page.clamped())
        .await?;

    Ok(Json(direcciones.into_iter().map(DireccionOut::from).collect()))
}

/// Show one address.
#[instrument(skip_all, fields(direccion_id = %id))]
pub async fn show(
    PathParam(id): PathParam<DireccionId>,
    mut ctx: RequestContext,
) -> ApiResult<DireccionOut> {
    let direccion = DireccionRepository::new(ctx.store())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Direccion not found".to_owned()))?;

    Ok(Json(direccion.into()))
}

/// Create an address.
#[instrument(skip_all)]
pub async fn create(
    RequireAuth(mut ctx): RequireAuth,
    Payload(input): Payload<DireccionIn>,
) -> ApiResult<DireccionOut> {
    let new = input.into_new()?;
    let direccion = DireccionRepository::new(ctx.store()).create(&new).await?;

    tracing::info!(direccion_id = %direccion.id, "direccion created");
    Ok(Json(direccion.into()))
}
