//! Cached JSON mirrors of the listing and the detail page.

use super::Scope;
use crate::error::TrainingError;
use axum::Json;
use axum::extract::{Path, State};
use campus_derive::api_handler;
use campus_kernel::prelude::{ApiState, Domain, TRAINING_TAG};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

#[api_handler(
    get,
    path = "/{lang}/training/json/trainings",
    params(("lang" = String, Path, description = "Site language")),
    responses(
        (status = OK, description = "Upcoming trainings with their sessions", body = Object),
        (status = NOT_FOUND, description = "Unknown language"),
    ),
    tag = TRAINING_TAG,
)]
#[instrument(skip(state))]
pub(crate) async fn trainings(
    State(state): State<ApiState>,
    Path(lang): Path<String>,
) -> Result<Json<Arc<Value>>, TrainingError> {
    let scope = Scope::new(&state, &lang)?;
    let key = format!("{lang}:trainings");
    if let Some(cached) = scope.training.cache.get(&key) {
        debug!(%key, "Cache hit");
        return Ok(Json(cached));
    }

    let products = scope.catalog().upcoming(&Domain::new()).await?;
    let body = Arc::new(serde_json::to_value(products)?);
    scope.training.cache.insert(key, body.clone());
    Ok(Json(body))
}

#[api_handler(
    get,
    path = "/{lang}/training/json/{slug}",
    params(
        ("lang" = String, Path, description = "Site language"),
        ("slug" = String, Path, description = "Training slug or product code"),
    ),
    responses(
        (status = OK, description = "Training with expanded sessions", body = Object),
        (status = NOT_FOUND, description = "Unknown training"),
    ),
    tag = TRAINING_TAG,
)]
#[instrument(skip(state))]
pub(crate) async fn detail(
    State(state): State<ApiState>,
    Path((lang, slug)): Path<(String, String)>,
) -> Result<Json<Arc<Value>>, TrainingError> {
    let scope = Scope::new(&state, &lang)?;
    let key = format!("{lang}:detail:{slug}");
    if let Some(cached) = scope.training.cache.get(&key) {
        debug!(%key, "Cache hit");
        return Ok(Json(cached));
    }

    let product = scope
        .catalog()
        .by_slug(&slug)
        .await?
        .ok_or_else(|| TrainingError::not_found("training", slug.clone()))?;
    let body = Arc::new(product.into_value());
    scope.training.cache.insert(key, body.clone());
    Ok(Json(body))
}
