//! # Training catalog slice
//!
//! Listing, detail, keyword, date and full-text views of the training catalog,
//! served under `/{lang}/training/` as HTML pages and cached JSON mirrors.

pub mod catalog;
mod error;
mod filter;
mod handlers;
mod render;
pub mod urls;

pub use crate::error::{TrainingError, TrainingErrorExt};

use crate::render::Renderer;
use campus_kernel::domain::registry::InitializedSlice;
use campus_kernel::prelude::{ApiConfig, ApiState, FilterGuard, TemplateGuard, Translator};
use campus_search::SearchIndexes;
use moka::sync::Cache;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Training feature state
#[campus_derive::campus_slice]
#[derive(Debug)]
pub struct Training {
    pub(crate) renderer: Renderer,
    pub(crate) search: SearchIndexes,
    /// JSON responses keyed by `<lang>:<view>`
    pub(crate) cache: Cache<String, Arc<Value>>,
    pub(crate) templates: TemplateGuard,
    pub(crate) filters: FilterGuard,
}

/// Initialize the training feature: templates, per-language search indexes and the JSON cache.
///
/// # Errors
/// Currently infallible; missing search indexes only disable search for their language.
pub fn init(config: &ApiConfig) -> Result<InitializedSlice, TrainingError> {
    let translator = Translator::new(&config.i18n);
    let templates_dir = &config.catalog.templates_dir;
    let search = SearchIndexes::discover(&config.search.index_dir, translator.languages());

    let cache = Cache::builder()
        .max_capacity(config.cache.capacity)
        .time_to_live(Duration::from_secs(config.cache.ttl_seconds.max(1)))
        .build();

    let inner = TrainingInner {
        renderer: Renderer::new(templates_dir, translator),
        search,
        cache,
        templates: TemplateGuard::new(templates_dir.clone()),
        filters: FilterGuard::new(config.catalog.filter_fields.clone()),
    };

    tracing::info!(templates = %templates_dir.display(), "Training server slice initialized");

    Ok(InitializedSlice::new(Training::new(inner)))
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::html::trainings))
        .routes(routes!(handlers::html::all_get, handlers::html::all_post))
        .routes(routes!(handlers::html::by_date))
        .routes(routes!(handlers::html::by_key))
        .routes(routes!(handlers::html::search))
        .routes(routes!(handlers::html::detail))
        .routes(routes!(handlers::json::trainings))
        .routes(routes!(handlers::json::detail))
}
