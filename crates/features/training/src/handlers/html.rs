//! HTML catalog pages.

use super::{DetailParams, ListParams, Scope};
use crate::error::TrainingError;
use crate::{filter, urls};
use axum::extract::{Form, Path, Query, State};
use axum::Json;
use axum::response::{Html, IntoResponse, Response};
use campus_derive::api_handler;
use campus_erp::Clause;
use campus_kernel::prelude::{ApiState, Breadcrumb, DATE_FORMAT, Domain, Operator, Session, TRAINING_TAG};
use chrono::NaiveDate;
use serde_json::json;
use tracing::instrument;

#[api_handler(
    get,
    path = "/{lang}/training/",
    params(("lang" = String, Path, description = "Site language")),
    responses(
        (status = OK, description = "Upcoming training sessions", content_type = "text/html", body = String),
        (status = NOT_FOUND, description = "Unknown language or website"),
    ),
    tag = TRAINING_TAG,
)]
#[instrument(skip(state, session))]
pub(crate) async fn trainings(
    State(state): State<ApiState>,
    Path(lang): Path<String>,
    session: Session,
) -> Result<Html<String>, TrainingError> {
    let scope = Scope::new(&state, &lang)?;
    let website = scope.website().await?;
    let products = scope.catalog().upcoming(&filter::saved(&session)).await?;

    let breadcrumbs = vec![scope.crumb(urls::trainings(&lang), "Training")];
    let page = scope.training.renderer.render(
        "trainings",
        &lang,
        json!({ "breadcrumbs": breadcrumbs, "website": website, "products": products }),
    )?;
    Ok(Html(page))
}

#[api_handler(
    get,
    path = "/{lang}/training/all/",
    params(("lang" = String, Path, description = "Site language"), ListParams),
    responses(
        (status = OK, description = "Paginated training listing", content_type = "text/html", body = String),
        (status = NOT_FOUND, description = "Unknown language"),
    ),
    tag = TRAINING_TAG,
)]
#[instrument(skip(state, session))]
pub(crate) async fn all_get(
    State(state): State<ApiState>,
    Path(lang): Path<String>,
    Query(params): Query<ListParams>,
    session: Session,
) -> Result<Html<String>, TrainingError> {
    let scope = Scope::new(&state, &lang)?;
    all_page(&scope, &params, filter::saved(&session)).await
}

/// Saves the posted filter, then lists like `GET`.
#[api_handler(
    post,
    path = "/{lang}/training/all/",
    params(("lang" = String, Path, description = "Site language"), ListParams),
    request_body(content = String, content_type = "application/x-www-form-urlencoded", description = "Filter fields"),
    responses(
        (status = OK, description = "Filtered training listing", content_type = "text/html", body = String),
        (status = NOT_FOUND, description = "Unknown language"),
    ),
    tag = TRAINING_TAG,
)]
#[instrument(skip(state, session, form))]
pub(crate) async fn all_post(
    State(state): State<ApiState>,
    Path(lang): Path<String>,
    Query(params): Query<ListParams>,
    session: Session,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Html<String>, TrainingError> {
    let scope = Scope::new(&state, &lang)?;
    let domain_filter = filter::replace(&session, &scope.training.filters, &form)?;
    all_page(&scope, &params, domain_filter).await
}

async fn all_page(scope: &Scope<'_>, params: &ListParams, domain_filter: Domain) -> Result<Html<String>, TrainingError> {
    let catalog = scope.catalog();
    let mut domain = catalog.base_domain();
    domain.extend(domain_filter.clone());
    if let Some(q) = params.query() {
        domain.push(Clause::new("name", Operator::ILike, format!("%{q}%")));
    }

    let page = params.page();
    let (total, products) = catalog.page(domain, scope.offset(page), scope.state.config.catalog.limit).await?;

    let breadcrumbs =
        vec![scope.crumb(urls::trainings(scope.lang), "Training"), scope.crumb(urls::all(scope.lang), "All")];
    let html = scope.training.renderer.render(
        "trainings-all",
        scope.lang,
        json!({
            "breadcrumbs": breadcrumbs,
            "pagination": scope.pagination(page, total),
            "products": products,
            "domain_filter": domain_filter,
            "q": params.query(),
        }),
    )?;
    Ok(Html(html))
}

#[api_handler(
    get,
    path = "/{lang}/training/all/{date}",
    params(
        ("lang" = String, Path, description = "Site language"),
        ("date" = String, Path, description = "Session start date, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Sessions starting on the date", content_type = "text/html", body = String),
        (status = NOT_FOUND, description = "Malformed date or no sessions"),
    ),
    tag = TRAINING_TAG,
)]
#[instrument(skip(state))]
pub(crate) async fn by_date(
    State(state): State<ApiState>,
    Path((lang, date)): Path<(String, String)>,
) -> Result<Html<String>, TrainingError> {
    let scope = Scope::new(&state, &lang)?;
    let day = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|_| TrainingError::not_found("date", date.clone()))?;

    let products = scope.catalog().on_date(day).await?;
    if products.is_empty() {
        return Err(TrainingError::not_found("sessions on", date));
    }

    let breadcrumbs = vec![
        scope.crumb(urls::trainings(&lang), "Training"),
        scope.crumb(urls::all(&lang), "All"),
        Breadcrumb::new(urls::date(&lang, &date), date.clone()),
    ];
    let html = scope.training.renderer.render(
        "trainings-date",
        &lang,
        json!({ "breadcrumbs": breadcrumbs, "products": products, "date": date }),
    )?;
    Ok(Html(html))
}

#[api_handler(
    get,
    path = "/{lang}/training/key/{key}",
    params(
        ("lang" = String, Path, description = "Site language"),
        ("key" = String, Path, description = "Meta keyword"),
        ListParams,
    ),
    responses(
        (status = OK, description = "Trainings tagged with the keyword", content_type = "text/html", body = String),
        (status = NOT_FOUND, description = "No training on this page"),
    ),
    tag = TRAINING_TAG,
)]
#[instrument(skip(state))]
pub(crate) async fn by_key(
    State(state): State<ApiState>,
    Path((lang, key)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, TrainingError> {
    let scope = Scope::new(&state, &lang)?;
    let catalog = scope.catalog();
    let domain = catalog.base_domain().with("esale_metakeyword", Operator::ILike, format!("%{key}%"));

    let page = params.page();
    let (total, products) = catalog.page(domain, scope.offset(page), state.config.catalog.limit).await?;
    if products.is_empty() {
        return Err(TrainingError::not_found("keyword", key));
    }

    let breadcrumbs = vec![
        scope.crumb(urls::trainings(&lang), "Training"),
        Breadcrumb::new(urls::key(&lang, &key), key.clone()),
    ];
    let html = scope.training.renderer.render(
        "trainings-key",
        &lang,
        json!({
            "breadcrumbs": breadcrumbs,
            "pagination": scope.pagination(page, total),
            "products": products,
            "key": key,
        }),
    )?;
    Ok(Html(html))
}

#[api_handler(
    get,
    path = "/{lang}/training/search/",
    params(("lang" = String, Path, description = "Site language"), ListParams),
    responses(
        (status = OK, description = "Full-text search results", content_type = "text/html", body = String),
        (status = NOT_FOUND, description = "No index for the language"),
    ),
    tag = TRAINING_TAG,
)]
#[instrument(skip(state))]
pub(crate) async fn search(
    State(state): State<ApiState>,
    Path(lang): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, TrainingError> {
    let scope = Scope::new(&state, &lang)?;
    let index = scope.training.search.get(&lang).ok_or_else(|| TrainingError::not_found("search index", lang.clone()))?;

    let page = params.page();
    let q = params.query().unwrap_or_default();
    let found = index.search(q, page, state.config.catalog.limit)?;
    let ids: Vec<i64> = found.hits.iter().filter_map(|hit| i64::try_from(hit.id).ok()).collect();
    let products = scope.catalog().by_ids(&ids).await?;

    let breadcrumbs =
        vec![scope.crumb(urls::trainings(&lang), "Training"), scope.crumb(urls::search(&lang), "Search")];
    let html = scope.training.renderer.render(
        "trainings-search",
        &lang,
        json!({
            "breadcrumbs": breadcrumbs,
            "pagination": scope.pagination(page, found.total),
            "products": products,
            "q": q,
        }),
    )?;
    Ok(Html(html))
}

#[api_handler(
    get,
    path = "/{lang}/training/{slug}",
    params(
        ("lang" = String, Path, description = "Site language"),
        ("slug" = String, Path, description = "Training slug or product code"),
        DetailParams,
    ),
    responses(
        (status = OK, description = "Training detail as HTML, or JSON with render=json", content_type = "text/html", body = String),
        (status = NOT_FOUND, description = "Unknown website or training"),
    ),
    tag = TRAINING_TAG,
)]
#[instrument(skip(state))]
pub(crate) async fn detail(
    State(state): State<ApiState>,
    Path((lang, slug)): Path<(String, String)>,
    Query(params): Query<DetailParams>,
) -> Result<Response, TrainingError> {
    let scope = Scope::new(&state, &lang)?;
    let template = scope.training.templates.resolve(params.template.as_deref(), "training");

    let website = scope.website().await?;
    let product = scope.catalog().by_slug(&slug).await?.ok_or_else(|| TrainingError::not_found("training", slug.clone()))?;

    if params.render.as_deref() == Some("json") {
        return Ok(Json(product).into_response());
    }

    let name = product.str("name").unwrap_or(&slug).to_owned();
    let product_slug = product.str("esale_slug").unwrap_or(&slug).to_owned();
    let breadcrumbs = vec![
        scope.crumb(urls::trainings(&lang), "Training"),
        scope.crumb(urls::all(&lang), "All"),
        Breadcrumb::new(urls::training(&lang, &product_slug), name),
    ];
    let html = scope.training.renderer.render(
        template,
        &lang,
        json!({ "breadcrumbs": breadcrumbs, "website": website, "product": product }),
    )?;
    Ok(Html(html).into_response())
}
