use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use axum::middleware::from_fn_with_state;
use campus_domain::config::ApiConfig;
use campus_domain::pagination::DISPLAY_MSG;
use async_trait::async_trait;
use campus_erp::{Erp, ErpBackend, ErpContext, ErpError, MemoryBackend, Query, Record};
use campus_kernel::server::session::session_middleware;
use campus_kernel::server::state::ApiState;
use campus_kernel::server::system_router;
use campus_search::SearchIndex;
use campus_training::catalog::{Catalog, search_document};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../../fixtures/catalog.json");
const TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Memory backend that counts every ORM call.
#[derive(Debug)]
struct Counting {
    inner: MemoryBackend,
    calls: Arc<AtomicUsize>,
}

impl Counting {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ErpBackend for Counting {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    async fn search(&self, model: &str, query: &Query, ctx: &ErpContext) -> Result<Vec<i64>, ErpError> {
        self.hit();
        self.inner.search(model, query, ctx).await
    }

    async fn search_count(&self, model: &str, query: &Query, ctx: &ErpContext) -> Result<u64, ErpError> {
        self.hit();
        self.inner.search_count(model, query, ctx).await
    }

    async fn read(
        &self,
        model: &str,
        ids: &[i64],
        fields: &[String],
        ctx: &ErpContext,
    ) -> Result<Vec<Record>, ErpError> {
        self.hit();
        self.inner.read(model, ids, fields, ctx).await
    }

    async fn search_read(
        &self,
        model: &str,
        query: &Query,
        fields: &[String],
        ctx: &ErpContext,
    ) -> Result<Vec<Record>, ErpError> {
        self.hit();
        self.inner.search_read(model, query, fields, ctx).await
    }

    async fn today(&self, ctx: &ErpContext) -> Result<NaiveDate, ErpError> {
        self.hit();
        self.inner.today(ctx).await
    }
}

struct TestApp {
    router: Router,
    calls: Arc<AtomicUsize>,
    _index: TempDir,
}

async fn app() -> TestApp {
    app_with(|_| {}).await
}

async fn app_with(tweak: impl FnOnce(&mut ApiConfig)) -> TestApp {
    let index = tempfile::tempdir().unwrap();

    let mut config = ApiConfig::default();
    config.catalog.limit = 2;
    config.catalog.templates_dir = PathBuf::from(TEMPLATES);
    config.catalog.filter_fields = vec!["training_area".to_owned()];
    config.search.index_dir = index.path().to_path_buf();
    config.i18n.languages = vec!["en".to_owned(), "es".to_owned()];
    config.i18n.catalogs.insert(
        "es".to_owned(),
        BTreeMap::from([
            ("Training".to_owned(), "Formación".to_owned()),
            ("trainings".to_owned(), "cursos".to_owned()),
            (DISPLAY_MSG.to_owned(), "Mostrando <b>{start} - {end}</b> {record_name} de <b>{total}</b>".to_owned()),
        ]),
    );
    tweak(&mut config);

    let calls = Arc::new(AtomicUsize::new(0));
    let memory = MemoryBackend::from_fixture(FIXTURE).unwrap();
    let erp = Erp::from_backend(Counting { inner: memory, calls: calls.clone() });

    let templates = Catalog::new(&erp, &config, "en").all().await.unwrap();
    let search = SearchIndex::create(index.path().join("en")).unwrap();
    let mut writer = search.writer().unwrap();
    for document in templates.iter().filter_map(search_document) {
        writer.add(&document).unwrap();
    }
    writer.commit().unwrap();

    let slice = campus_training::init(&config).unwrap();
    let state = ApiState::builder().config(config).erp(erp).register_slice(slice).build().unwrap();

    let (router, _api) = campus_training::router().merge(system_router()).split_for_parts();
    let router = router
        .layer(from_fn_with_state(state.sessions.clone(), session_middleware))
        .with_state(state);

    TestApp { router, calls, _index: index }
}

impl TestApp {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self.send(Request::get(uri).body(Body::empty()).unwrap()).await;
        let status = response.status();
        (status, body_text(response).await)
    }

    async fn get_with_cookie(&self, uri: &str, cookie: &str) -> String {
        let request = Request::get(uri).header(header::COOKIE, cookie).body(Body::empty()).unwrap();
        let response = self.send(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_text(response).await
    }

    async fn post_form(&self, uri: &str, form: &'static str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(form)).unwrap()).await
    }
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn position(body: &str, needle: &str) -> usize {
    body.find(needle).unwrap_or_else(|| panic!("'{needle}' not found"))
}

fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_owned()
}

#[tokio::test]
async fn upcoming_trainings_follow_session_order() {
    let app = app().await;
    let (status, body) = app.get("/en/training/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(position(&body, "Advanced Rust") < position(&body, "Rust Fundamentals"));
    assert!(position(&body, "Rust Fundamentals") < position(&body, "Data Analysis"));
    assert!(body.contains("Campus Training"));
    assert!(!body.contains("Retired Course"));
    assert!(!body.contains("Office Chair"));
}

#[tokio::test]
async fn unknown_language_is_not_found() {
    let app = app().await;
    assert_eq!(app.get("/fr/training/").await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/fr/training/json/trainings").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_website_is_not_found() {
    let app = app_with(|config| config.website.id = 99).await;
    assert_eq!(app.get("/en/training/").await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/en/training/rust").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn all_is_paginated_by_name() {
    let app = app().await;

    let (status, first) = app.get("/en/training/all/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(position(&first, "Advanced Rust") < position(&first, "Data Analysis"));
    assert!(!first.contains("Rust Fundamentals"));
    assert!(first.contains("Displaying <b>1 - 2</b> trainings of <b>3</b>"));

    let (_, second) = app.get("/en/training/all/?page=2").await;
    assert!(second.contains("Rust Fundamentals"));
    assert!(second.contains("Displaying <b>3 - 3</b> trainings of <b>3</b>"));

    let (status, malformed) = app.get("/en/training/all/?page=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert!(malformed.contains("Displaying <b>1 - 2</b>"));
}

#[tokio::test]
async fn all_matches_names_case_insensitively() {
    let app = app().await;
    let (status, body) = app.get("/en/training/all/?q=RUST").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Advanced Rust"));
    assert!(body.contains("Rust Fundamentals"));
    assert!(!body.contains("Data Analysis"));
}

#[tokio::test]
async fn posted_filter_is_saved_in_the_session() {
    let app = app().await;

    let response = app.post_form("/en/training/all/", "training_area=2&id=1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let body = body_text(response).await;
    assert!(body.contains("Advanced Rust"));
    assert!(body.contains("Data Analysis"));
    assert!(!body.contains("Rust Fundamentals"));

    let upcoming = app.get_with_cookie("/en/training/", &cookie).await;
    assert!(upcoming.contains("Data Analysis"));
    assert!(!upcoming.contains("Rust Fundamentals"));

    let json = app.get_with_cookie("/en/training/json/trainings", &cookie).await;
    let listing: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(listing.as_array().unwrap().len(), 3);

    let resubmitted = app.post_form("/en/training/all/", "", Some(&cookie)).await;
    assert_eq!(resubmitted.status(), StatusCode::OK);
    assert!(resubmitted.headers().get(header::SET_COOKIE).is_none());
    let body = body_text(resubmitted).await;
    assert!(body.contains("Data Analysis"));
    assert!(!body.contains("Rust Fundamentals"));
    let upcoming = app.get_with_cookie("/en/training/", &cookie).await;
    assert!(!upcoming.contains("Rust Fundamentals"));

    let cleared = app.post_form("/en/training/all/", "id=1", Some(&cookie)).await;
    assert_eq!(cleared.status(), StatusCode::OK);
    let upcoming = app.get_with_cookie("/en/training/", &cookie).await;
    assert!(upcoming.contains("Rust Fundamentals"));
}

#[tokio::test]
async fn visitors_without_cookie_do_not_share_filters() {
    let app = app().await;
    let response = app.post_form("/en/training/all/", "training_area=2", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = app.get("/en/training/").await;
    assert!(body.contains("Rust Fundamentals"));
}

#[tokio::test]
async fn sessions_by_date() {
    let app = app().await;

    let (status, body) = app.get("/en/training/all/2025-04-10").await;
    assert_eq!(status, StatusCode::OK);
    assert!(position(&body, "Rust Fundamentals") < position(&body, "Data Analysis"));
    assert!(!body.contains("Advanced Rust"));

    assert_eq!(app.get("/en/training/all/2025-04-11").await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/en/training/all/10-04-2025").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn keyword_listing() {
    let app = app().await;

    let (status, body) = app.get("/en/training/key/rust").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Advanced Rust"));
    assert!(body.contains("Rust Fundamentals"));
    assert!(!body.contains("Retired Course"));

    assert_eq!(app.get("/en/training/key/cobol").await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/en/training/key/rust?page=5").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_by_slug_or_code() {
    let app = app().await;

    let (status, body) = app.get("/en/training/rust").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Rust Fundamentals"));
    assert!(body.contains("Barcelona"));
    assert!(body.contains("450.00"));

    let (status, by_code) = app.get("/en/training/RUST-APR").await;
    assert_eq!(status, StatusCode::OK);
    assert!(by_code.contains("Rust Fundamentals"));

    assert_eq!(app.get("/en/training/unknown").await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/en/training/retired").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_ignores_unsafe_template_names() {
    let app = app().await;
    let (status, body) = app.get("/en/training/rust?template=..%2Fbase").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("training-detail"));
}

#[tokio::test]
async fn detail_renders_json_on_request() {
    let app = app().await;
    let response = app.send(Request::get("/en/training/rust?render=json").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let detail: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(detail["name"], "Rust Fundamentals");
    assert_eq!(detail["training_sessions"][0]["training_start_date"], "2025-04-10");
    assert_eq!(detail["training_sessions"][1]["training_start_date"], "2025-01-20");
}

#[tokio::test]
async fn full_text_search() {
    let app = app().await;

    let (status, body) = app.get("/en/training/search/?q=ownership").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Rust Fundamentals"));
    assert!(!body.contains("Data Analysis"));

    let (status, empty) = app.get("/en/training/search/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(empty.contains("No trainings found"));

    let (status, past_the_end) = app.get("/en/training/search/?q=rust&page=4294967295").await;
    assert_eq!(status, StatusCode::OK);
    assert!(past_the_end.contains("No trainings found"));

    assert_eq!(app.get("/es/training/search/?q=rust").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn json_listing_and_detail() {
    let app = app().await;

    let (status, body) = app.get("/en/training/json/trainings").await;
    assert_eq!(status, StatusCode::OK);
    let listing: Value = serde_json::from_str(&body).unwrap();
    let ids: Vec<i64> = listing.as_array().unwrap().iter().map(|t| t["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2, 1, 3]);
    assert_eq!(listing[0]["training_sessions"][0]["training_place.rec_name"], "Online");

    let (status, detail) = app.get("/en/training/json/RUST-APR").await;
    assert_eq!(status, StatusCode::OK);
    let detail: Value = serde_json::from_str(&detail).unwrap();
    assert_eq!(detail["esale_slug"], "rust");
    assert_eq!(detail["esale_price"], "450.00");

    assert_eq!(app.get("/en/training/json/unknown").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn json_views_are_served_from_the_cache() {
    let app = app().await;

    let (_, listing) = app.get("/en/training/json/trainings").await;
    let (_, detail) = app.get("/en/training/json/rust").await;
    let before = app.calls();

    let (status, again) = app.get("/en/training/json/trainings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again, listing);
    let (status, again) = app.get("/en/training/json/rust").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again, detail);
    assert_eq!(app.calls(), before);

    // Other languages have their own entries.
    app.get("/es/training/json/trainings").await;
    assert!(app.calls() > before);
}

#[tokio::test]
async fn json_cache_expires_after_its_ttl() {
    let app = app_with(|config| config.cache.ttl_seconds = 1).await;

    app.get("/en/training/json/trainings").await;
    let cached = app.calls();
    app.get("/en/training/json/trainings").await;
    assert_eq!(app.calls(), cached);

    tokio::time::sleep(Duration::from_millis(1_200)).await;
    let (status, _) = app.get("/en/training/json/trainings").await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.calls() > cached);
}

#[tokio::test]
async fn pages_are_translated() {
    let app = app().await;

    let (_, upcoming) = app.get("/es/training/").await;
    assert!(upcoming.contains("Formación"));
    assert!(upcoming.contains("href=\"/es/training/all/\""));

    let (_, all) = app.get("/es/training/all/").await;
    assert!(all.contains("Mostrando <b>1 - 2</b> cursos de <b>3</b>"));
}

#[tokio::test]
async fn health_reports_the_backend() {
    let app = app().await;
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "up");
    assert_eq!(health["backend"], "memory");
}

#[tokio::test]
async fn catalog_reads_in_the_request_language() {
    let erp = Erp::builder().url("memory://").fixture(FIXTURE).init().await.unwrap();
    let config = ApiConfig::default();
    let catalog = Catalog::new(&erp, &config, "es");

    let found = catalog.by_ids(&[3, 4, 1]).await.unwrap();
    let ids: Vec<_> = found.iter().filter_map(campus_erp::Record::id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert_eq!(erp.today(&ErpContext::language("es")).await.unwrap().to_string(), "2025-03-01");
}
