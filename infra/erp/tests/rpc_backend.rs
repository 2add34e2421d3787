use campus_erp::{Domain, Erp, ErpBackend, ErpContext, ErpError, Operator, Query, RpcBackend};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn backend(server: &MockServer, credentials: bool) -> RpcBackend {
    let credentials = credentials.then(|| campus_erp::Credentials {
        username: "admin".to_owned(),
        password: "secret".to_owned(),
    });
    RpcBackend::new(&server.base_url(), "training", credentials, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn search_read_sends_positional_params_and_normalizes() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/training/")
            .json_body_partial(r#"{"method": "model.product.template.search_read"}"#)
            .body_contains(r#"[["training","=",true]]"#);
        then.status(200).json_body(json!({
            "id": 1,
            "result": [{
                "id": 7,
                "esale_price": {"__class__": "Decimal", "decimal": "120.00"},
                "create_date": {"__class__": "datetime", "year": 2025, "month": 1, "day": 2,
                                "hour": 8, "minute": 0, "second": 0}
            }]
        }));
    });

    let query = Query::new(Domain::new().with("training", Operator::Eq, true)).limit(5);
    let rows = backend(&server, false)
        .search_read("product.template", &query, &["esale_price".to_owned()], &ErpContext::language("ca"))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(rows[0].id(), Some(7));
    assert_eq!(rows[0].str("esale_price"), Some("120.00"));
    assert_eq!(rows[0].str("create_date"), Some("2025-01-02T08:00:00"));
}

#[tokio::test]
async fn faults_surface_as_rpc_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/training/");
        then.status(200).json_body(json!({"id": 1, "error": ["UserError", ["Access denied"]]}));
    });

    let err = backend(&server, false)
        .search_count("product.template", &Query::default(), &ErpContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ErpError::Rpc { .. }));
    assert!(err.to_string().contains("Access denied"));
}

#[tokio::test]
async fn login_sets_the_session_header() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/training/").body_contains("common.db.login");
        then.status(200).json_body(json!({"id": 1, "result": [3, "abc"]}));
    });
    // base64("admin:3:abc")
    let today = server.mock(|when, then| {
        when.method(POST)
            .path("/training/")
            .header("authorization", "Session YWRtaW46MzphYmM=")
            .body_contains("model.ir.date.today");
        then.status(200).json_body(json!({
            "id": 2,
            "result": {"__class__": "date", "year": 2025, "month": 3, "day": 1}
        }));
    });

    let date = backend(&server, true).today(&ErpContext::default()).await.unwrap();

    login.assert();
    today.assert();
    assert_eq!(date.to_string(), "2025-03-01");
}

#[tokio::test]
async fn rejected_session_relogs_once() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/training/").body_contains("common.db.login");
        then.status(200).json_body(json!({"id": 1, "result": [3, "abc"]}));
    });
    let denied = server.mock(|when, then| {
        when.method(POST).path("/training/").body_contains("model.ir.date.today");
        then.status(401);
    });

    let err = backend(&server, true).today(&ErpContext::default()).await.unwrap_err();

    assert!(matches!(err, ErpError::Auth { .. }));
    login.assert_hits(2);
    denied.assert_hits(2);
}

#[tokio::test]
async fn invalid_login_is_an_auth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/training/").body_contains("common.db.login");
        then.status(200).json_body(json!({"id": 1, "result": false}));
    });

    let err = backend(&server, true).login().await.unwrap_err();
    assert!(matches!(err, ErpError::Auth { .. }));
}

#[tokio::test]
async fn builder_gives_up_after_three_health_checks() {
    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(POST).path("/training/");
        then.status(500);
    });

    let err = Erp::builder()
        .url(server.base_url())
        .database("training")
        .timeout(Duration::from_secs(2))
        .init()
        .await
        .unwrap_err();

    assert!(matches!(err, ErpError::Connection { .. }));
    failing.assert_hits(3);
}
