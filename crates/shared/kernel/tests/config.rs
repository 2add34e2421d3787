use campus_kernel::config::{ConfigError, load_api_config, load_config};
use std::io::Write;
use std::path::Path;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn file_sections_override_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write(
        tmp.path(),
        "server.toml",
        r#"
[server]
port = 8080

[erp]
url = "https://erp.example.com"
database = "shop"
credentials = { username = "web", password = "secret" }

[website]
id = 3
shops = [1, 2]

[catalog]
limit = 10
filter_fields = ["training_place"]

[i18n]
default_language = "ca"
languages = ["ca", "es", "en"]

[i18n.catalogs.ca]
"all trainings" = "totes les formacions"
"#,
    );

    let config = load_api_config(Some(&path)).unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.erp.database, "shop");
    assert_eq!(config.erp.credentials.as_ref().map(|c| c.username.as_str()), Some("web"));
    assert_eq!(config.website.id, 3);
    assert_eq!(config.website.shops, vec![1, 2]);
    assert_eq!(config.catalog.limit, 10);
    assert_eq!(config.catalog.filter_fields, vec!["training_place".to_owned()]);
    assert_eq!(config.i18n.catalogs["ca"]["all trainings"], "totes les formacions");
    // untouched sections keep their defaults
    assert_eq!(config.cache.ttl_seconds, 3600);
    assert_eq!(config.session.cookie_name, "campus_session");
}

#[test]
fn missing_file_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let result = load_api_config(Some(tmp.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Config { .. })));
}

#[test]
fn generic_loader_deserializes_any_shape() {
    #[derive(serde::Deserialize)]
    struct Local {
        name: String,
    }

    let tmp = tempfile::tempdir().unwrap();
    let path = write(tmp.path(), "local.json", r#"{"name": "campus"}"#);
    let local: Local = load_config(Some(&path)).unwrap();
    assert_eq!(local.name, "campus");
}

#[test]
fn shipped_server_config_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../../server.toml");
    let config = load_api_config(Some(path)).unwrap();

    assert_eq!(config.erp.url, "memory://");
    assert!(config.erp.fixture.is_some());
    assert_eq!(config.catalog.filter_fields, vec!["training_area".to_owned()]);
    assert!(config.i18n.languages.contains(&"es".to_owned()));
}
