use campus_domain::config::{ApiConfig, CatalogConfig, ErpConfig, I18nConfig, ServerConfig};
use campus_domain::constants::TRAINING_TEMPLATE_FIELD_NAMES;
use serde_json::json;

#[test]
fn defaults_are_usable_without_a_config_file() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4583);
    assert!(server.ssl.is_none());

    let erp = ErpConfig::default();
    assert_eq!(erp.url, "memory://");
    assert!(erp.credentials.is_none());

    let catalog = CatalogConfig::default();
    assert_eq!(catalog.limit, 20);
    assert_eq!(catalog.template_fields.len(), TRAINING_TEMPLATE_FIELD_NAMES.len());
    assert!(catalog.filter_fields.is_empty());

    let i18n = I18nConfig::default();
    assert_eq!(i18n.default_language, "en");
    assert_eq!(i18n.languages, vec!["en".to_owned()]);
}

#[test]
fn api_config_deserializes_partial_sections() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "erp": {
            "url": "https://erp.example.com",
            "database": "shop",
            "credentials": { "username": "web", "password": "secret" }
        },
        "website": { "id": 3, "shops": [1, 2] },
        "catalog": { "limit": 12, "filter_fields": ["training_place"] },
        "i18n": {
            "languages": ["en", "es"],
            "catalogs": { "es": { "Training": "Formación" } }
        }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.erp.database, "shop");
    assert_eq!(cfg.erp.credentials.as_ref().map(|c| c.username.as_str()), Some("web"));
    assert_eq!(cfg.website.shops, vec![1, 2]);
    assert_eq!(cfg.catalog.limit, 12);
    // Untouched fields keep their defaults.
    assert_eq!(cfg.catalog.product_fields.len(), 8);
    assert_eq!(cfg.session.cookie_name, "campus_session");
    assert_eq!(cfg.i18n.catalogs["es"]["Training"], "Formación");
}

#[test]
fn mutation_through_deref_does_not_affect_clones() {
    let original = ApiConfig::default();
    let mut changed = original.clone();
    changed.server.port = 9000;

    assert_eq!(original.server.port, 4583);
    assert_eq!(changed.server.port, 9000);
}
