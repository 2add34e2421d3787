use crate::constants::{TRAINING_PRODUCT_FIELD_NAMES, TRAINING_TEMPLATE_FIELD_NAMES};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// All configuration sections of the catalog server.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub erp: ErpConfig,
    pub website: WebsiteConfig,
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub session: SessionConfig,
    pub cache: CacheConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Arc-wrapped config, cheap to clone into handlers and slices.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Business-object server connection.
///
/// `url` selects the backend: `http(s)://` speaks JSON-RPC, `memory://` evaluates
/// queries over an in-process fixture (development and tests).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ErpConfig {
    pub url: String,
    pub database: String,
    pub credentials: Option<ErpCredentials>,
    pub fixture: Option<PathBuf>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErpCredentials {
    pub username: String,
    pub password: String,
}

/// The website record and the shops whose products are published.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    pub id: i64,
    pub shops: Vec<i64>,
}

/// Catalog listing behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Records per page.
    pub limit: u32,
    /// Directory holding the HTML templates.
    pub templates_dir: PathBuf,
    /// Template fields a visitor may filter on through `POST /all/`.
    pub filter_fields: Vec<String>,
    pub template_fields: Vec<String>,
    pub product_fields: Vec<String>,
}

/// Pre-built text index location; one sub-directory per language.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub index_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Idle lifetime of a session.
    pub ttl_seconds: u64,
    pub capacity: u64,
    pub secure: bool,
}

/// JSON response cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub capacity: u64,
}

/// Languages served under `/{lang}/...` and their message catalogs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    pub default_language: String,
    pub languages: Vec<String>,
    /// language -> msgid -> translation
    pub catalogs: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
    pub filter: Option<String>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_owned(),
            database: "tryton".to_owned(),
            credentials: None,
            fixture: None,
            timeout_seconds: 30,
        }
    }
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self { id: 1, shops: vec![1] }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            templates_dir: PathBuf::from("templates"),
            filter_fields: Vec::new(),
            template_fields: TRAINING_TEMPLATE_FIELD_NAMES.iter().map(|&f| f.to_owned()).collect(),
            product_fields: TRAINING_PRODUCT_FIELD_NAMES.iter().map(|&f| f.to_owned()).collect(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { index_dir: PathBuf::from("index/training") }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "campus_session".to_owned(),
            ttl_seconds: 86_400,
            capacity: 10_000,
            secure: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 3600, capacity: 1000 }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_owned(),
            languages: vec!["en".to_owned()],
            catalogs: BTreeMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), directory: None, json: false, max_files: 10, filter: None }
    }
}
