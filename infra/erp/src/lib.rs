//! # ERP client
//!
//! Typed access to a Tryton-style business-object server: query [`Domain`]s,
//! [`Record`] rows and the [`ErpBackend`] trait with two implementations:
//!
//! * [`RpcBackend`]: JSON-RPC over HTTP(S), selected by `http://` / `https://` URLs;
//! * [`MemoryBackend`]: domain evaluation over a JSON fixture, selected by `memory://`.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), campus_erp::ErpError> {
//! use campus_erp::{Domain, Erp, ErpContext, Operator, Query};
//!
//! let erp = Erp::builder().url("memory://").fixture("fixtures/catalog.json").init().await?;
//! let query = Query::new(Domain::new().with("training", Operator::Eq, true)).limit(20);
//! let ids = erp.search("product.template", &query, &ErpContext::default()).await?;
//! # Ok(()) }
//! ```

mod backend;
pub mod codec;
mod domain;
mod error;
mod memory;
mod record;
mod rpc;

pub use crate::backend::{ErpBackend, ErpContext};
pub use crate::domain::{Clause, Direction, Domain, Operator, Order, Query};
pub use crate::error::{ErpError, ErpErrorExt};
pub use crate::memory::{Fixture, MemoryBackend};
pub use crate::record::Record;
pub use crate::rpc::{Credentials, RpcBackend};

use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const HEALTH_ATTEMPTS: u32 = 3;
const HEALTH_BACKOFF: Duration = Duration::from_millis(500);

/// Shared handle to the configured backend.
#[derive(Debug, Clone)]
pub struct Erp {
    backend: Arc<dyn ErpBackend>,
}

impl Erp {
    #[must_use]
    pub fn builder() -> ErpBuilder {
        ErpBuilder::default()
    }

    /// Wraps an already constructed backend (tests, custom transports).
    pub fn from_backend(backend: impl ErpBackend + 'static) -> Self {
        Self { backend: Arc::new(backend) }
    }
}

impl Deref for Erp {
    type Target = dyn ErpBackend;

    fn deref(&self) -> &Self::Target {
        self.backend.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct ErpBuilder {
    url: Option<String>,
    database: Option<String>,
    credentials: Option<Credentials>,
    fixture: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ErpBuilder {
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials { username: username.into(), password: password.into() });
        self
    }

    /// Fixture file of the `memory://` backend.
    #[must_use]
    pub fn fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture = Some(path.into());
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the backend chosen by the URL scheme and waits until it answers
    /// `ir.date.today` (three attempts, exponential backoff).
    ///
    /// # Errors
    /// [`ErpError::Validation`] for a missing URL or unknown scheme,
    /// [`ErpError::Connection`] when the health check keeps failing.
    pub async fn init(self) -> Result<Erp, ErpError> {
        let url = self.url.ok_or(ErpError::Validation {
            message: "URL is required".into(),
            context: Some("ERP builder".into()),
        })?;

        let erp = match url.split_once("://").map(|(scheme, _)| scheme) {
            Some("memory") => match &self.fixture {
                Some(path) => Erp::from_backend(MemoryBackend::from_fixture(path)?),
                None => Erp::from_backend(MemoryBackend::default()),
            },
            Some("http" | "https") => {
                let database = self.database.ok_or(ErpError::Validation {
                    message: "database is required for JSON-RPC".into(),
                    context: Some(url.clone().into()),
                })?;
                let timeout = self.timeout.unwrap_or(Duration::from_secs(30));
                Erp::from_backend(RpcBackend::new(&url, &database, self.credentials, timeout)?)
            },
            _ => {
                return Err(ErpError::Validation {
                    message: format!("unsupported ERP URL '{url}'").into(),
                    context: Some("expected http://, https:// or memory://".into()),
                });
            },
        };

        health_check(&erp).await?;
        info!(backend = erp.kind(), "ERP backend ready");
        Ok(erp)
    }
}

async fn health_check(erp: &Erp) -> Result<(), ErpError> {
    let ctx = ErpContext::default();
    let mut delay = HEALTH_BACKOFF;

    for attempt in 1..=HEALTH_ATTEMPTS {
        match erp.today(&ctx).await {
            Ok(_) => return Ok(()),
            Err(err @ ErpError::Auth { .. }) => return Err(err),
            Err(err) if attempt == HEALTH_ATTEMPTS => {
                return Err(ErpError::Connection {
                    message: err.to_string().into(),
                    context: Some(format!("health check failed after {attempt} attempts").into()),
                });
            },
            Err(err) => {
                warn!(attempt, error = %err, "ERP health check failed, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            },
        }
    }

    Ok(())
}
