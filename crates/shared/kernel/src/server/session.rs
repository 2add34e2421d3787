//! Cookie-keyed server-side sessions.
//!
//! Session data is a JSON map held in a bounded `moka` cache with time-to-idle
//! expiry. [`session_middleware`] attaches a [`Session`] to every request; a new
//! session is only stored, and its cookie only sent, once something was written.

use crate::safe_nanoid;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use campus_domain::config::SessionConfig;
use moka::sync::Cache;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

const SESSION_ID_LENGTH: usize = 32;

type SessionData = Arc<RwLock<Map<String, Value>>>;

#[derive(Debug, Clone)]
pub struct SessionStore {
    cache: Cache<String, SessionData>,
    cookie_name: Arc<str>,
    secure: bool,
}

impl SessionStore {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_idle(Duration::from_secs(config.ttl_seconds.max(1)))
            .build();
        Self { cache, cookie_name: Arc::from(config.cookie_name.as_str()), secure: config.secure }
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// The stored session for `id`, or a fresh unsaved one.
    #[must_use]
    pub fn load(&self, id: Option<&str>) -> Session {
        if let Some(id) = id
            && let Some(data) = self.cache.get(id)
        {
            return Session {
                id: Arc::from(id),
                data,
                is_new: false,
                dirty: Arc::new(AtomicBool::new(false)),
            };
        }

        Session {
            id: Arc::from(safe_nanoid!(SESSION_ID_LENGTH).as_str()),
            data: SessionData::default(),
            is_new: true,
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stores a written session; returns the cookie to send for a new one.
    pub fn commit(&self, session: &Session) -> Option<Cookie<'static>> {
        if !session.dirty.load(Ordering::Acquire) {
            return None;
        }
        self.cache.insert(session.id.to_string(), session.data.clone());
        if !session.is_new {
            return None;
        }

        debug!(session = %session.id, "Session created");
        Some(
            Cookie::build((self.cookie_name.to_string(), session.id.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(self.secure)
                .build(),
        )
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

/// Per-request handle to the visitor's session data.
#[derive(Debug, Clone)]
pub struct Session {
    id: Arc<str>,
    data: SessionData,
    is_new: bool,
    dirty: Arc<AtomicBool>,
}

impl Session {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `None` when the key is missing or holds another shape.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.data.read().get(key).cloned()?;
        match serde_json::from_value(value) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%key, error = %err, "Discarding malformed session value");
                None
            },
        }
    }

    /// # Errors
    /// Fails when `value` cannot be represented as JSON.
    pub fn insert<T: Serialize>(&self, key: impl Into<String>, value: &T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.data.write().insert(key.into(), value);
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        if self.data.write().remove(key).is_some() {
            self.dirty.store(true, Ordering::Release);
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "session layer is not installed"))
    }
}

/// Loads the session named by the cookie, runs the request, then stores what was written.
pub async fn session_middleware(
    State(store): State<SessionStore>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = store.load(jar.get(store.cookie_name()).map(Cookie::value));
    request.extensions_mut().insert(session.clone());

    let response = next.run(request).await;

    match store.commit(&session) {
        Some(cookie) => (jar.add(cookie), response).into_response(),
        None => response,
    }
}
