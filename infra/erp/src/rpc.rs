//! JSON-RPC transport to a Tryton-style server.
//!
//! Every call is a `POST {url}/{database}/` with `{"id", "method", "params"}`. With
//! credentials the backend logs in through `common.db.login` and sends
//! `Authorization: Session base64(login:user_id:session)`; a 401/403 triggers one
//! re-login and a single retry.

use crate::backend::{ErpBackend, ErpContext};
use crate::codec::{normalize, parse_date};
use crate::domain::Query;
use crate::error::{ErpError, ErpErrorExt};
use crate::record::Record;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Model answering `today` in the server's timezone.
const DATE_MODEL: &str = "ir.date";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug)]
pub struct RpcBackend {
    client: Client,
    endpoint: String,
    credentials: Option<Credentials>,
    authorization: RwLock<Option<String>>,
    next_id: AtomicU64,
}

impl RpcBackend {
    /// # Errors
    /// [`ErpError::Http`] when the HTTP client cannot be built.
    pub fn new(
        url: &str,
        database: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, ErpError> {
        let client = Client::builder().timeout(timeout).build().context("Building HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/{}/", url.trim_end_matches('/'), database),
            credentials,
            authorization: RwLock::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Opens a session and stores the authorization header.
    ///
    /// # Errors
    /// [`ErpError::Auth`] when the server refuses the login or answers an unexpected shape.
    pub async fn login(&self) -> Result<(), ErpError> {
        let Some(credentials) = &self.credentials else {
            return Ok(());
        };

        let params = json!([credentials.username, { "password": credentials.password }, Value::Null]);
        let (status, body) = self.post("common.db.login", &params, None).await?;
        if !status.is_success() {
            return Err(ErpError::Auth {
                message: format!("login answered HTTP {status}").into(),
                context: Some(credentials.username.clone().into()),
            });
        }

        let result = into_result(body).map_err(|e| ErpError::Auth {
            message: e.to_string().into(),
            context: Some(credentials.username.clone().into()),
        })?;
        let (user_id, session) = match result.as_array().map(Vec::as_slice) {
            Some([user_id, session, ..]) => match (user_id.as_i64(), session.as_str()) {
                (Some(user_id), Some(session)) => (user_id, session.to_owned()),
                _ => return Err(login_rejected(&credentials.username)),
            },
            _ => return Err(login_rejected(&credentials.username)),
        };

        let token = STANDARD.encode(format!("{}:{user_id}:{session}", credentials.username));
        *self.authorization.write().await = Some(format!("Session {token}"));
        debug!(user = %credentials.username, user_id, "ERP session opened");
        Ok(())
    }

    /// Calls `method` and returns its normalized result.
    ///
    /// # Errors
    /// Transport, authentication and remote faults, see [`ErpError`].
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ErpError> {
        if self.credentials.is_some() && self.authorization.read().await.is_none() {
            self.login().await?;
        }

        let mut relogged = false;
        loop {
            let authorization = self.authorization.read().await.clone();
            let (status, body) = self.post(method, &params, authorization.as_deref()).await?;

            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                if self.credentials.is_some() && !relogged {
                    warn!(%method, %status, "ERP session rejected, logging in again");
                    relogged = true;
                    self.login().await?;
                    continue;
                }
                return Err(ErpError::Auth {
                    message: format!("HTTP {status}").into(),
                    context: Some(method.to_owned().into()),
                });
            }
            if !status.is_success() {
                return Err(ErpError::Rpc {
                    message: format!("HTTP {status}").into(),
                    context: Some(method.to_owned().into()),
                });
            }

            return into_result(body).map(normalize).context(method.to_owned());
        }
    }

    async fn post(
        &self,
        method: &str,
        params: &Value,
        authorization: Option<&str>,
    ) -> Result<(StatusCode, Option<RpcResponse>), ErpError> {
        let request = RpcRequest { id: self.next_id.fetch_add(1, Ordering::Relaxed), method, params };
        debug!(%method, id = request.id, "ERP call");

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        let response = builder.send().await.map_err(|e| ErpError::Connection {
            message: e.to_string().into(),
            context: Some(self.endpoint.clone().into()),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Ok((status, None));
        }
        let bytes = response.bytes().await.context(method.to_owned())?;
        let body = serde_json::from_slice::<RpcResponse>(&bytes).context(method.to_owned())?;
        Ok((status, Some(body)))
    }

    async fn model(&self, model: &str, method: &str, params: Value) -> Result<Value, ErpError> {
        self.call(&format!("model.{model}.{method}"), params).await
    }
}

fn login_rejected(username: &str) -> ErpError {
    ErpError::Auth { message: "invalid login".into(), context: Some(username.to_owned().into()) }
}

fn into_result(body: Option<RpcResponse>) -> Result<Value, ErpError> {
    let Some(body) = body else {
        return Err(ErpError::Rpc { message: "empty response".into(), context: None });
    };
    if let Some(error) = body.error {
        return Err(ErpError::Rpc { message: fault_message(&error).into(), context: None });
    }
    Ok(body.result.unwrap_or(Value::Null))
}

/// Faults come as a string or as `["UserError", ["message", "description"]]`.
fn fault_message(error: &Value) -> String {
    fn collect(value: &Value, parts: &mut Vec<String>) {
        match value {
            Value::String(text) if !text.is_empty() => parts.push(text.clone()),
            Value::Array(items) => items.iter().for_each(|item| collect(item, parts)),
            Value::Null | Value::String(_) => {},
            other => parts.push(other.to_string()),
        }
    }

    let mut parts = Vec::new();
    collect(error, &mut parts);
    if parts.is_empty() { "unknown fault".to_owned() } else { parts.join(": ") }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, what: &'static str) -> Result<T, ErpError> {
    serde_json::from_value(value).context(what)
}

#[async_trait]
impl ErpBackend for RpcBackend {
    fn kind(&self) -> &'static str {
        "rpc"
    }

    async fn search(&self, model: &str, query: &Query, ctx: &ErpContext) -> Result<Vec<i64>, ErpError> {
        let params = json!([query.domain, query.offset, query.limit, query.order, ctx.to_value()]);
        decode(self.model(model, "search", params).await?, "Decoding search ids")
    }

    async fn search_count(&self, model: &str, query: &Query, ctx: &ErpContext) -> Result<u64, ErpError> {
        let params = json!([query.domain, ctx.to_value()]);
        decode(self.model(model, "search_count", params).await?, "Decoding search count")
    }

    async fn read(
        &self,
        model: &str,
        ids: &[i64],
        fields: &[String],
        ctx: &ErpContext,
    ) -> Result<Vec<Record>, ErpError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = json!([ids, fields, ctx.to_value()]);
        let rows: Vec<Record> = decode(self.model(model, "read", params).await?, "Decoding rows")?;

        // `read` does not promise the order of `ids`.
        let mut ordered = Vec::with_capacity(ids.len());
        for id in ids {
            match rows.iter().find(|row| row.id() == Some(*id)) {
                Some(row) => ordered.push(row.clone()),
                None => {
                    return Err(ErpError::Rpc {
                        message: format!("{model},{id} does not exist").into(),
                        context: Some("read".into()),
                    });
                },
            }
        }
        Ok(ordered)
    }

    async fn search_read(
        &self,
        model: &str,
        query: &Query,
        fields: &[String],
        ctx: &ErpContext,
    ) -> Result<Vec<Record>, ErpError> {
        let params =
            json!([query.domain, query.offset, query.limit, query.order, fields, ctx.to_value()]);
        decode(self.model(model, "search_read", params).await?, "Decoding rows")
    }

    async fn today(&self, ctx: &ErpContext) -> Result<NaiveDate, ErpError> {
        let value = self.model(DATE_MODEL, "today", json!([ctx.to_value()])).await?;
        parse_date(&value).ok_or_else(|| ErpError::Rpc {
            message: format!("unexpected date {value}").into(),
            context: Some("model.ir.date.today".into()),
        })
    }
}
