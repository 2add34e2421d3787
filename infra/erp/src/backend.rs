use crate::domain::Query;
use crate::error::ErpError;
use crate::record::Record;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::Debug;

/// Per-call context forwarded to the server (translations follow `language`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErpContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ErpContext {
    pub fn language(language: impl Into<String>) -> Self {
        Self { language: Some(language.into()) }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match &self.language {
            Some(language) => json!({ "language": language }),
            None => json!({}),
        }
    }
}

/// Access to the business-object server.
///
/// All returned values are normalized (see [`crate::codec::normalize`]).
#[async_trait]
pub trait ErpBackend: Debug + Send + Sync {
    /// Short backend label, reported by the health endpoint.
    fn kind(&self) -> &'static str;

    async fn search(&self, model: &str, query: &Query, ctx: &ErpContext) -> Result<Vec<i64>, ErpError>;

    async fn search_count(&self, model: &str, query: &Query, ctx: &ErpContext) -> Result<u64, ErpError>;

    /// Rows in the order of `ids`; unknown ids are an error.
    async fn read(
        &self,
        model: &str,
        ids: &[i64],
        fields: &[String],
        ctx: &ErpContext,
    ) -> Result<Vec<Record>, ErpError>;

    async fn search_read(
        &self,
        model: &str,
        query: &Query,
        fields: &[String],
        ctx: &ErpContext,
    ) -> Result<Vec<Record>, ErpError>;

    /// The server's current date.
    async fn today(&self, ctx: &ErpContext) -> Result<NaiveDate, ErpError>;
}
