use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use campus_erp::ErpError;
use campus_kernel::server::state::ApiStateError;
use campus_search::SearchError;
use std::borrow::Cow;
use tracing::error;

/// A specialized [`TrainingError`] enum of this crate.
#[campus_derive::campus_error]
pub enum TrainingError {
    /// Unknown language, website, product or an empty listing that must 404.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("ERP error{}: {source}", format_context(.context))]
    Erp { source: ErpError, context: Option<Cow<'static, str>> },

    #[error("Search error{}: {source}", format_context(.context))]
    Search { source: SearchError, context: Option<Cow<'static, str>> },

    #[error("Render error{}: {source}", format_context(.context))]
    Render { source: minijinja::Error, context: Option<Cow<'static, str>> },

    #[error("JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("State error{}: {source}", format_context(.context))]
    State { source: ApiStateError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal training error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl TrainingError {
    pub(crate) fn not_found(what: &'static str, name: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: name.into(), context: Some(what.into()) }
    }
}

impl IntoResponse for TrainingError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound { .. } => {
                tracing::debug!(error = %self, "Responding 404");
                (StatusCode::NOT_FOUND, Html("<h1>404 Not Found</h1>")).into_response()
            },
            other => {
                error!(error = %other, "Training request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>500 Internal Server Error</h1>"))
                    .into_response()
            },
        }
    }
}
