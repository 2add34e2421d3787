use std::borrow::Cow;

/// Errors of the business-object client.
#[campus_derive::campus_error]
pub enum ErpError {
    /// Missing or inconsistent builder/query parameters.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The server could not be reached or stayed unhealthy.
    #[error("ERP connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Login rejected or session refused after re-login.
    #[error("ERP authentication failed{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Fault reported by the remote method (access error, missing record, ...).
    #[error("ERP call failed{}: {message}", format_context(.context))]
    Rpc { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("HTTP error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Decode error{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Fixture error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal ERP error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
