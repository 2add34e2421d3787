use std::borrow::Cow;

#[campus_derive::campus_error]
pub enum SearchError {
    /// No index exists at the given location.
    #[error("Search index not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Index error{}: {source}", format_context(.context))]
    Index { source: tantivy::TantivyError, context: Option<Cow<'static, str>> },

    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal search error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
