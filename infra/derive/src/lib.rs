#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Campus macros
//!
//! Attribute macros shared by the workspace crates: error enums, feature slices,
//! `OpenAPI`-aware handlers/models and the runtime entry point.
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its own macros.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Turns an `async fn main` into a sync `main` running on a preset Tokio runtime.
///
/// Profiles: `high_performance`, `memory_efficient`, `default` (or no argument).
///
/// ```rust,ignore
/// #[campus_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Declares an API data model (DTO).
///
/// Adds `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` when they are not
/// derived already, renames fields to `camelCase` and denies unknown fields. Both
/// policies can be changed with `rename_all = "..."` and `deny_unknown_fields = false`.
///
/// ```rust,ignore
/// #[campus_derive::api_model(rename_all = "snake_case")]
/// pub struct TrainingSummary {
///     pub id: i64,
///     pub name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Declares an Axum handler and its `OpenAPI` operation.
///
/// The arguments are passed verbatim to `utoipa::path`; the `path` given there is the
/// route that `utoipa_axum::routes!` registers.
///
/// ```rust,ignore
/// #[campus_derive::api_handler(get, path = "/health", responses((status = OK)))]
/// pub async fn health() -> &'static str {
///     "up"
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Declares a crate error enum.
///
/// * derives `Debug` and `thiserror::Error`;
/// * generates `<Name>Ext::context()` for `Result<T, Name>` and for results of every
///   wrapped source type;
/// * implements `From<Source>` for variants with a `source` (or `#[source]`/`#[from]`) field;
/// * implements `From<&'static str>` and `From<String>` when an `Internal` variant exists;
/// * provides a local `format_context` helper for the `#[error(...)]` strings.
///
/// Variants must use named fields; a variant with a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// #[campus_derive::campus_error]
/// pub enum ErpError {
///     #[error("HTTP error{}: {source}", format_context(.context))]
///     Http { source: reqwest::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn campus_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Declares a feature slice: the struct becomes `<Name>Inner` and `<Name>` is an
/// `Arc` handle implementing `Deref` and the kernel's `FeatureSlice`.
///
/// ```rust,ignore
/// #[campus_derive::campus_slice]
/// #[derive(Debug)]
/// pub struct Training {
///     pub limit: u32,
/// }
///
/// let slice = Training::new(TrainingInner { limit: 20 });
/// ```
#[proc_macro_attribute]
pub fn campus_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
