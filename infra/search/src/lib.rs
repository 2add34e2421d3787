//! # Search
//!
//! Wrapper over a [`tantivy`] index of catalog entries: opening pre-built indexes,
//! lenient ranked queries with pagination, and a writer for the indexing tool.
//!
//! Schema: `id` (u64, stored, fast), `slug` (raw, stored), `title` (text, stored),
//! `content` (text).

mod error;
mod index;
mod indexes;

pub use crate::error::{SearchError, SearchErrorExt};
pub use crate::index::{SearchHit, SearchIndex, SearchIndexWriter, SearchPage, TrainingDocument};
pub use crate::indexes::SearchIndexes;
