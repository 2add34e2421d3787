use crate::index::SearchIndex;
use fxhash::FxHashMap;
use std::path::Path;
use tracing::{info, warn};

/// Per-language indexes found under `<root>/<lang>`.
#[derive(Debug, Clone, Default)]
pub struct SearchIndexes {
    by_language: FxHashMap<String, SearchIndex>,
}

impl SearchIndexes {
    /// Opens the index of every language that has one; the others are skipped.
    pub fn discover<I, S>(root: impl AsRef<Path>, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let root = root.as_ref();
        let mut by_language = FxHashMap::default();

        for language in languages {
            let language = language.as_ref();
            match SearchIndex::open(root.join(language)) {
                Ok(index) => {
                    info!(%language, documents = index.len(), "Search index opened");
                    by_language.insert(language.to_owned(), index);
                },
                Err(err) => warn!(%language, error = %err, "No search index, search disabled"),
            }
        }

        Self { by_language }
    }

    pub fn insert(&mut self, language: impl Into<String>, index: SearchIndex) {
        self.by_language.insert(language.into(), index);
    }

    #[must_use]
    pub fn get(&self, language: &str) -> Option<&SearchIndex> {
        self.by_language.get(language)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_language.is_empty()
    }
}
