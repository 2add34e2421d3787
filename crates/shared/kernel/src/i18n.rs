//! Message catalogs keyed by language.

use campus_domain::config::I18nConfig;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Translator {
    inner: Arc<TranslatorInner>,
}

#[derive(Debug)]
struct TranslatorInner {
    default_language: String,
    languages: Vec<String>,
    catalogs: BTreeMap<String, BTreeMap<String, String>>,
}

impl Translator {
    #[must_use]
    pub fn new(config: &I18nConfig) -> Self {
        let mut languages = config.languages.clone();
        if !languages.contains(&config.default_language) {
            languages.push(config.default_language.clone());
        }
        Self {
            inner: Arc::new(TranslatorInner {
                default_language: config.default_language.clone(),
                languages,
                catalogs: config.catalogs.clone(),
            }),
        }
    }

    /// Translation of `msgid` in `language`, or `msgid` itself.
    ///
    /// Catalogs loaded through the `config` crate may carry lowercased keys, so an
    /// exact miss retries with the lowercased `msgid`.
    #[must_use]
    pub fn gettext<'a>(&'a self, language: &str, msgid: &'a str) -> &'a str {
        self.inner
            .catalogs
            .get(language)
            .and_then(|catalog| catalog.get(msgid).or_else(|| catalog.get(&msgid.to_lowercase())))
            .map_or(msgid, String::as_str)
    }

    #[must_use]
    pub fn supports(&self, language: &str) -> bool {
        self.inner.languages.iter().any(|l| l == language)
    }

    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.inner.default_language
    }

    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.inner.languages
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(&I18nConfig::default())
    }
}
