//! # Campus Indexer
//!
//! Rebuilds the per-language full-text indexes that `/{lang}/training/search/` reads.
//! Each run replaces the whole index of a language with the templates currently
//! available in the ERP.

use anyhow::{Context, Result};
use campus::domain::config::ApiConfig;
use campus_erp::Erp;
use campus_search::SearchIndex;
use campus_training::catalog::{Catalog, search_document};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Command line of `campus-indexer`.
#[derive(Debug, Parser)]
#[command(name = "campus-indexer", version, about = "Rebuild the training search indexes")]
pub struct Cli {
    /// Configuration file, without extension
    #[arg(short, long, default_value = "server")]
    pub config: PathBuf,

    /// Languages to index; every configured language when omitted
    #[arg(short, long = "lang")]
    pub languages: Vec<String>,
}

impl Cli {
    /// Requested languages, or the configured ones.
    #[must_use]
    pub fn languages(&self, cfg: &ApiConfig) -> Vec<String> {
        if self.languages.is_empty() { cfg.i18n.languages.clone() } else { self.languages.clone() }
    }
}

/// Outcome of indexing one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub language: String,
    pub path: PathBuf,
    pub documents: u64,
}

/// Connects to the ERP described by the `erp` config section.
///
/// # Errors
/// Fails when the backend is unreachable or the fixture cannot be loaded.
pub async fn connect(cfg: &ApiConfig) -> Result<Erp> {
    let mut builder = Erp::builder()
        .url(&cfg.erp.url)
        .database(&cfg.erp.database)
        .timeout(Duration::from_secs(cfg.erp.timeout_seconds));
    if let Some(creds) = &cfg.erp.credentials {
        builder = builder.auth(&creds.username, &creds.password);
    }
    if let Some(fixture) = &cfg.erp.fixture {
        builder = builder.fixture(fixture);
    }
    builder.init().await.context("Failed to establish ERP connection")
}

/// Replaces the index of `language` under `search.index_dir` with the available templates.
///
/// # Errors
/// Fails on ERP errors or when the index directory cannot be written.
pub async fn index_language(erp: &Erp, cfg: &ApiConfig, language: &str) -> Result<IndexReport> {
    let templates = Catalog::new(erp, cfg, language)
        .all()
        .await
        .with_context(|| format!("Reading templates for '{language}'"))?;

    let path = cfg.search.index_dir.join(language);
    let index = SearchIndex::open_or_create(&path).with_context(|| format!("Opening {}", path.display()))?;
    let mut writer = index.writer()?;
    writer.clear()?;

    let mut documents = 0;
    for record in &templates {
        match search_document(record) {
            Some(document) => {
                writer.add(&document)?;
                documents += 1;
            },
            None => warn!(language, record = ?record.id(), "Skipping template without id or name"),
        }
    }
    writer.commit()?;

    info!(language, documents, path = %path.display(), "Index rebuilt");
    Ok(IndexReport { language: language.to_owned(), path, documents })
}

/// Rebuilds the index of every language, stopping at the first failure.
///
/// # Errors
/// See [`index_language`].
pub async fn run(erp: &Erp, cfg: &ApiConfig, languages: &[String]) -> Result<Vec<IndexReport>> {
    let mut reports = Vec::with_capacity(languages.len());
    for language in languages {
        reports.push(index_language(erp, cfg, language).await?);
    }
    Ok(reports)
}
