use crate::error::{SearchError, SearchErrorExt};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::QueryParser;
use tantivy::schema::{FAST, Field, INDEXED, STORED, STRING, Schema, TEXT, Value};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tracing::{debug, instrument};

/// Writer heap; tantivy requires at least 15 MB per indexing thread.
const WRITER_HEAP_BYTES: usize = 50_000_000;
const META_FILE: &str = "meta.json";

#[derive(Debug, Clone, Copy)]
struct Fields {
    id: Field,
    slug: Field,
    title: Field,
    content: Field,
}

impl Fields {
    fn schema() -> (Schema, Self) {
        let mut builder = Schema::builder();
        let id = builder.add_u64_field("id", INDEXED | STORED | FAST);
        let slug = builder.add_text_field("slug", STRING | STORED);
        let title = builder.add_text_field("title", TEXT | STORED);
        let content = builder.add_text_field("content", TEXT);
        (builder.build(), Self { id, slug, title, content })
    }

    fn resolve(schema: &Schema) -> Result<Self, SearchError> {
        let field = |name: &'static str| schema.get_field(name).context(format!("Missing field '{name}'"));
        Ok(Self { id: field("id")?, slug: field("slug")?, title: field("title")?, content: field("content")? })
    }
}

/// A catalog entry as it is indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingDocument {
    /// Template id in the ORM.
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub score: f32,
}

/// One page of ranked hits and the total number of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchPage {
    pub total: u64,
    pub hits: Vec<SearchHit>,
}

/// A training index on disk.
#[derive(Clone)]
pub struct SearchIndex {
    path: PathBuf,
    index: Index,
    reader: IndexReader,
    fields: Fields,
}

impl fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex").field("path", &self.path).finish_non_exhaustive()
    }
}

impl SearchIndex {
    /// Opens a pre-built index.
    ///
    /// # Errors
    /// [`SearchError::NotFound`] when `dir` holds no index.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SearchError> {
        let dir = dir.as_ref();
        if !dir.join(META_FILE).is_file() {
            return Err(SearchError::NotFound {
                message: dir.display().to_string().into(),
                context: None,
            });
        }
        let index = Index::open_in_dir(dir).context(format!("Opening {}", dir.display()))?;
        let fields = Fields::resolve(&index.schema())?;
        Self::with_index(dir, index, fields)
    }

    /// Creates an empty index, creating `dir` when needed.
    ///
    /// # Errors
    /// Fails when `dir` already holds an index or cannot be written.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, SearchError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).context(format!("Creating {}", dir.display()))?;
        let (schema, fields) = Fields::schema();
        let index = Index::create_in_dir(dir, schema).context(format!("Creating index in {}", dir.display()))?;
        Self::with_index(dir, index, fields)
    }

    /// Opens the index in `dir`, creating it when absent.
    ///
    /// # Errors
    /// See [`Self::open`] and [`Self::create`].
    pub fn open_or_create(dir: impl AsRef<Path>) -> Result<Self, SearchError> {
        let dir = dir.as_ref();
        if dir.join(META_FILE).is_file() { Self::open(dir) } else { Self::create(dir) }
    }

    fn with_index(dir: &Path, index: Index, fields: Fields) -> Result<Self, SearchError> {
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .context("Building index reader")?;
        Ok(Self { path: dir.to_path_buf(), index, reader, fields })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of indexed documents.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Picks up the latest commit immediately.
    ///
    /// # Errors
    /// [`SearchError::Index`] when the new segments cannot be loaded.
    pub fn reload(&self) -> Result<(), SearchError> {
        self.reader.reload().context("Reloading index reader")
    }

    /// Runs `query` over `title` and `content`, terms AND-ed, syntax errors ignored.
    ///
    /// `page` starts at 1; both `page` and `per_page` are clamped to at least 1.
    ///
    /// # Errors
    /// [`SearchError::Index`] when the searcher or a stored document fails.
    #[instrument(skip(self), fields(index = %self.path.display()))]
    pub fn search(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage, SearchError> {
        if query.trim().is_empty() {
            return Ok(SearchPage::default());
        }

        let mut parser = QueryParser::for_index(&self.index, vec![self.fields.title, self.fields.content]);
        parser.set_conjunction_by_default();
        let (parsed, errors) = parser.parse_query_lenient(query);
        if !errors.is_empty() {
            debug!(?errors, "Ignoring query syntax errors");
        }

        let searcher = self.reader.searcher();
        let total = searcher.search(&parsed, &Count).context("Counting")?;

        // The collector allocates `offset + per_page` slots up front.
        let per_page = per_page.max(1) as usize;
        let offset = (page.max(1) as usize - 1).saturating_mul(per_page);
        if offset >= total {
            return Ok(SearchPage { total: u64::try_from(total).unwrap_or(u64::MAX), hits: Vec::new() });
        }
        let top = searcher
            .search(&parsed, &TopDocs::with_limit(per_page.min(total - offset)).and_offset(offset))
            .context("Searching")?;

        let mut hits = Vec::with_capacity(top.len());
        for (score, address) in top {
            let doc: TantivyDocument = searcher.doc(address).context("Loading stored document")?;
            hits.push(SearchHit {
                id: doc.get_first(self.fields.id).and_then(|v| v.as_u64()).unwrap_or_default(),
                slug: doc.get_first(self.fields.slug).and_then(|v| v.as_str()).unwrap_or_default().to_owned(),
                title: doc.get_first(self.fields.title).and_then(|v| v.as_str()).unwrap_or_default().to_owned(),
                score,
            });
        }

        Ok(SearchPage { total: u64::try_from(total).unwrap_or(u64::MAX), hits })
    }

    /// Single-threaded writer for the indexer tool and tests.
    ///
    /// # Errors
    /// [`SearchError::Index`] when another writer holds the lock.
    pub fn writer(&self) -> Result<SearchIndexWriter, SearchError> {
        let writer: IndexWriter =
            self.index.writer_with_num_threads(1, WRITER_HEAP_BYTES).context("Acquiring index writer")?;
        Ok(SearchIndexWriter { writer, fields: self.fields })
    }
}

pub struct SearchIndexWriter {
    writer: IndexWriter,
    fields: Fields,
}

impl fmt::Debug for SearchIndexWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndexWriter").finish_non_exhaustive()
    }
}

impl SearchIndexWriter {
    /// # Errors
    /// [`SearchError::Index`] when the writer has failed.
    pub fn add(&mut self, document: &TrainingDocument) -> Result<(), SearchError> {
        let mut doc = TantivyDocument::default();
        doc.add_u64(self.fields.id, document.id);
        doc.add_text(self.fields.slug, &document.slug);
        doc.add_text(self.fields.title, &document.title);
        doc.add_text(self.fields.content, &document.content);
        self.writer.add_document(doc).context("Adding document")?;
        Ok(())
    }

    /// Drops every document (visible after [`Self::commit`]).
    ///
    /// # Errors
    /// [`SearchError::Index`] when the writer has failed.
    pub fn clear(&mut self) -> Result<(), SearchError> {
        self.writer.delete_all_documents().context("Clearing index")?;
        Ok(())
    }

    /// # Errors
    /// [`SearchError::Index`] when segments cannot be persisted.
    pub fn commit(&mut self) -> Result<(), SearchError> {
        self.writer.commit().context("Committing index")?;
        Ok(())
    }
}
