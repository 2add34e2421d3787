//! ORM queries behind the catalog views.

use campus_domain::config::ApiConfig;
use campus_domain::constants::{
    PRODUCT_MODEL, SESSIONS_FIELD, TEMPLATE_MODEL, WEBSITE_FIELD_NAMES, WEBSITE_MODEL,
};
use campus_erp::{Clause, Domain, Erp, ErpContext, ErpError, Operator, Order, Query, Record, codec};
use campus_search::TrainingDocument;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, instrument};

/// Read access to the training catalog for one request language.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    erp: &'a Erp,
    config: &'a ApiConfig,
    ctx: ErpContext,
}

impl<'a> Catalog<'a> {
    pub fn new(erp: &'a Erp, config: &'a ApiConfig, language: &str) -> Self {
        Self { erp, config, ctx: ErpContext::language(language) }
    }

    /// Published, active trainings of the configured shops.
    #[must_use]
    pub fn base_domain(&self) -> Domain {
        Domain::new()
            .with("esale_available", Operator::Eq, true)
            .with("esale_active", Operator::Eq, true)
            .with("esale_saleshops", Operator::In, self.config.website.shops.clone())
            .with("training", Operator::Eq, true)
    }

    /// The configured website record.
    pub async fn website(&self) -> Result<Option<Record>, ErpError> {
        let query =
            Query::new(Domain::new().with("id", Operator::Eq, self.config.website.id)).limit(1);
        let fields: Vec<String> = WEBSITE_FIELD_NAMES.iter().map(|&f| f.to_owned()).collect();
        let mut rows = self.erp.search_read(WEBSITE_MODEL, &query, &fields, &self.ctx).await?;
        Ok(rows.pop())
    }

    /// Templates having a session that matches `session_filter`, in the order of
    /// their earliest matching session.
    #[instrument(skip_all)]
    pub async fn by_sessions(&self, session_filter: Domain) -> Result<Vec<Record>, ErpError> {
        let mut domain = self.base_domain().prefixed("template");
        domain.extend(session_filter);

        let query = Query::new(domain).order(Order::asc("training_start_date"));
        let template = vec!["template".to_owned()];
        let sessions = self.erp.search_read(PRODUCT_MODEL, &query, &template, &self.ctx).await?;

        let mut ids: Vec<i64> = Vec::new();
        for session in &sessions {
            if let Some(id) = session.many2one("template")
                && !ids.contains(&id)
            {
                ids.push(id);
            }
        }
        debug!(sessions = sessions.len(), templates = ids.len(), "Sessions grouped");
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut templates = self
            .erp
            .read(TEMPLATE_MODEL, &ids, &self.config.catalog.template_fields, &self.ctx)
            .await?;
        self.expand_sessions(&mut templates).await?;
        Ok(templates)
    }

    /// Trainings whose next sessions start today or later; `filter` holds template clauses.
    pub async fn upcoming(&self, filter: &Domain) -> Result<Vec<Record>, ErpError> {
        let today = self.erp.today(&self.ctx).await?;
        let mut sessions = Domain::new().with("training_start_date", Operator::Ge, codec::date(today));
        sessions.extend(filter.prefixed("template"));
        self.by_sessions(sessions).await
    }

    /// Trainings with a session starting on `date`.
    pub async fn on_date(&self, date: NaiveDate) -> Result<Vec<Record>, ErpError> {
        self.by_sessions(Domain::new().with("training_start_date", Operator::Eq, codec::date(date)))
            .await
    }

    /// Total count and one page of templates matching `domain`, ordered by name.
    #[instrument(skip(self, domain))]
    pub async fn page(
        &self,
        domain: Domain,
        offset: u64,
        limit: u32,
    ) -> Result<(u64, Vec<Record>), ErpError> {
        let total = self.erp.search_count(TEMPLATE_MODEL, &Query::new(domain.clone()), &self.ctx).await?;
        let query =
            Query::new(domain).offset(offset).limit(u64::from(limit)).order(Order::asc("name"));
        let mut templates = self
            .erp
            .search_read(TEMPLATE_MODEL, &query, &self.config.catalog.template_fields, &self.ctx)
            .await?;
        self.expand_sessions(&mut templates).await?;
        Ok((total, templates))
    }

    /// Available templates among `ids`, kept in the order of `ids`.
    pub async fn by_ids(&self, ids: &[i64]) -> Result<Vec<Record>, ErpError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let domain = self.base_domain().with("id", Operator::In, ids.to_vec());
        let mut rows = self
            .erp
            .search_read(TEMPLATE_MODEL, &Query::new(domain), &self.config.catalog.template_fields, &self.ctx)
            .await?;

        let mut ordered = Vec::with_capacity(rows.len());
        for id in ids {
            if let Some(position) = rows.iter().position(|row| row.id() == Some(*id)) {
                ordered.push(rows.swap_remove(position));
            }
        }
        self.expand_sessions(&mut ordered).await?;
        Ok(ordered)
    }

    /// Detail lookup: by slug first, then by variant code.
    #[instrument(skip(self))]
    pub async fn by_slug(&self, slug: &str) -> Result<Option<Record>, ErpError> {
        let published = Domain::new()
            .with("esale_available", Operator::Eq, true)
            .with("esale_active", Operator::Eq, true)
            .with("esale_saleshops", Operator::In, self.config.website.shops.clone());

        let by_slug = Query::new(published.clone().with("esale_slug", Operator::Eq, slug)).limit(1);
        let mut found = self.erp.search(TEMPLATE_MODEL, &by_slug, &self.ctx).await?;

        if found.is_empty() {
            let mut by_code = published.prefixed("template");
            by_code.push(Clause::new("code", Operator::Eq, slug));
            let template = vec!["template".to_owned()];
            let variants = self
                .erp
                .search_read(PRODUCT_MODEL, &Query::new(by_code).limit(1), &template, &self.ctx)
                .await?;
            found = variants.iter().filter_map(|v| v.many2one("template")).collect();
            debug!(%slug, found = found.len(), "Looked up product code");
        }

        let Some(&id) = found.first() else {
            return Ok(None);
        };
        let mut templates = self
            .erp
            .read(TEMPLATE_MODEL, &[id], &self.config.catalog.template_fields, &self.ctx)
            .await?;
        self.expand_sessions(&mut templates).await?;
        Ok(templates.pop())
    }

    /// Every available training, for indexing.
    pub async fn all(&self) -> Result<Vec<Record>, ErpError> {
        let query = Query::new(self.base_domain()).order(Order::asc("name"));
        self.erp.search_read(TEMPLATE_MODEL, &query, &self.config.catalog.template_fields, &self.ctx).await
    }

    /// Replaces each template's session ids by the session records, reading all
    /// sessions in one call.
    async fn expand_sessions(&self, templates: &mut [Record]) -> Result<(), ErpError> {
        let mut ids: Vec<i64> = templates.iter().flat_map(|t| t.ids(SESSIONS_FIELD)).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(());
        }

        let sessions =
            self.erp.read(PRODUCT_MODEL, &ids, &self.config.catalog.product_fields, &self.ctx).await?;

        for template in templates.iter_mut() {
            let expanded: Vec<Value> = template
                .ids(SESSIONS_FIELD)
                .into_iter()
                .filter_map(|id| sessions.iter().find(|s| s.id() == Some(id)))
                .map(|s| s.clone().into_value())
                .collect();
            template.insert(SESSIONS_FIELD, expanded);
        }
        Ok(())
    }
}

/// Index entry of a template: title from `name`, content from the short
/// description and meta keywords.
#[must_use]
pub fn search_document(record: &Record) -> Option<TrainingDocument> {
    let id = u64::try_from(record.id()?).ok()?;
    let content = ["esale_shortdescription", "esale_metakeyword"]
        .iter()
        .filter_map(|field| record.str(field))
        .collect::<Vec<_>>()
        .join("\n");

    Some(TrainingDocument {
        id,
        slug: record.str("esale_slug").unwrap_or_default().to_owned(),
        title: record.str("name").unwrap_or_default().to_owned(),
        content,
    })
}
