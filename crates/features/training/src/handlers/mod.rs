pub(crate) mod html;
pub(crate) mod json;

use crate::Training;
use crate::catalog::Catalog;
use crate::error::TrainingError;
use campus_kernel::prelude::{ApiState, Breadcrumb, DISPLAY_MSG, Pagination, PaginationView, Record};
use serde::Deserialize;
use utoipa::IntoParams;

/// Listing query string.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ListParams {
    /// 1-based page; anything else reads as 1
    page: Option<String>,
    /// Name substring (`/all/`) or full-text query (`/search/`)
    q: Option<String>,
}

impl ListParams {
    fn page(&self) -> u32 {
        Pagination::parse_page(self.page.as_deref())
    }

    fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Detail query string.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct DetailParams {
    /// Alternate template file name, without extension
    template: Option<String>,
    /// `json` returns the detail as JSON
    render: Option<String>,
}

/// Request-scoped view over the slice in one language.
pub(crate) struct Scope<'a> {
    pub(crate) state: &'a ApiState,
    pub(crate) training: &'a Training,
    pub(crate) lang: &'a str,
}

impl<'a> Scope<'a> {
    /// Unknown languages are not found.
    pub(crate) fn new(state: &'a ApiState, lang: &'a str) -> Result<Self, TrainingError> {
        if !state.translator.supports(lang) {
            return Err(TrainingError::not_found("language", lang.to_owned()));
        }
        let training = state.try_get_slice::<Training>()?;
        Ok(Self { state, training, lang })
    }

    pub(crate) fn catalog(&self) -> Catalog<'a> {
        Catalog::new(&self.state.erp, &self.state.config, self.lang)
    }

    pub(crate) fn gettext(&self, msgid: &'static str) -> String {
        self.state.translator.gettext(self.lang, msgid).to_owned()
    }

    pub(crate) fn crumb(&self, slug: String, msgid: &'static str) -> Breadcrumb {
        Breadcrumb::new(slug, self.gettext(msgid))
    }

    pub(crate) fn pagination(&self, page: u32, total: u64) -> PaginationView {
        let pagination = Pagination::new(page, self.state.config.catalog.limit, total);
        let info = pagination.display_message(&self.gettext(DISPLAY_MSG), &self.gettext("trainings"));
        pagination.view(info)
    }

    pub(crate) fn offset(&self, page: u32) -> u64 {
        Pagination::new(page, self.state.config.catalog.limit, 0).offset()
    }

    /// The configured website; missing means not found.
    pub(crate) async fn website(&self) -> Result<Record, TrainingError> {
        let website_id = self.state.config.website.id;
        self.catalog()
            .website()
            .await?
            .ok_or_else(|| TrainingError::not_found("website", website_id.to_string()))
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope").field("lang", &self.lang).finish_non_exhaustive()
    }
}
