//! Common imports for feature slices.

pub use crate::i18n::Translator;
pub use crate::safe_nanoid;
pub use crate::security::{FilterGuard, TemplateGuard};
#[cfg(feature = "server")]
pub use crate::server::{
    session::{Session, SessionStore},
    state::{ApiState, ApiStateError},
};
pub use campus_domain::breadcrumb::Breadcrumb;
pub use campus_domain::config::ApiConfig;
pub use campus_domain::constants::*;
pub use campus_domain::pagination::{DISPLAY_MSG, Pagination, PaginationView};
pub use campus_erp::{Domain, Erp, ErpContext, ErpError, Operator, Order, Query, Record};
