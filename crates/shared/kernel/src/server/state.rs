use crate::i18n::Translator;
use crate::server::session::SessionStore;
use axum::extract::FromRef;
use campus_domain::config::ApiConfig;
use campus_domain::registry::{FeatureSlice, InitializedSlice};
use campus_erp::Erp;
use fxhash::FxHashMap;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[campus_derive::campus_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub erp: Erp,
    pub translator: Translator,
    pub sessions: SessionStore,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner
            .slices
            .get(&TypeId::of::<T>())
            .and_then(|initialized| initialized.state.as_any().downcast_ref::<T>())
    }

    /// Returns a reference to the slice if it is registered.
    ///
    /// # Errors
    /// Returns an error if the slice is not registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Registered slice names (for diagnostics).
    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.slices.values().map(|slice| slice.name)
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for Erp {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.erp.clone()
    }
}

impl FromRef<ApiState> for Translator {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.translator.clone()
    }
}

impl FromRef<ApiState> for SessionStore {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.sessions.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    erp: Option<Erp>,
    translator: Option<Translator>,
    sessions: Option<SessionStore>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn erp(mut self, erp: Erp) -> Self {
        self.erp = Some(erp);
        self
    }

    /// Defaults to the catalogs of the config's `i18n` section.
    #[must_use]
    pub fn translator(mut self, translator: Translator) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Defaults to a store built from the config's `session` section.
    #[must_use]
    pub fn sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = Some(sessions);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    /// Registers multiple slices at once.
    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        for slice in slices {
            self.slices.insert(slice.id, slice);
        }
        self
    }

    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let erp = self.erp.ok_or_else(|| ApiStateError::Validation {
            message: "ERP client not provided".into(),
            context: None,
        })?;
        let translator = self.translator.unwrap_or_else(|| Translator::new(&config.i18n));
        let sessions = self.sessions.unwrap_or_else(|| SessionStore::new(&config.session));

        Ok(ApiState {
            inner: Arc::new(ApiStateInner { config, erp, translator, sessions, slices: self.slices }),
        })
    }
}
