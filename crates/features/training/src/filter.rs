//! The visitor's saved catalog filter.

use crate::error::TrainingError;
use campus_domain::constants::TRAINING_FILTER_KEY;
use campus_erp::Domain;
use campus_kernel::prelude::{FilterGuard, Session};

/// The filter saved by the last `POST /all/`, empty when none.
#[must_use]
pub(crate) fn saved(session: &Session) -> Domain {
    session.get::<Domain>(TRAINING_FILTER_KEY).unwrap_or_default()
}

/// Replaces the saved filter with the allow-listed fields of `form`.
///
/// An empty form keeps the saved filter; a form without allow-listed fields clears it.
///
/// # Errors
/// [`TrainingError::Json`] when the filter cannot be stored.
pub(crate) fn replace(session: &Session, guard: &FilterGuard, form: &[(String, String)]) -> Result<Domain, TrainingError> {
    if form.is_empty() {
        return Ok(saved(session));
    }
    let domain = guard.domain(form.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if domain.is_empty() {
        session.remove(TRAINING_FILTER_KEY);
    } else {
        session.insert(TRAINING_FILTER_KEY, &domain)?;
    }
    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_domain::config::SessionConfig;
    use campus_kernel::prelude::SessionStore;

    fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn replaced_filters_are_read_back() {
        let session = SessionStore::new(&SessionConfig::default()).load(None);
        let guard = FilterGuard::new(vec!["training_area".to_owned()]);

        let domain = replace(&session, &guard, &form(&[("training_area", "2"), ("id", "1")])).unwrap();
        assert_eq!(domain.len(), 1);
        assert_eq!(saved(&session), domain);
    }

    #[test]
    fn empty_forms_keep_the_filter() {
        let session = SessionStore::new(&SessionConfig::default()).load(None);
        let guard = FilterGuard::new(vec!["training_area".to_owned()]);

        let domain = replace(&session, &guard, &form(&[("training_area", "2")])).unwrap();
        assert_eq!(replace(&session, &guard, &[]).unwrap(), domain);
        assert_eq!(saved(&session), domain);
    }

    #[test]
    fn forms_without_allowed_fields_clear_the_filter() {
        let session = SessionStore::new(&SessionConfig::default()).load(None);
        let guard = FilterGuard::new(vec!["training_area".to_owned()]);

        replace(&session, &guard, &form(&[("training_area", "2")])).unwrap();
        assert!(replace(&session, &guard, &form(&[("id", "1")])).unwrap().is_empty());
        assert!(saved(&session).is_empty());
    }
}
