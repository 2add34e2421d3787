use std::path::{Path, PathBuf};
use tracing::debug;

/// `[A-Za-z0-9_-]+`
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Resolves visitor-chosen template names inside a fixed directory.
#[derive(Debug, Clone)]
pub struct TemplateGuard {
    directory: PathBuf,
}

impl TemplateGuard {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `requested` when it is a plain name and `<directory>/<requested>.html` exists,
    /// `fallback` otherwise.
    #[must_use]
    pub fn resolve<'a>(&self, requested: Option<&'a str>, fallback: &'a str) -> &'a str {
        let Some(name) = requested.map(str::trim).filter(|n| !n.is_empty()) else {
            return fallback;
        };
        if !is_plain_name(name) {
            debug!(%name, "Rejected template name");
            return fallback;
        }
        if self.directory.join(format!("{name}.html")).is_file() { name } else { fallback }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_templates_are_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("training-wide.html"), "").unwrap();
        let guard = TemplateGuard::new(tmp.path());

        assert_eq!(guard.resolve(Some("training-wide"), "training"), "training-wide");
        assert_eq!(guard.resolve(Some("missing"), "training"), "training");
        assert_eq!(guard.resolve(None, "training"), "training");
    }

    #[test]
    fn path_traversal_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("inner");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(tmp.path().join("secret.html"), "").unwrap();
        let guard = TemplateGuard::new(&nested);

        assert_eq!(guard.resolve(Some("../secret"), "training"), "training");
        assert_eq!(guard.resolve(Some("a/b"), "training"), "training");
        assert_eq!(guard.resolve(Some("x.html"), "training"), "training");
    }
}
