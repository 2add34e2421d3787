use serde::Serialize;

/// One step of the navigation trail; `slug` is the already-built URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub slug: String,
    pub name: String,
}

impl Breadcrumb {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self { slug: slug.into(), name: name.into() }
    }
}
