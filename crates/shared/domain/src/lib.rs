//! # Catalog domain
//!
//! Plain data shared by every campus crate: configuration sections, ORM model and
//! field names, pagination math, breadcrumbs and the feature slice registry.
//! No I/O, networking or framework types live here.

pub mod breadcrumb;
pub mod config;
pub mod constants;
pub mod pagination;
pub mod registry;
