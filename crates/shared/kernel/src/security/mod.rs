//! Guards for request input that reaches the filesystem or the ORM.

mod filter;
mod template;

pub use filter::FilterGuard;
pub use template::TemplateGuard;
