//! Facade crate for the campus catalog.
//! Re-exports domain/kernel primitives and the infrastructure clients, and aggregates
//! feature initialization. Keep this crate thin: it composes other crates.
//!
//! ## Usage
//! - Add `campus` with the `server` feature.
//! - Call `campus::init` to build the feature slices, then register them in the API state.

pub use campus_domain as domain;
#[cfg(feature = "server")]
use campus_domain::config::ApiConfig;
pub use campus_erp as erp;
pub use campus_kernel as kernel;
pub use campus_search as search;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use campus_kernel::server::router::system_router;
    }

    pub use campus_kernel::server::session::session_middleware;
}

/// Feature registry for runtime introspection.
pub mod features {
    #[cfg(feature = "server")]
    pub use campus_training as training;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        #[cfg(feature = "server")]
        "training",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features for server mode.
///
/// # Errors
/// Returns an error if any feature initialization fails.
#[cfg(feature = "server")]
pub fn init(config: &ApiConfig) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let slices = vec![features::training::init(config)?];
    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_build_enables_training() {
        assert_eq!(features::is_enabled("training"), cfg!(feature = "server"));
        assert!(!features::is_enabled("licensing"));
    }

    #[cfg(feature = "server")]
    #[test]
    fn init_registers_the_training_slice() {
        let dir = std::env::temp_dir().join("campus-facade-no-index");
        let mut config = ApiConfig::default();
        config.search.index_dir = dir;

        let slices = init(&config).unwrap();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].name, "Training");
    }
}
