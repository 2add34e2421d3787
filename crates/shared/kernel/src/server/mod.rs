pub mod health;
pub mod router;
pub mod session;
pub mod state;

pub use router::system_router;
