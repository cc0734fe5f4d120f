//! Raya API Library
//!
//! Custom domain verification and host-based tenant resolution for the Raya
//! platform.

pub mod cache;
pub mod config;
pub mod dns;
pub mod domains;
pub mod error;
pub mod routes;
pub mod routing;
pub mod state;
pub mod tenants;

pub use config::Config;
pub use error::ApiError;
pub use routing::{TenantContext, TenantResolver, TenantSource};
pub use state::AppState;
