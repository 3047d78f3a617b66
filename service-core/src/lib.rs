//! service-core: Shared infrastructure for the robots services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
