//! ledgerly-core: Shared infrastructure for the ledgerly service.
pub mod config;
pub mod error;
pub mod observability;
pub mod utils;
