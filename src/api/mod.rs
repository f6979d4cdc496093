//! HTTP API for document generation.
//!
//! Routes are nested under `/api/`. Handlers resolve everything through
//! [`ApiContext`]; the environment is read once at startup.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::docgen_router;
pub use server::{start_server, DocGenServer};
pub use types::ApiContext;
