// src/lib.rs

// module declarations
pub mod access;
pub mod config;
pub mod errors;
pub mod fs;
pub mod listing;
pub mod range;
pub mod recover;
pub mod server;
pub mod static_server;

// re-exports
pub use access::{Forbidden, GuardedFile, GuardedFs, ShimMetadata};
pub use config::*;
pub use errors::*;
pub use recover::recover_forbidden;
pub use server::{binding_router, file_router, run, serve_binding, serve_listener};
pub use static_server::*;
