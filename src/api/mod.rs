//! API Module
//!
//! Plain function calls for a presentation layer (dashboard, CLI, HTTP
//! wrapper). Everything returned is serializable structured data; nothing here
//! renders.
//!
//! Structure:
//! - commands.rs: Current stable API implementation
//! - engine_status.rs: Status DTOs

pub mod commands;
pub mod engine_status;

// Re-export current version as default
pub use commands::*;
