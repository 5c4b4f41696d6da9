//! # stockmark-core
//!
//! Core types, traits, and abstractions for the stockmark service.
//!
//! This crate provides the domain models (stocks and tags), the error
//! taxonomy, and the repository traits that the database and API crates
//! build on.

pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result};
pub use models::*;
pub use traits::*;
