//! Common types shared across the cblite crates.
//!
//! This module provides the error taxonomy and the validated identity types
//! used when addressing databases and documents on the server.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{DatabaseName, DocumentId};
