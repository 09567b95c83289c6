//! fracta-common: Shared error type and text helpers used across all Fracta crates.

pub mod error;
pub mod text;

pub use error::{FractaError, Result};
