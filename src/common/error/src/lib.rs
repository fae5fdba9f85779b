//! Error types and result aliases for veld.
//!
//! This module provides the core error handling infrastructure shared by
//! every crate in the workspace.

#![forbid(unsafe_code)]

mod error;

pub use error::{GenericError, VeldError, VeldResult};
