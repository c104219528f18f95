//! feedcache library
//!
//! Remote feed loading, the local feed cache and the CLI configuration, exposed
//! for the binary and for integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod error;

pub use error::{Error, Result};
