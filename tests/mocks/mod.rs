//! Fakes for testing without live services or installed scanners.
//!
//! This module provides in-memory implementations of the HTTP and process
//! seams, plus an on-disk project fixture that satisfies every artifact check.

pub mod project;

pub use fakes::*;
pub use project::*;
