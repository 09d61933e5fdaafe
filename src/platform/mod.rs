//! Platform abstraction layer.
//!
//! Provides consistent interfaces for:
//! - HTTP requests against the services under test
//! - External process execution (security scanners)
//! - Reading text artifacts from the working tree

pub mod fs;
pub mod http;
pub mod process;
