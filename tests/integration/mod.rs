//! Integration tests for pipecheck.
//!
//! These tests run the checks end to end against fake services, fake
//! scanners and temporary project trees.

mod cli_tests;
mod http_transport_tests;
mod scanner_tests;
