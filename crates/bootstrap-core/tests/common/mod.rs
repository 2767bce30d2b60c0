//! Shared helpers for integration tests.

pub mod file_server;
