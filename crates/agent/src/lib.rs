//! `thermwatch-agent` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod poller;
pub mod sensor;
pub mod setup;
