//! Domain logic for the thermwatch temperature monitor.
//!
//! Everything in this crate is free of hardware and network access so it
//! can be tested in isolation:
//!
//! - [`config`] -- the static setting file loaded once at startup.
//! - [`reading`] -- one sampled sensor value, or its absence.
//! - [`alert`] -- notification events, severities and message templates.
//! - [`monitor`] -- the threshold state machine.

pub mod alert;
pub mod config;
pub mod error;
pub mod monitor;
pub mod reading;
pub mod types;
