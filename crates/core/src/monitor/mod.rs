//! Temperature monitoring domain logic.
//!
//! Contains the threshold state machine and related types. All logic in
//! this module is pure (no I/O) so the poller can own the state and the
//! transitions can be tested in isolation.

pub mod thresholds;

pub use thresholds::{evaluate, Evaluation, MonitorState, ThresholdConfig};
