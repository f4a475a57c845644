//! Concrete notification channels.
//!
//! Each submodule provides one [`NotificationSink`](crate::NotificationSink)
//! implementation. None of them touch monitor state; they only describe an
//! already-committed transition to the outside world.

pub mod audit;
pub mod local;
pub mod push;
