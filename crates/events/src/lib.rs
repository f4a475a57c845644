//! Notification fan-out for the thermwatch monitor.
//!
//! - [`NotificationSink`] -- the narrow interface every channel implements.
//! - [`NotificationDispatcher`] -- invokes all sinks for one event, isolating
//!   failures and bounding each call with a timeout.
//! - [`delivery`] -- the concrete channels: audit log, remote push and the
//!   local status indicator with popups.

pub mod delivery;
pub mod dispatcher;
pub mod sink;

pub use delivery::audit::AuditLogSink;
pub use delivery::local::{LocalAlertSink, LogPresenter, PopupPresenter, StatusIndicator};
pub use delivery::push::RemotePushSink;
pub use dispatcher::{DispatchReport, NotificationDispatcher, SinkOutcome};
pub use sink::{NotificationSink, SinkError};
