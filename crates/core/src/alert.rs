//! Notification events emitted by the threshold state machine.
//!
//! Besides the event type itself this module owns the human-readable
//! templates shared by every sink, so the popup, the audit entry and the
//! remote push all describe an event the same way.

use serde::Serialize;

/// Popup title shown once when the monitor starts.
pub const STARTUP_BANNER: &str = "GPU temperature monitoring started";

const ALERT_TITLE: &str = "GPU temperature warning!";
const ALERT_TEXT: &str = "GPU temperature is above the threshold!";
const CLEARED_TITLE: &str = "GPU temperature back to normal";
const CLEARED_TEXT: &str = "GPU temperature dropped to or below the threshold.";

/// A state transition worth telling someone about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotificationEvent {
    /// The reading crossed above the threshold.
    EnteredAlert(f64),
    /// The reading is still above the threshold and the repeat interval elapsed.
    RepeatedAlert(f64),
    /// The reading fell back to or below the threshold.
    ClearedAlert(f64),
}

/// Severity recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Informational,
}

/// Opaque event-subtype pair written to the audit log.
///
/// `(0,0)` entered, `(0,1)` repeated, `(1,0)` cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuditCode {
    pub category: u16,
    pub event_id: u16,
}

impl NotificationEvent {
    /// The reading that triggered the event.
    pub fn value(&self) -> f64 {
        match *self {
            Self::EnteredAlert(v) | Self::RepeatedAlert(v) | Self::ClearedAlert(v) => v,
        }
    }

    /// `true` for entered and repeated alerts.
    pub fn is_alert(&self) -> bool {
        !matches!(self, Self::ClearedAlert(_))
    }

    /// Stable snake_case name for logs and serialized records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EnteredAlert(_) => "entered_alert",
            Self::RepeatedAlert(_) => "repeated_alert",
            Self::ClearedAlert(_) => "cleared_alert",
        }
    }

    pub fn severity(&self) -> Severity {
        if self.is_alert() {
            Severity::Warning
        } else {
            Severity::Informational
        }
    }

    pub fn audit_code(&self) -> AuditCode {
        let (category, event_id) = match self {
            Self::EnteredAlert(_) => (0, 0),
            Self::RepeatedAlert(_) => (0, 1),
            Self::ClearedAlert(_) => (1, 0),
        };
        AuditCode { category, event_id }
    }

    /// Popup title.
    pub fn title(&self) -> &'static str {
        if self.is_alert() {
            ALERT_TITLE
        } else {
            CLEARED_TITLE
        }
    }

    /// Popup body lines: a sentence and the formatted reading.
    pub fn body_lines(&self) -> Vec<String> {
        let text = if self.is_alert() {
            ALERT_TEXT
        } else {
            CLEARED_TEXT
        };
        vec![text.to_string(), format_degrees(self.value())]
    }

    /// Multi-line message used for the audit log and remote push.
    pub fn message(&self) -> String {
        let heading = if self.is_alert() { "Warning" } else { CLEARED_TITLE };
        let mut lines = vec![heading.to_string()];
        lines.extend(self.body_lines());
        lines.join("\n")
    }
}

/// Render a temperature the way every sink displays it, e.g. `80.5℃`.
pub fn format_degrees(value: f64) -> String {
    format!("{value}℃")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_event_kind() {
        assert_eq!(NotificationEvent::EnteredAlert(81.0).severity(), Severity::Warning);
        assert_eq!(NotificationEvent::RepeatedAlert(81.0).severity(), Severity::Warning);
        assert_eq!(
            NotificationEvent::ClearedAlert(70.0).severity(),
            Severity::Informational
        );
    }

    #[test]
    fn audit_codes_match_legacy_pairs() {
        let code = |e: NotificationEvent| {
            let c = e.audit_code();
            (c.category, c.event_id)
        };
        assert_eq!(code(NotificationEvent::EnteredAlert(1.0)), (0, 0));
        assert_eq!(code(NotificationEvent::RepeatedAlert(1.0)), (0, 1));
        assert_eq!(code(NotificationEvent::ClearedAlert(1.0)), (1, 0));
    }

    #[test]
    fn messages_include_the_reading() {
        let alert = NotificationEvent::EnteredAlert(82.5).message();
        assert_eq!(
            alert,
            "Warning\nGPU temperature is above the threshold!\n82.5℃"
        );

        let cleared = NotificationEvent::ClearedAlert(74.0).message();
        assert!(cleared.starts_with(CLEARED_TITLE));
        assert!(cleared.ends_with("74℃"));
    }

    #[test]
    fn repeated_alert_uses_alert_template() {
        let e = NotificationEvent::RepeatedAlert(90.0);
        assert_eq!(e.title(), ALERT_TITLE);
        assert_eq!(e.body_lines()[1], "90℃");
        assert_eq!(e.kind(), "repeated_alert");
    }
}
