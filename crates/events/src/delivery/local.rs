//! Local status indicator and popups.
//!
//! [`StatusIndicator`] is the persistent text/icon a tray or status bar
//! would render; [`PopupPresenter`] shows a transient popup. Rendering is
//! outside this crate: the shipped [`LogPresenter`] writes popups to the
//! log, and a UI front end plugs in its own presenter and reads the
//! indicator.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use thermwatch_core::alert::{format_degrees, NotificationEvent, STARTUP_BANNER};
use thermwatch_core::reading::Reading;

use crate::sink::{NotificationSink, SinkError};

const STATUS_PREFIX: &str = "GPU temperature monitor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Normal,
    Warning,
}

/// What the indicator currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub text: String,
    pub icon: StatusIcon,
}

/// Shared, persistent status indicator.
#[derive(Debug)]
pub struct StatusIndicator {
    inner: RwLock<StatusSnapshot>,
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StatusSnapshot {
                text: STATUS_PREFIX.to_string(),
                icon: StatusIcon::Normal,
            }),
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .text = text.into();
    }

    pub fn set_icon(&self, icon: StatusIcon) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .icon = icon;
    }
}

/// A transient popup with a title and body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

impl Popup {
    pub fn for_event(event: &NotificationEvent) -> Self {
        Self {
            title: event.title().to_string(),
            lines: event.body_lines(),
        }
    }
}

/// Shows popups. Implementations must be cheap and non-blocking.
pub trait PopupPresenter: Send + Sync {
    fn show(&self, popup: &Popup) -> Result<(), SinkError>;
}

/// Presenter that writes popups to the log.
#[derive(Debug, Default)]
pub struct LogPresenter;

impl PopupPresenter for LogPresenter {
    fn show(&self, popup: &Popup) -> Result<(), SinkError> {
        tracing::info!(title = %popup.title, body = %popup.lines.join(" / "), "Popup");
        Ok(())
    }
}

/// Updates the status indicator and shows a popup per event.
pub struct LocalAlertSink {
    indicator: Arc<StatusIndicator>,
    presenter: Arc<dyn PopupPresenter>,
}

impl LocalAlertSink {
    pub fn new(indicator: Arc<StatusIndicator>, presenter: Arc<dyn PopupPresenter>) -> Self {
        Self {
            indicator,
            presenter,
        }
    }

    pub fn indicator(&self) -> &Arc<StatusIndicator> {
        &self.indicator
    }
}

#[async_trait]
impl NotificationSink for LocalAlertSink {
    fn name(&self) -> &'static str {
        "local_ui"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        let icon = if event.is_alert() {
            StatusIcon::Warning
        } else {
            StatusIcon::Normal
        };
        self.indicator.set_icon(icon);
        self.presenter.show(&Popup::for_event(event))
    }

    async fn announce_startup(&self) -> Result<(), SinkError> {
        self.presenter.show(&Popup {
            title: STARTUP_BANNER.to_string(),
            lines: Vec::new(),
        })
    }

    fn observe(&self, reading: &Reading) {
        let shown = reading
            .value()
            .map(format_degrees)
            .unwrap_or_else(|| "unavailable".to_string());
        self.indicator.set_text(format!("{STATUS_PREFIX}: {shown}"));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    struct Capture {
        shown: Mutex<Vec<Popup>>,
    }

    impl PopupPresenter for Capture {
        fn show(&self, popup: &Popup) -> Result<(), SinkError> {
            self.shown.lock().unwrap().push(popup.clone());
            Ok(())
        }
    }

    fn sink() -> (LocalAlertSink, Arc<Capture>) {
        let capture = Arc::new(Capture::default());
        let sink = LocalAlertSink::new(Arc::new(StatusIndicator::new()), capture.clone());
        (sink, capture)
    }

    #[tokio::test]
    async fn alert_sets_warning_icon_and_pops_up() {
        let (sink, capture) = sink();
        sink.notify(&NotificationEvent::EnteredAlert(84.0)).await.unwrap();

        assert_eq!(sink.indicator().snapshot().icon, StatusIcon::Warning);
        let shown = capture.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "GPU temperature warning!");
        assert_eq!(shown[0].lines[1], "84℃");
    }

    #[tokio::test]
    async fn clear_restores_normal_icon() {
        let (sink, _capture) = sink();
        sink.notify(&NotificationEvent::EnteredAlert(84.0)).await.unwrap();
        sink.notify(&NotificationEvent::ClearedAlert(70.0)).await.unwrap();
        assert_eq!(sink.indicator().snapshot().icon, StatusIcon::Normal);
    }

    #[test]
    fn observe_updates_status_text() {
        let (sink, _capture) = sink();
        sink.observe(&Reading::new(66.5, Utc::now()));
        assert_eq!(
            sink.indicator().snapshot().text,
            "GPU temperature monitor: 66.5℃"
        );

        sink.observe(&Reading::unavailable(Utc::now()));
        assert_eq!(
            sink.indicator().snapshot().text,
            "GPU temperature monitor: unavailable"
        );
    }

    #[tokio::test]
    async fn startup_shows_banner() {
        let (sink, capture) = sink();
        sink.announce_startup().await.unwrap();
        assert_eq!(capture.shown.lock().unwrap()[0].title, STARTUP_BANNER);
    }

    #[test]
    fn log_presenter_never_fails() {
        let popup = Popup::for_event(&NotificationEvent::ClearedAlert(50.0));
        assert!(LogPresenter.show(&popup).is_ok());
    }
}
