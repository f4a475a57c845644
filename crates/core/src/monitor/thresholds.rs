//! Threshold state machine with repeat-notify debounce.
//!
//! Pure logic -- no sensor or sink access. The caller owns the
//! [`MonitorState`], passes it in with each valid reading, and stores the
//! returned state before acting on the event.

use std::time::Duration;

use crate::alert::NotificationEvent;
use crate::types::Timestamp;

/// The part of the configuration the state machine reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    /// Readings strictly above this value are in alert.
    pub threshold: f64,
    /// Minimum spacing between alert notifications while the alert persists.
    pub repeat_notify_interval: Duration,
}

/// Whether the previous reading was over the threshold.
///
/// The last notification time only exists in the `Alert` variant, so it
/// cannot be consulted after the alert has cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonitorState {
    #[default]
    Normal,
    Alert {
        /// When the most recent entered/repeated notification was emitted.
        last_notified_at: Timestamp,
    },
}

impl MonitorState {
    pub fn is_over_threshold(&self) -> bool {
        matches!(self, Self::Alert { .. })
    }

    pub fn last_alert_notify_time(&self) -> Option<Timestamp> {
        match self {
            Self::Normal => None,
            Self::Alert { last_notified_at } => Some(*last_notified_at),
        }
    }
}

/// Outcome of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub state: MonitorState,
    pub event: Option<NotificationEvent>,
}

/// Evaluate one valid reading against the threshold.
///
/// A value equal to the threshold is normal. While in alert, a repeat is
/// emitted once `repeat_notify_interval` has elapsed since the last
/// notification; a clock that went backwards never triggers one.
pub fn evaluate(
    value: f64,
    state: MonitorState,
    config: &ThresholdConfig,
    now: Timestamp,
) -> Evaluation {
    let over = value > config.threshold;

    match (state, over) {
        (MonitorState::Normal, false) => Evaluation { state, event: None },
        (MonitorState::Normal, true) => Evaluation {
            state: MonitorState::Alert {
                last_notified_at: now,
            },
            event: Some(NotificationEvent::EnteredAlert(value)),
        },
        (MonitorState::Alert { .. }, false) => Evaluation {
            state: MonitorState::Normal,
            event: Some(NotificationEvent::ClearedAlert(value)),
        },
        (MonitorState::Alert { last_notified_at }, true) => {
            if repeat_due(last_notified_at, now, config.repeat_notify_interval) {
                Evaluation {
                    state: MonitorState::Alert {
                        last_notified_at: now,
                    },
                    event: Some(NotificationEvent::RepeatedAlert(value)),
                }
            } else {
                Evaluation { state, event: None }
            }
        }
    }
}

fn repeat_due(last: Timestamp, now: Timestamp, interval: Duration) -> bool {
    // Negative elapsed time fails the conversion.
    match now.signed_duration_since(last).to_std() {
        Ok(elapsed) => elapsed >= interval,
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn config(threshold: f64, repeat_secs: u64) -> ThresholdConfig {
        ThresholdConfig {
            threshold,
            repeat_notify_interval: Duration::from_secs(repeat_secs),
        }
    }

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    /// Run `values` one tick apart and collect the emitted events.
    fn run(
        cfg: &ThresholdConfig,
        values: &[f64],
        step_secs: i64,
    ) -> Vec<Option<NotificationEvent>> {
        let mut state = MonitorState::Normal;
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let out = evaluate(*v, state, cfg, at(i as i64 * step_secs));
                state = out.state;
                out.event
            })
            .collect()
    }

    #[test]
    fn normal_stays_normal_without_event() {
        let out = evaluate(70.0, MonitorState::Normal, &config(80.0, 60), at(0));
        assert_eq!(out.state, MonitorState::Normal);
        assert!(out.event.is_none());
    }

    #[test]
    fn crossing_above_enters_alert() {
        let events = run(&config(80.0, 60), &[79.0, 81.0], 5);
        assert_eq!(events[0], None);
        assert_eq!(events[1], Some(NotificationEvent::EnteredAlert(81.0)));
    }

    #[test]
    fn entering_alert_records_notify_time() {
        let out = evaluate(81.0, MonitorState::Normal, &config(80.0, 60), at(42));
        assert!(out.state.is_over_threshold());
        assert_eq!(out.state.last_alert_notify_time(), Some(at(42)));
    }

    #[test]
    fn value_equal_to_threshold_is_normal() {
        let cfg = config(80.0, 60);
        let out = evaluate(80.0, MonitorState::Normal, &cfg, at(0));
        assert_eq!(out.event, None);
        assert!(!out.state.is_over_threshold());

        let alert = MonitorState::Alert {
            last_notified_at: at(0),
        };
        let out = evaluate(80.0, alert, &cfg, at(1));
        assert_eq!(out.event, Some(NotificationEvent::ClearedAlert(80.0)));
    }

    #[test]
    fn value_just_above_threshold_alerts() {
        let cfg = config(80.0, 60);
        let value = 80.0 + 1e-9;
        let out = evaluate(value, MonitorState::Normal, &cfg, at(0));
        assert_eq!(out.event, Some(NotificationEvent::EnteredAlert(value)));
    }

    #[test]
    fn repeat_fires_once_per_interval_regardless_of_poll_rate() {
        // 5s polls for 3 minutes, continuously hot.
        let values = vec![85.0; 37];
        let events = run(&config(80.0, 60), &values, 5);

        let entered = events
            .iter()
            .filter(|e| matches!(e, Some(NotificationEvent::EnteredAlert(_))))
            .count();
        let repeats: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Some(NotificationEvent::RepeatedAlert(_))))
            .map(|(i, _)| i)
            .collect();

        assert_eq!(entered, 1);
        // Ticks 12, 24, 36 are exactly 60s, 120s, 180s after entry.
        assert_eq!(repeats, vec![12, 24, 36]);
    }

    #[test]
    fn repeat_timer_resets_on_repeat_not_on_tick() {
        let cfg = config(80.0, 60);
        let state = MonitorState::Alert {
            last_notified_at: at(0),
        };

        let out = evaluate(90.0, state, &cfg, at(59));
        assert_eq!(out.event, None);
        assert_eq!(out.state, state);

        let out = evaluate(90.0, out.state, &cfg, at(60));
        assert_eq!(out.event, Some(NotificationEvent::RepeatedAlert(90.0)));
        assert_eq!(out.state.last_alert_notify_time(), Some(at(60)));

        let out = evaluate(90.0, out.state, &cfg, at(119));
        assert_eq!(out.event, None);
    }

    #[test]
    fn clearing_emits_once_then_silence() {
        let events = run(&config(80.0, 60), &[85.0, 79.0, 78.0], 5);
        assert_eq!(events[1], Some(NotificationEvent::ClearedAlert(79.0)));
        assert_eq!(events[2], None);
    }

    #[test]
    fn cleared_state_forgets_notify_time() {
        let alert = MonitorState::Alert {
            last_notified_at: at(0),
        };
        let out = evaluate(10.0, alert, &config(80.0, 60), at(5));
        assert_matches!(out.state, MonitorState::Normal);
        assert_eq!(out.state.last_alert_notify_time(), None);
    }

    #[test]
    fn steady_alert_within_interval_is_silent() {
        let values = vec![90.0; 11];
        let events = run(&config(80.0, 60), &values, 5);
        assert!(events[0].is_some());
        assert!(events[1..].iter().all(Option::is_none));
    }

    #[test]
    fn backwards_clock_never_repeats() {
        let state = MonitorState::Alert {
            last_notified_at: at(100),
        };
        let out = evaluate(95.0, state, &config(80.0, 0), at(40));
        assert_eq!(out.event, None);
        assert_eq!(out.state, state);
    }

    #[test]
    fn end_to_end_sequence() {
        let events = run(
            &config(75.0, 30),
            &[70.0, 70.0, 80.0, 82.0, 81.0, 74.0, 74.0],
            1,
        );
        assert_eq!(
            events,
            vec![
                None,
                None,
                Some(NotificationEvent::EnteredAlert(80.0)),
                None,
                None,
                Some(NotificationEvent::ClearedAlert(74.0)),
                None,
            ]
        );
    }
}
