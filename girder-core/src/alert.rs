//! System alerts shown in the alert history card.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(Uuid);

impl AlertId {
    /// Create a new unique alert ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Something failed.
    Error,
    /// Something needs attention.
    Warning,
    /// An operation completed.
    Success,
}

/// One entry in the alert history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique id.
    pub id: AlertId,
    /// Severity.
    #[serde(rename = "type")]
    pub level: AlertLevel,
    /// Human-readable message.
    pub message: String,
    /// Optional wall-clock label, e.g. `"10:24:38"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Alert {
    /// Create an alert without a timestamp.
    #[must_use]
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            id: AlertId::new(),
            level,
            message: message.into(),
            timestamp: None,
        }
    }

    /// Attach a timestamp label.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Which alerts the history card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertFilter {
    /// Every alert.
    #[default]
    All,
    /// Only alerts of one level.
    Level(AlertLevel),
}

impl AlertFilter {
    /// Whether the alert passes the filter.
    #[must_use]
    pub fn matches(self, alert: &Alert) -> bool {
        match self {
            Self::All => true,
            Self::Level(level) => alert.level == level,
        }
    }
}

/// Newest-first alert list. Alerts are only ever prepended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertHistory {
    alerts: Vec<Alert>,
}

impl AlertHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an alert at the front of the history.
    pub fn prepend(&mut self, alert: Alert) {
        tracing::info!("Alert [{:?}] {}", alert.level, alert.message);
        self.alerts.insert(0, alert);
    }

    /// All alerts, newest first.
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Alerts passing the filter, newest first.
    pub fn filtered(&self, filter: AlertFilter) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(move |a| filter.matches(a))
    }

    /// The most recent alert.
    #[must_use]
    pub fn latest(&self) -> Option<&Alert> {
        self.alerts.first()
    }

    /// Number of alerts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether there are no alerts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_keeps_newest_first() {
        let mut history = AlertHistory::new();
        history.prepend(Alert::new(AlertLevel::Warning, "first"));
        history.prepend(Alert::new(AlertLevel::Success, "second"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().map(|a| a.message.as_str()), Some("second"));
        assert_eq!(history.alerts()[1].message, "first");
    }

    #[test]
    fn test_filter_by_level() {
        let mut history = AlertHistory::new();
        history.prepend(Alert::new(AlertLevel::Error, "Emergency stop activated"));
        history.prepend(Alert::new(AlertLevel::Success, "Vision system online"));
        history.prepend(Alert::new(AlertLevel::Error, "Adhesive nozzle blocked"));

        assert_eq!(history.filtered(AlertFilter::All).count(), 3);
        let errors: Vec<_> = history
            .filtered(AlertFilter::Level(AlertLevel::Error))
            .map(|a| a.message.as_str())
            .collect();
        assert_eq!(errors, ["Adhesive nozzle blocked", "Emergency stop activated"]);
        assert_eq!(
            history
                .filtered(AlertFilter::Level(AlertLevel::Warning))
                .count(),
            0
        );
    }

    #[test]
    fn test_alert_ids_are_unique() {
        let a = Alert::new(AlertLevel::Success, "x");
        let b = Alert::new(AlertLevel::Success, "x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_alert_json_shape() {
        let alert = Alert::new(AlertLevel::Warning, "Temperature above threshold")
            .with_timestamp("09:15:22");
        let value = serde_json::to_value(&alert).expect("serialize");
        assert_eq!(value["type"], "warning");
        assert_eq!(value["timestamp"], "09:15:22");

        let bare = serde_json::to_value(Alert::new(AlertLevel::Success, "done"))
            .expect("serialize");
        assert!(bare.get("timestamp").is_none());
    }
}
