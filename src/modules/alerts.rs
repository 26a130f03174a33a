//! Alert state: a locally-mutable copy of the external alert feed

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::core::{Action, AlertAction};
use crate::domain::{Alert, Severity};

/// Read-side severity projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeverityFilter {
    #[default]
    All,
    Only(Severity),
}

impl SeverityFilter {
    pub const CYCLE: [SeverityFilter; 4] = [
        SeverityFilter::All,
        SeverityFilter::Only(Severity::High),
        SeverityFilter::Only(Severity::Medium),
        SeverityFilter::Only(Severity::Low),
    ];

    pub fn matches(&self, alert: &Alert) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::Only(level) => alert.severity == *level,
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::CYCLE.iter().position(|f| f == self).unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }
}

impl fmt::Display for SeverityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeverityFilter::All => f.write_str("all"),
            SeverityFilter::Only(level) => write!(f, "{level}"),
        }
    }
}

impl FromStr for SeverityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(SeverityFilter::All);
        }
        s.parse::<Severity>().map(SeverityFilter::Only)
    }
}

/// Per-severity counts, derived on every read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

/// Working alert list. Only ever shrinks locally; `seed` replaces it.
#[derive(Debug, Clone, Default)]
pub struct AlertState {
    alerts: Vec<Alert>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the working list. Local dismissals against the previous
    /// seed are discarded.
    pub fn seed(&mut self, alerts: Vec<Alert>) {
        debug!(count = alerts.len(), "alert list seeded");
        self.alerts = alerts;
    }

    /// Remove exactly one alert by id; no-op when absent
    pub fn dismiss(&mut self, alert_id: &str) -> Action {
        let Some(pos) = self.alerts.iter().position(|alert| alert.id == alert_id) else {
            return Action::None;
        };
        self.alerts.remove(pos);
        Action::Alert(AlertAction::Dismiss, alert_id.to_string())
    }

    pub fn clear_all(&mut self) {
        self.alerts.clear();
    }

    pub fn filter_by_severity(&self, filter: SeverityFilter) -> Vec<&Alert> {
        self.alerts
            .iter()
            .filter(|alert| filter.matches(alert))
            .collect()
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for alert in &self.alerts {
            match alert.severity {
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn get(&self, alert_id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|alert| alert.id == alert_id)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: &str, severity: Severity) -> Alert {
        Alert {
            id: id.to_string(),
            severity,
            kind: "large_transaction".to_string(),
            title: format!("Alert {id}"),
            description: String::new(),
            timestamp: 0,
            data: None,
        }
    }

    fn seeded() -> AlertState {
        let mut state = AlertState::new();
        state.seed(vec![
            alert("a1", Severity::High),
            alert("a2", Severity::Medium),
            alert("a3", Severity::Low),
            alert("a4", Severity::High),
        ]);
        state
    }

    #[test]
    fn test_dismiss_removes_exactly_one() {
        let mut state = seeded();
        let before: Vec<Alert> = state.alerts().to_vec();
        let action = state.dismiss("a2");
        assert_eq!(action, Action::Alert(AlertAction::Dismiss, "a2".to_string()));
        assert_eq!(state.len(), 3);
        let expected: Vec<Alert> = before.into_iter().filter(|a| a.id != "a2").collect();
        assert_eq!(state.alerts(), expected.as_slice());
    }

    #[test]
    fn test_dismiss_absent_is_noop() {
        let mut state = seeded();
        assert_eq!(state.dismiss("missing"), Action::None);
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn test_counts_and_filter() {
        let state = seeded();
        let counts = state.counts();
        assert_eq!((counts.high, counts.medium, counts.low), (2, 1, 1));
        assert_eq!(state.filter_by_severity(SeverityFilter::All).len(), 4);
        let high = state.filter_by_severity(SeverityFilter::Only(Severity::High));
        assert_eq!(high.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["a1", "a4"]);
        // projection does not mutate
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn test_reseed_overwrites_dismissals() {
        let mut state = seeded();
        state.dismiss("a1");
        state.clear_all();
        assert!(state.is_empty());
        state.seed(vec![alert("a1", Severity::High)]);
        assert_eq!(state.len(), 1);
        assert!(state.get("a1").is_some());
    }

    #[test]
    fn test_filter_cycle_and_parse() {
        assert_eq!(SeverityFilter::All.next(), SeverityFilter::Only(Severity::High));
        assert_eq!(SeverityFilter::Only(Severity::Low).next(), SeverityFilter::All);
        assert_eq!("ALL".parse::<SeverityFilter>(), Ok(SeverityFilter::All));
        assert_eq!(
            "low".parse::<SeverityFilter>(),
            Ok(SeverityFilter::Only(Severity::Low))
        );
        assert_eq!(SeverityFilter::Only(Severity::Medium).to_string(), "medium");
    }
}
