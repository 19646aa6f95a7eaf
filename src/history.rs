//! Historical tracking of the overall status for trends and sparklines.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use vitals_types::Severity;

use crate::status::OverallStatus;

/// Maximum number of cycles to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// One recorded cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub cycle: u64,
    pub severity: Severity,
    pub confidence: f64,
}

/// Bounded record of recent overall statuses.
#[derive(Debug, Clone, Default)]
pub struct StatusHistory {
    entries: VecDeque<HistoryEntry>,
}

impl StatusHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the status published for `cycle`.
    pub fn record(&mut self, cycle: u64, status: &OverallStatus) {
        self.entries.push_back(HistoryEntry {
            cycle,
            severity: status.severity,
            confidence: status.confidence,
        });
        if self.entries.len() > MAX_HISTORY_SIZE {
            self.entries.pop_front();
        }
    }

    /// Recorded cycles, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Number of recorded cycles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many recorded cycles ended at each severity.
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.severity).or_insert(0) += 1;
        }
        counts
    }

    /// Change in confidence over the last cycle.
    ///
    /// Returns None if there's not enough history.
    pub fn confidence_trend(&self) -> Option<f64> {
        let len = self.entries.len();
        if len < 2 {
            return None;
        }
        let current = self.entries.get(len - 1)?;
        let previous = self.entries.get(len - 2)?;
        Some(current.confidence - previous.confidence)
    }

    /// Confidence history normalized to 0-7 for 8 bar levels.
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn confidence_sparkline(&self) -> Vec<u8> {
        if self.entries.len() < 2 {
            return Vec::new();
        }

        let values: Vec<f64> = self.entries.iter().map(|e| e.confidence).collect();
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let range = max - min;

        values
            .iter()
            .map(|&v| {
                if range <= f64::EPSILON {
                    return 7;
                }
                let normalized = ((v - min) / range * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(severity: Severity, confidence: f64) -> OverallStatus {
        OverallStatus {
            severity,
            confidence,
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = StatusHistory::new();
        for cycle in 0..100 {
            history.record(cycle, &status(Severity::Nominal, 0.9));
        }
        assert_eq!(history.len(), MAX_HISTORY_SIZE);
        assert_eq!(history.entries().next().map(|e| e.cycle), Some(40));
    }

    #[test]
    fn test_severity_counts_and_trend() {
        let mut history = StatusHistory::new();
        assert!(history.confidence_trend().is_none());

        history.record(1, &status(Severity::Nominal, 0.9));
        history.record(2, &status(Severity::Warning, 0.2));
        history.record(3, &status(Severity::Warning, 0.1));

        let counts = history.severity_counts();
        assert_eq!(counts.get(&Severity::Nominal), Some(&1));
        assert_eq!(counts.get(&Severity::Warning), Some(&2));
        assert!(counts.get(&Severity::Caution).is_none());

        let trend = history.confidence_trend().unwrap();
        assert!((trend + 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_sparkline_normalization() {
        let mut history = StatusHistory::new();
        assert!(history.confidence_sparkline().is_empty());

        history.record(1, &status(Severity::Nominal, 1.0));
        history.record(2, &status(Severity::Caution, 0.5));
        history.record(3, &status(Severity::Warning, 0.0));
        assert_eq!(history.confidence_sparkline(), vec![7, 3, 0]);
    }
}
