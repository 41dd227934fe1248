//! Alert log (newest first, capped) and per-type tally.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::types::AlertEvent;

/// Rows kept in the alert log.
pub const ALERT_LOG_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Warning,
    Low,
    Info,
    Other(String),
}

impl Severity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "warning" | "warn" => Severity::Warning,
            "low" => Severity::Low,
            "info" => Severity::Info,
            other => Severity::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Warning => "warning",
            Severity::Low => "low",
            Severity::Info => "info",
            Severity::Other(s) => s,
        }
    }

    /// Row style tag, e.g. `severity-critical`.
    pub fn class(&self) -> String {
        format!("severity-{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEntry {
    pub time: String,
    pub severity: Severity,
    /// Severity exactly as the feed sent it.
    pub severity_label: String,
    pub kind: String,
    pub description: String,
}

impl AlertEntry {
    pub fn new(alert: &AlertEvent, at: DateTime<Local>) -> Self {
        Self {
            time: at.format("%H:%M:%S").to_string(),
            severity: Severity::parse(&alert.severity),
            severity_label: alert.severity.clone(),
            kind: alert.kind.clone(),
            description: alert.description.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<AlertEntry>,
    cap: usize,
}

impl AlertLog {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap + 1),
            cap,
        }
    }

    pub fn insert(&mut self, entry: AlertEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.cap);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest(&self) -> Option<&AlertEntry> {
        self.entries.front()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &AlertEntry> {
        self.entries.iter()
    }
}

// Counts per alert type, kept in first-seen order so the bars don't reshuffle.
#[derive(Debug, Clone, Default)]
pub struct AlertTally {
    counts: Vec<(String, u64)>,
}

impl AlertTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: &str) -> u64 {
        if let Some((_, n)) = self.counts.iter_mut().find(|(k, _)| k == kind) {
            *n += 1;
            return *n;
        }
        self.counts.push((kind.to_string(), 1));
        1
    }

    pub fn count(&self, kind: &str) -> u64 {
        self.counts
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn kinds(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, n)| (k.as_str(), *n))
    }
}
