//! Dashboard state and the per-event handlers that mutate it.
//!
//! One `Dashboard` owns everything the panels draw: the three header fields, the
//! process table, the traffic traces, the alert log and the alert tally. Handlers
//! run to completion one event at a time; nothing here is shared across tasks.

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::alerts::{AlertEntry, AlertLog, AlertTally, ALERT_LOG_CAPACITY};
use crate::error::{FrameError, RateError};
use crate::history::{TrafficTraces, TRAFFIC_WINDOW};
use crate::rate::{RateDeriver, RateMode};
use crate::types::{AlertEvent, HostMetricsSnapshot, InboundEvent, NetworkRateSample, ProcessInfo};

/// Shown wherever the feed left a value out.
pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRow {
    pub pid: String,
    pub name: String,
    pub cpu: String,
    pub mem: String,
}

impl From<&ProcessInfo> for ProcessRow {
    fn from(p: &ProcessInfo) -> Self {
        Self {
            pid: p.pid.map_or_else(|| PLACEHOLDER.into(), |pid| pid.to_string()),
            name: p.name.clone(),
            cpu: fmt_opt(p.cpu_percent, 1),
            mem: fmt_opt(p.memory_percent, 1),
        }
    }
}

/// Header fields (`cpu-usage`, `mem-usage`, `cpu-load`), already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFields {
    pub cpu_usage: String,
    pub mem_usage: String,
    pub cpu_load: String,
}

impl Default for HostFields {
    fn default() -> Self {
        Self {
            cpu_usage: PLACEHOLDER.into(),
            mem_usage: PLACEHOLDER.into(),
            cpu_load: PLACEHOLDER.into(),
        }
    }
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.decimals$}"),
        _ => PLACEHOLDER.into(),
    }
}

fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.1}%"),
        _ => PLACEHOLDER.into(),
    }
}

pub struct Dashboard {
    rate_mode: RateMode,
    rate: RateDeriver,

    pub host: HostFields,
    pub processes: Vec<ProcessRow>,
    pub traffic: TrafficTraces,
    pub alerts: AlertLog,
    pub tally: AlertTally,

    // Frames that failed to decode or were rejected
    pub dropped_frames: u64,
    pub events_handled: u64,
}

impl Dashboard {
    pub fn new(rate_mode: RateMode) -> Self {
        Self {
            rate_mode,
            rate: RateDeriver::new(),
            host: HostFields::default(),
            processes: Vec::new(),
            traffic: TrafficTraces::new(TRAFFIC_WINDOW),
            alerts: AlertLog::new(ALERT_LOG_CAPACITY),
            tally: AlertTally::new(),
            dropped_frames: 0,
            events_handled: 0,
        }
    }

    pub fn rate_mode(&self) -> RateMode {
        self.rate_mode
    }

    /// Decode a text frame and dispatch it. Bad frames are logged and counted.
    pub fn handle_frame(&mut self, text: &str, at: DateTime<Local>) {
        match InboundEvent::decode(text) {
            Ok(ev) => self.dispatch(ev, at),
            Err(e) => self.drop_frame(&e),
        }
    }

    pub fn dispatch(&mut self, event: InboundEvent, at: DateTime<Local>) {
        match event {
            InboundEvent::HostMetrics(s) => self.on_host_metrics(&s),
            InboundEvent::NetworkRate(s) => {
                if let Err(e) = self.on_network_rate(s, at) {
                    debug!(error = %e, "network sample skipped");
                    return;
                }
            }
            InboundEvent::Alert(a) => self.on_alert(&a, at),
        }
        self.events_handled += 1;
    }

    fn drop_frame(&mut self, e: &FrameError) {
        self.dropped_frames += 1;
        warn!(error = %e, dropped = self.dropped_frames, "dropping inbound frame");
    }

    pub fn on_host_metrics(&mut self, s: &HostMetricsSnapshot) {
        self.host = HostFields {
            cpu_usage: fmt_pct(s.cpu_usage),
            mem_usage: fmt_pct(s.memory_usage),
            cpu_load: fmt_opt(s.cpu_load, 2),
        };
        // Snapshot semantics: the new list replaces the old one entirely.
        self.processes = s.top_processes.iter().map(ProcessRow::from).collect();
    }

    pub fn on_network_rate(
        &mut self,
        sample: NetworkRateSample,
        at: DateTime<Local>,
    ) -> Result<(), RateError> {
        let rate = match self.rate_mode {
            RateMode::Precomputed => sample,
            RateMode::Derived => self.rate.derive(sample, at)?,
        };
        self.traffic
            .push(at.format("%H:%M:%S").to_string(), rate.sent, rate.received);
        Ok(())
    }

    pub fn on_alert(&mut self, alert: &AlertEvent, at: DateTime<Local>) {
        self.alerts.insert(AlertEntry::new(alert, at));
        self.tally.record(&alert.kind);
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(RateMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn proc(pid: u32, name: &str) -> ProcessInfo {
        ProcessInfo {
            pid: Some(pid),
            name: name.into(),
            cpu_percent: Some(7.26),
            memory_percent: Some(0.5),
        }
    }

    fn alert(kind: &str) -> AlertEvent {
        AlertEvent {
            severity: "Critical".into(),
            kind: kind.into(),
            description: format!("{kind} detected"),
        }
    }

    #[test]
    fn host_metrics_formats_fields() {
        let mut d = Dashboard::default();
        d.on_host_metrics(&HostMetricsSnapshot {
            cpu_usage: Some(12.345),
            memory_usage: Some(67.0),
            cpu_load: Some(0.5),
            top_processes: vec![proc(1, "init")],
        });
        assert_eq!(d.host.cpu_usage, "12.3%");
        assert_eq!(d.host.mem_usage, "67.0%");
        assert_eq!(d.host.cpu_load, "0.50");
        assert_eq!(
            d.processes[0],
            ProcessRow {
                pid: "1".into(),
                name: "init".into(),
                cpu: "7.3".into(),
                mem: "0.5".into(),
            }
        );
    }

    #[test]
    fn missing_host_fields_render_placeholder() {
        let mut d = Dashboard::default();
        d.on_host_metrics(&HostMetricsSnapshot {
            cpu_usage: Some(f64::NAN),
            ..Default::default()
        });
        assert_eq!(d.host, HostFields::default());
        assert!(d.processes.is_empty());
    }

    #[test]
    fn process_table_is_replaced_not_accumulated() {
        let mut d = Dashboard::default();
        let first = HostMetricsSnapshot {
            top_processes: (0..5).map(|i| proc(i, "a")).collect(),
            ..Default::default()
        };
        let second = HostMetricsSnapshot {
            top_processes: vec![proc(42, "b"), proc(43, "c")],
            ..Default::default()
        };
        d.on_host_metrics(&first);
        assert_eq!(d.processes.len(), 5);
        d.on_host_metrics(&second);
        assert_eq!(d.processes.len(), 2);
        assert_eq!(d.processes[0].pid, "42");
        assert_eq!(d.processes[1].name, "c");
    }

    #[test]
    fn alert_scenario_tally_and_log() {
        let mut d = Dashboard::default();
        let t0 = Local::now();
        for (i, kind) in ["intrusion", "intrusion", "scan"].iter().enumerate() {
            d.on_alert(&alert(kind), t0 + TimeDelta::seconds(i as i64));
        }
        assert_eq!(d.tally.count("intrusion"), 2);
        assert_eq!(d.tally.count("scan"), 1);
        assert_eq!(d.tally.kinds(), 2);
        assert_eq!(d.alerts.len(), 3);
        let top = d.alerts.newest().unwrap();
        assert_eq!(top.kind, "scan");
        assert_eq!(top.severity.class(), "severity-critical");
    }

    #[test]
    fn alert_log_caps_while_tally_keeps_counting() {
        let mut d = Dashboard::default();
        let now = Local::now();
        for _ in 0..25 {
            d.on_alert(&alert("scan"), now);
        }
        assert_eq!(d.alerts.len(), ALERT_LOG_CAPACITY);
        assert_eq!(d.tally.count("scan"), 25);
    }

    #[test]
    fn precomputed_rates_are_plotted_as_is() {
        let mut d = Dashboard::new(RateMode::Precomputed);
        let now = Local::now();
        for i in 0..30 {
            d.on_network_rate(
                NetworkRateSample {
                    sent: i as f64,
                    received: 1.0,
                },
                now,
            )
            .unwrap();
        }
        assert_eq!(d.traffic.sent.len(), TRAFFIC_WINDOW);
        assert_eq!(d.traffic.received.len(), TRAFFIC_WINDOW);
        assert_eq!(d.traffic.sent.iter().next().map(|p| p.value), Some(10.0));
        assert_eq!(d.traffic.sent.latest(), Some(29.0));
    }

    #[test]
    fn derived_mode_diffs_counters() {
        let mut d = Dashboard::new(RateMode::Derived);
        let t0 = Local::now();
        let s0 = NetworkRateSample {
            sent: 1000.0,
            received: 0.0,
        };
        let s1 = NetworkRateSample {
            sent: 2000.0,
            received: 0.0,
        };
        d.on_network_rate(s0, t0).unwrap();
        d.on_network_rate(s1, t0 + TimeDelta::seconds(1)).unwrap();
        assert_eq!(d.traffic.sent.len(), 2);
        assert_eq!(d.traffic.sent.latest(), Some(1000.0));

        // Same instant again: rejected, nothing plotted
        assert!(d.on_network_rate(s1, t0 + TimeDelta::seconds(1)).is_err());
        assert_eq!(d.traffic.sent.len(), 2);
    }

    #[test]
    fn frames_dispatch_by_event_name() {
        let mut d = Dashboard::default();
        let now = Local::now();
        d.handle_frame(
            r#"{"event":"new_alert","data":{"severity":"warning","type":"scan","description":"port sweep"}}"#,
            now,
        );
        d.handle_frame(
            r#"{"event":"network_traffic_update","data":{"sent":12.0,"received":3.0}}"#,
            now,
        );
        d.handle_frame(r#"{"event":"update_metrics","data":{}}"#, now);
        d.handle_frame("not json", now);
        d.handle_frame(r#"{"event":"new_alert","data":{"type":"scan"}}"#, now);

        assert_eq!(d.events_handled, 2);
        assert_eq!(d.dropped_frames, 3);
        assert_eq!(d.tally.count("scan"), 1);
        assert_eq!(d.alerts.len(), 1);
        assert_eq!(d.traffic.received.latest(), Some(3.0));
    }

    #[test]
    fn sparse_host_frame_still_updates_fields_and_rows() {
        let mut d = Dashboard::default();
        let now = Local::now();
        d.handle_frame(
            r#"{"event":"system_metrics_update","data":{"cpu_usage":10.0,"top_processes":[{"pid":1,"name":null,"cpu_percent":2.0},{"name":"kthreadd","cpu_percent":null}]}}"#,
            now,
        );
        d.handle_frame(
            r#"{"event":"network_traffic_update","data":{"sent":5.0}}"#,
            now,
        );
        assert_eq!(d.dropped_frames, 0);
        assert_eq!(d.host.cpu_usage, "10.0%");
        assert_eq!(d.host.mem_usage, PLACEHOLDER);
        assert_eq!(d.processes.len(), 2);
        assert_eq!(d.processes[0].name, "");
        assert_eq!(d.processes[1].pid, PLACEHOLDER);
        assert_eq!(d.processes[1].cpu, PLACEHOLDER);
        assert_eq!(d.traffic.sent.latest(), Some(5.0));
        assert_eq!(d.traffic.received.latest(), Some(0.0));
    }
}
