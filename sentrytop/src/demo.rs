//! Demo feed: a local WebSocket endpoint that samples this machine with sysinfo and
//! pushes the same three events a real feed would, so the dashboard can be tried
//! without a backend.

use std::{
    net::SocketAddr,
    time::{Duration, Instant},
};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use sysinfo::{Networks, ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::rate::RateMode;
use crate::types::{AlertEvent, HostMetricsSnapshot, InboundEvent, NetworkRateSample, ProcessInfo};

pub const TOP_PROCESSES: usize = 15;

// Rule thresholds
pub const PACKET_RATE_LIMIT: f64 = 1000.0; // packets/sec
pub const CPU_LIMIT: f64 = 90.0;
pub const MEM_LIMIT: f64 = 90.0;
pub const OUTBOUND_LIMIT: f64 = 10.0 * 1024.0 * 1024.0; // bytes/sec

#[derive(Debug, Clone, Copy)]
pub struct FeedConfig {
    pub period: Duration,
    /// Derived mode sends cumulative counters instead of rates.
    pub rate_mode: RateMode,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            rate_mode: RateMode::Precomputed,
        }
    }
}

pub struct DemoFeed {
    pub addr: SocketAddr,
    task: JoinHandle<()>,
}

impl DemoFeed {
    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

impl Drop for DemoFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Bind `127.0.0.1:port` (0 = any free port) and serve `/ws` in the background.
pub async fn spawn_demo_feed(port: u16, cfg: FeedConfig) -> anyhow::Result<DemoFeed> {
    let app = Router::new().route("/ws", get(ws_handler)).with_state(cfg);
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port))).await?;
    let addr = listener.local_addr()?;
    info!(%addr, rate_mode = %cfg.rate_mode, "demo feed listening");

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "demo feed stopped");
        }
    });
    Ok(DemoFeed { addr, task })
}

async fn ws_handler(ws: WebSocketUpgrade, State(cfg): State<FeedConfig>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, cfg))
}

async fn handle_socket(mut socket: WebSocket, cfg: FeedConfig) {
    let mut sampler = Sampler::new();
    let mut tick = tokio::time::interval(cfg.period);
    loop {
        tokio::select! {
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            _ = tick.tick() => {
                for ev in sampler.sample(cfg.rate_mode) {
                    let js = match ev.encode() {
                        Ok(js) => js,
                        Err(e) => {
                            warn!(error = %e, "failed to encode demo event");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(js)).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
    debug!("demo client went away");
}

/// One interval's worth of readings the rules look at.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reading {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub sent_rate: f64,
    pub packet_rate: f64,
}

pub fn detect(r: &Reading) -> Vec<AlertEvent> {
    let mut alerts = Vec::new();
    if r.packet_rate > PACKET_RATE_LIMIT {
        alerts.push(AlertEvent {
            severity: "Critical".into(),
            kind: "Rule-Based Alert".into(),
            description: format!(
                "High Packet Rate Detected (Potential Flood Attack): {:.0} pps",
                r.packet_rate
            ),
        });
    }
    if r.sent_rate > OUTBOUND_LIMIT {
        alerts.push(AlertEvent {
            severity: "Medium".into(),
            kind: "Rule-Based Alert".into(),
            description: "High Outbound Traffic (Potential Exfiltration)".into(),
        });
    }
    if r.cpu_usage > CPU_LIMIT {
        alerts.push(AlertEvent {
            severity: "Warning".into(),
            kind: "Resource Alert".into(),
            description: format!("CPU usage at {:.1}%", r.cpu_usage),
        });
    }
    if r.memory_usage > MEM_LIMIT {
        alerts.push(AlertEvent {
            severity: "Warning".into(),
            kind: "Resource Alert".into(),
            description: format!("Memory usage at {:.1}%", r.memory_usage),
        });
    }
    alerts
}

struct Sampler {
    sys: System,
    nets: Networks,
    last: Instant,
    // cumulative since the feed started
    sent_total: u64,
    received_total: u64,
}

impl Sampler {
    fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys,
            nets: Networks::new_with_refreshed_list(),
            last: Instant::now(),
            sent_total: 0,
            received_total: 0,
        }
    }

    fn sample(&mut self, mode: RateMode) -> Vec<InboundEvent> {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        self.nets.refresh(true);

        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f64().max(1e-3);
        self.last = now;

        // received()/transmitted() are deltas since the previous refresh
        let (mut tx, mut rx, mut packets) = (0u64, 0u64, 0u64);
        for data in self.nets.list().values() {
            tx = tx.saturating_add(data.transmitted());
            rx = rx.saturating_add(data.received());
            packets = packets
                .saturating_add(data.packets_received())
                .saturating_add(data.packets_transmitted());
        }
        self.sent_total = self.sent_total.saturating_add(tx);
        self.received_total = self.received_total.saturating_add(rx);

        let host = self.host_snapshot();
        let reading = Reading {
            cpu_usage: host.cpu_usage.unwrap_or(0.0),
            memory_usage: host.memory_usage.unwrap_or(0.0),
            sent_rate: tx as f64 / dt,
            packet_rate: packets as f64 / dt,
        };
        let net = match mode {
            RateMode::Precomputed => NetworkRateSample {
                sent: reading.sent_rate,
                received: rx as f64 / dt,
            },
            RateMode::Derived => NetworkRateSample {
                sent: self.sent_total as f64,
                received: self.received_total as f64,
            },
        };

        let mut events = vec![InboundEvent::HostMetrics(host), InboundEvent::NetworkRate(net)];
        events.extend(detect(&reading).into_iter().map(InboundEvent::Alert));
        events
    }

    fn host_snapshot(&self) -> HostMetricsSnapshot {
        let mem_total = self.sys.total_memory().max(1) as f64;
        let n_cpus = self.sys.cpus().len().max(1) as f64;

        let mut top_processes: Vec<ProcessInfo> = self
            .sys
            .processes()
            .values()
            .map(|p| ProcessInfo {
                pid: Some(p.pid().as_u32()),
                name: p.name().to_string_lossy().into_owned(),
                cpu_percent: Some((p.cpu_usage() as f64 / n_cpus).min(100.0)),
                memory_percent: Some(p.memory() as f64 / mem_total * 100.0),
            })
            .collect();
        top_processes.sort_by(|a, b| {
            b.cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        top_processes.truncate(TOP_PROCESSES);

        HostMetricsSnapshot {
            cpu_usage: Some(self.sys.global_cpu_usage() as f64),
            memory_usage: Some(self.sys.used_memory() as f64 / mem_total * 100.0),
            cpu_load: Some(System::load_average().one),
            top_processes,
        }
    }
}
