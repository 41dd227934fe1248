//! sentrytop: live host metrics and intrusion alert dashboard fed over WebSocket.

pub mod alerts;
pub mod app;
pub mod dashboard;
pub mod demo;
pub mod error;
pub mod history;
pub mod logging;
pub mod profiles;
pub mod rate;
pub mod types;
pub mod ui;
pub mod ws;
