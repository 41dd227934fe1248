//! Top header with the host fields (cpu-usage, mem-usage, cpu-load) and feed state.

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
};

use crate::dashboard::Dashboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Live,
    Closed,
}

pub fn header_title(d: &Dashboard, status: FeedStatus) -> String {
    let state = match status {
        FeedStatus::Live => "live",
        FeedStatus::Closed => "disconnected",
    };
    let mut title = format!(
        "sentrytop — CPU: {} | Mem: {} | Load: {} | alerts: {} | {state}",
        d.host.cpu_usage,
        d.host.mem_usage,
        d.host.cpu_load,
        d.tally.total(),
    );
    if d.dropped_frames > 0 {
        title.push_str(&format!(" | dropped: {}", d.dropped_frames));
    }
    title.push_str("  (press 'q' to quit)");
    title
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, d: &Dashboard, status: FeedStatus) {
    f.render_widget(
        Block::default()
            .title(header_title(d, status))
            .borders(Borders::BOTTOM),
        area,
    );
}
