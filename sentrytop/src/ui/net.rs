//! Network traffic chart: sent/received bytes/sec over the last samples.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};

use crate::history::TrafficTraces;
use crate::ui::theme::{RECEIVED, SENT};
use crate::ui::util::human_rate;

/// Y-axis ceiling: the larger peak plus a little headroom, never zero.
pub fn y_ceiling(traces: &TrafficTraces) -> f64 {
    let peak = traces.sent.peak().max(traces.received.peak());
    if peak <= 0.0 {
        1.0
    } else {
        peak * 1.1
    }
}

pub fn draw_traffic_chart(f: &mut ratatui::Frame<'_>, area: Rect, traces: &TrafficTraces) {
    let sent = traces.sent.xy();
    let received = traces.received.xy();

    let title = format!(
        "Network Traffic — sent: {} | recv: {}",
        human_rate(traces.sent.latest().unwrap_or(0.0)),
        human_rate(traces.received.latest().unwrap_or(0.0)),
    );

    let datasets = vec![
        Dataset::default()
            .name("Sent")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(SENT))
            .data(&sent),
        Dataset::default()
            .name("Received")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(RECEIVED))
            .data(&received),
    ];

    let x_max = (sent.len().max(2) - 1) as f64;
    let x_labels = vec![
        Span::raw(traces.first_label().unwrap_or("").to_string()),
        Span::raw(traces.last_label().unwrap_or("").to_string()),
    ];
    let y_max = y_ceiling(traces);
    let y_labels = vec![Span::raw("0"), Span::raw(human_rate(y_max))];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .title("Time")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Bytes/sec")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(y_labels),
        );
    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn ceiling_has_headroom_and_floor() {
        let mut t = TrafficTraces::new(20);
        assert_eq!(y_ceiling(&t), 1.0);
        t.push("12:00:00".into(), 100.0, 400.0);
        assert!((y_ceiling(&t) - 440.0).abs() < 1e-9);
    }

    #[test]
    fn renders_with_empty_and_full_traces() {
        let mut t = TrafficTraces::new(20);
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw_traffic_chart(f, area, &t)
            })
            .unwrap();
        for i in 0..25 {
            t.push(format!("12:00:{i:02}"), 2048.0, 512.0);
        }
        terminal
            .draw(|f| {
                let area = f.area();
                draw_traffic_chart(f, area, &t)
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("sent: 2.0 KB/s"), "{text}");
    }
}
