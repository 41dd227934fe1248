//! Alert log table (newest on top, colored by severity) and the alert distribution chart.

use ratatui::style::Modifier;
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::alerts::{AlertLog, AlertTally};
use crate::ui::theme::{severity_color, BAR_PALETTE, HEADER_FG};
use crate::ui::util::truncate_middle;

const COLS: [Constraint; 4] = [
    Constraint::Length(8),  // Time
    Constraint::Length(9),  // Severity
    Constraint::Length(18), // Type
    Constraint::Min(10),    // Description
];

pub fn draw_alert_log(f: &mut ratatui::Frame<'_>, area: Rect, log: &AlertLog) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Alert Log (latest {})", log.len()));

    let desc_width = area.width.saturating_sub(2 + 8 + 9 + 18 + 3) as usize;
    let rows = log.iter().map(|a| {
        // Whole row takes the severity color, like a severity-* row class
        Row::new(vec![
            Cell::from(a.time.clone()),
            Cell::from(a.severity_label.clone()),
            Cell::from(truncate_middle(&a.kind, 18)),
            Cell::from(truncate_middle(&a.description, desc_width.max(10))),
        ])
        .style(Style::default().fg(severity_color(&a.severity)))
    });
    let header = Row::new(vec!["Time", "Severity", "Type", "Description"])
        .style(Style::default().fg(HEADER_FG).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, COLS.to_vec())
        .header(header)
        .column_spacing(1)
        .block(block);
    f.render_widget(table, area);
}

pub fn draw_alert_distribution(f: &mut ratatui::Frame<'_>, area: Rect, tally: &AlertTally) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Alert Distribution ({} total)", tally.total()));

    if tally.kinds() == 0 {
        f.render_widget(
            Paragraph::new("no alerts yet").block(block).centered(),
            area,
        );
        return;
    }

    // Redrawn from the full tally every frame
    let inner_w = area.width.saturating_sub(2) as usize;
    let n = tally.kinds();
    let bar_width = (inner_w.saturating_sub(n.saturating_sub(1)) / n).clamp(1, 12) as u16;
    let bars: Vec<Bar> = tally
        .iter()
        .enumerate()
        .map(|(i, (kind, count))| {
            let color = BAR_PALETTE[i % BAR_PALETTE.len()];
            Bar::default()
                .label(Line::from(truncate_middle(kind, bar_width as usize)))
                .value(count)
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(color).add_modifier(Modifier::REVERSED))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    f.render_widget(chart, area);
}
