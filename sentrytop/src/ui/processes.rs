//! Top processes table, in the order the feed sent them, with a scrollbar.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::style::Modifier;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::dashboard::ProcessRow;
use crate::ui::theme::{HEADER_FG, SB_ARROW, SB_THUMB, SB_TRACK};

const COLS: [Constraint; 4] = [
    Constraint::Length(8),      // PID
    Constraint::Percentage(50), // Name
    Constraint::Length(8),      // CPU %
    Constraint::Length(8),      // Mem %
];

// borders (2) + header (1)
pub fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

fn cpu_color(cell: &str) -> Color {
    match cell.parse::<f64>() {
        Ok(x) if x < 25.0 => Color::Green,
        Ok(x) if x < 60.0 => Color::Yellow,
        Ok(_) => Color::Red,
        Err(_) => Color::DarkGray,
    }
}

pub fn draw_top_processes(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    rows: &[ProcessRow],
    scroll_offset: usize,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Top Processes ({})", rows.len()));
    f.render_widget(block, area);

    // Inner area and content area (reserve 2 columns for scrollbar)
    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    if inner.height < 1 || inner.width < 3 {
        return;
    }
    let content = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width.saturating_sub(2),
        height: inner.height,
    };

    let total_rows = rows.len();
    let viewport_rows = content.height.saturating_sub(1) as usize;
    let max_off = total_rows.saturating_sub(viewport_rows);
    let offset = scroll_offset.min(max_off);

    let body = rows.iter().skip(offset).take(viewport_rows).map(|p| {
        Row::new(vec![
            Cell::from(p.pid.clone()).style(Style::default().fg(Color::DarkGray)),
            Cell::from(p.name.clone()),
            Cell::from(p.cpu.clone()).style(Style::default().fg(cpu_color(&p.cpu))),
            Cell::from(p.mem.clone()),
        ])
    });
    let header = Row::new(vec!["PID", "Name", "CPU %", "Mem %"])
        .style(Style::default().fg(HEADER_FG).add_modifier(Modifier::BOLD));
    let table = Table::new(body, COLS.to_vec())
        .header(header)
        .column_spacing(1);
    f.render_widget(table, content);

    let scroll_area = Rect {
        x: inner.x + inner.width.saturating_sub(1),
        y: inner.y,
        width: 1,
        height: inner.height,
    };
    if scroll_area.height >= 3 {
        let track = (scroll_area.height - 2) as usize;
        let total = total_rows.max(1);
        let view = viewport_rows.clamp(1, total);
        let max_off = total.saturating_sub(view);

        let thumb_len = (track * view).div_ceil(total).clamp(1, track);
        let thumb_top = if max_off == 0 {
            0
        } else {
            ((track - thumb_len) * offset + max_off / 2) / max_off
        };

        let mut lines: Vec<Line> = Vec::with_capacity(scroll_area.height as usize);
        lines.push(Line::from(Span::styled("▲", Style::default().fg(SB_ARROW))));
        for i in 0..track {
            if i >= thumb_top && i < thumb_top + thumb_len {
                lines.push(Line::from(Span::styled("█", Style::default().fg(SB_THUMB))));
            } else {
                lines.push(Line::from(Span::styled("│", Style::default().fg(SB_TRACK))));
            }
        }
        lines.push(Line::from(Span::styled("▼", Style::default().fg(SB_ARROW))));
        f.render_widget(Paragraph::new(lines), scroll_area);
    }
}

/// Handle keyboard scrolling (Up/Down/PageUp/PageDown/Home/End)
pub fn processes_handle_key(scroll_offset: &mut usize, key: KeyEvent, page_size: usize) {
    let page = page_size.max(1);
    match key.code {
        KeyCode::Up => *scroll_offset = scroll_offset.saturating_sub(1),
        KeyCode::Down => *scroll_offset = scroll_offset.saturating_add(1),
        KeyCode::PageUp => *scroll_offset = scroll_offset.saturating_sub(page),
        KeyCode::PageDown => *scroll_offset = scroll_offset.saturating_add(page),
        KeyCode::Home => *scroll_offset = 0,
        KeyCode::End => *scroll_offset = usize::MAX,
        _ => {}
    }
}

pub fn processes_clamp(scroll_offset: &mut usize, total_rows: usize, visible: usize) {
    let max_off = total_rows.saturating_sub(visible);
    if *scroll_offset > max_off {
        *scroll_offset = max_off;
    }
}
