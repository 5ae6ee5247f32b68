use leaflet_core::paging::NavigationState;
use leaflet_core::{ChapterText, TocEntry};
use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_segmentation::UnicodeSegmentation;

use crate::theme::Theme;

/// Draw the table of contents pane. The title pseudo-row is styled;
/// every other row carries its global index. The cursor is placed on
/// the selected row (cursor visibility is a TOC-only contract).
pub fn draw_toc(
    f: &mut Frame<'_>,
    area: Rect,
    entries: &[TocEntry],
    nav: &NavigationState,
    theme: &Theme,
) {
    let h = area.height as usize;
    let width = area.width as usize;
    let start = nav.toc_scroll.min(entries.len());
    let end = (start + h).min(entries.len());
    let mut lines: Vec<Line> = Vec::with_capacity(end - start);
    for (row, entry) in entries[start..end].iter().enumerate() {
        let index = start + row;
        let text = truncate_to_width(&format_toc_row(index, &entry.title), width);
        if index == 0 {
            lines.push(Line::from(text).style(
                Style::default()
                    .fg(theme.title_fg)
                    .bg(theme.title_bg)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            lines.push(Line::from(text));
        }
    }
    f.render_widget(Paragraph::new(lines), area);

    let cursor_y = area
        .y
        .saturating_add(nav.toc_cursor.min(h.saturating_sub(1)) as u16);
    f.set_cursor_position(Position::new(area.x, cursor_y));
}

/// Draw the visible window of a rendered chapter. Lines were wrapped at
/// render time; anything wider than the current viewport is clipped by
/// the buffer, which is the best-effort contract for resizes.
pub fn draw_chapter(f: &mut Frame<'_>, area: Rect, text: &ChapterText, offset: usize) {
    let h = area.height as usize;
    let start = offset.min(text.lines.len());
    let end = (start + h).min(text.lines.len());
    let lines: Vec<Line> = text.lines[start..end]
        .iter()
        .map(|line| Line::from(line.as_str()))
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

/// One-line status overlay on the top row (image errors and the like).
pub fn draw_status(f: &mut Frame<'_>, area: Rect, theme: &Theme, message: &str) {
    if area.height == 0 {
        return;
    }
    let bar = Rect { height: 1, ..area };
    let line = Line::from(truncate_to_width(message, area.width as usize)).style(
        Style::default().fg(theme.status_fg).bg(theme.status_bg),
    );
    f.render_widget(Paragraph::new(line), bar);
}

fn format_toc_row(index: usize, title: &str) -> String {
    if index == 0 {
        format!("      {}", title)
    } else {
        format!("{:>5} {}", index, title)
    }
}

fn truncate_to_width(text: &str, max_w: usize) -> String {
    if max_w == 0 {
        return String::new();
    }
    let gs: Vec<&str> = text.graphemes(true).collect();
    if gs.len() <= max_w {
        return text.to_string();
    }
    if max_w == 1 {
        return "…".to_string();
    }
    let keep = max_w.saturating_sub(1);
    format!("{}…", gs[..keep].concat())
}
