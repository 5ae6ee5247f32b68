//! Scroll state transitions for the two-pane reader.
//!
//! All functions are pure over [`NavigationState`], parameterized by
//! the viewport height `h` and content length `n` (TOC entry count or
//! chapter line count). Offsets are clamped on every move: the TOC
//! cursor stays inside the viewport and on an existing entry, and a
//! chapter offset never scrolls the last line above the viewport.

/// Which pane owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Toc,
    Chapter,
}

/// Mutable navigation state for one reading session. Owned by the view
/// controller and handed by reference into the transition functions;
/// chapter offsets are kept per entry index so leaving and re-entering
/// a chapter restores its position.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub mode: Mode,
    pub toc_scroll: usize,
    pub toc_cursor: usize,
    pub chapter_offsets: Vec<usize>,
    pub active_chapter: Option<usize>,
}

impl NavigationState {
    pub fn new(entry_count: usize) -> Self {
        Self {
            mode: Mode::Toc,
            toc_scroll: 0,
            toc_cursor: 0,
            chapter_offsets: vec![0; entry_count],
            active_chapter: None,
        }
    }

    /// Global index of the TOC row under the cursor.
    pub fn selected_entry(&self) -> usize {
        self.toc_scroll + self.toc_cursor
    }

    pub fn active_offset(&self) -> usize {
        self.active_chapter
            .and_then(|idx| self.chapter_offsets.get(idx).copied())
            .unwrap_or(0)
    }
}

/// Move one line down. In the TOC the list scrolls while it can, then
/// the cursor walks down the visible rows; a chapter scrolls directly,
/// stopping once the last line reaches the viewport.
pub fn line_down(nav: &mut NavigationState, n: usize, h: usize) {
    if h == 0 {
        return;
    }
    match nav.mode {
        Mode::Toc => {
            if nav.toc_scroll < n.saturating_sub(h) {
                nav.toc_scroll += 1;
            } else if nav.toc_cursor + 1 < h && nav.selected_entry() + 1 < n {
                nav.toc_cursor += 1;
            }
        }
        Mode::Chapter => {
            if let Some(idx) = nav.active_chapter {
                let offset = &mut nav.chapter_offsets[idx];
                if *offset + (h - 1) < n && *offset + 1 < n {
                    *offset += 1;
                }
            }
        }
    }
}

/// Move one line up: un-scroll first, then (TOC only) retreat the
/// cursor.
pub fn line_up(nav: &mut NavigationState, _n: usize, h: usize) {
    if h == 0 {
        return;
    }
    match nav.mode {
        Mode::Toc => {
            if nav.toc_scroll > 0 {
                nav.toc_scroll -= 1;
            } else if nav.toc_cursor > 0 {
                nav.toc_cursor -= 1;
            }
        }
        Mode::Chapter => {
            if let Some(idx) = nav.active_chapter {
                let offset = &mut nav.chapter_offsets[idx];
                *offset = offset.saturating_sub(1);
            }
        }
    }
}

/// Advance a page (`h - 1` lines). The final page never scrolls past
/// showing the last item flush with the bottom: the offset converges to
/// `max(0, n - h)` and stays there.
pub fn page_down(nav: &mut NavigationState, n: usize, h: usize) {
    if h == 0 {
        return;
    }
    match nav.mode {
        Mode::Toc => {
            nav.toc_scroll = advance_page(nav.toc_scroll, n, h);
            clamp_toc(nav, n, h);
        }
        Mode::Chapter => {
            if let Some(idx) = nav.active_chapter {
                nav.chapter_offsets[idx] = advance_page(nav.chapter_offsets[idx], n, h);
            }
        }
    }
}

/// Retreat a page, clamped to the top.
pub fn page_up(nav: &mut NavigationState, _n: usize, h: usize) {
    if h == 0 {
        return;
    }
    match nav.mode {
        Mode::Toc => {
            nav.toc_scroll = nav.toc_scroll.saturating_sub(h - 1);
        }
        Mode::Chapter => {
            if let Some(idx) = nav.active_chapter {
                let offset = &mut nav.chapter_offsets[idx];
                *offset = offset.saturating_sub(h - 1);
            }
        }
    }
}

/// Re-establish the TOC invariants after a viewport change: the cursor
/// stays inside the viewport and on an existing entry.
pub fn clamp_toc(nav: &mut NavigationState, n: usize, h: usize) {
    if h > 0 && nav.toc_cursor >= h {
        nav.toc_cursor = h - 1;
    }
    if n > 0 && nav.selected_entry() >= n {
        nav.toc_cursor = (n - 1).saturating_sub(nav.toc_scroll);
    }
}

/// Clamp a chapter offset after a viewport change.
pub fn clamp_chapter(nav: &mut NavigationState, chapter: usize, n: usize, h: usize) {
    if let Some(offset) = nav.chapter_offsets.get_mut(chapter) {
        *offset = (*offset).min(n.saturating_sub(h.max(1)));
    }
}

fn advance_page(offset: usize, n: usize, h: usize) -> usize {
    let floor = n.saturating_sub(h);
    (offset + h.saturating_sub(1)).min(floor)
}
