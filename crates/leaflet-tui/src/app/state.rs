use std::collections::HashMap;

use leaflet_core::paging::{self, Mode, NavigationState};
use leaflet_core::render::{extract_image_refs, render_chapter};
use leaflet_core::{ChapterText, Container, ReaderError, TocEntry};
use ratatui::prelude::*;

use crate::theme::Theme;
use crate::{images, views};

/// The interactive reader: one open archive, the table of contents, and
/// lazily rendered chapters keyed by their contents-list index.
pub struct App {
    pub(super) container: Container,
    pub(super) entries: Vec<TocEntry>,
    pub(super) nav: NavigationState,
    pub(super) chapters: HashMap<usize, ChapterText>,
    pub(super) theme: Theme,
    pub(super) status: Option<String>,
}

impl App {
    pub fn new(container: Container, entries: Vec<TocEntry>) -> Self {
        let nav = NavigationState::new(entries.len());
        App {
            container,
            entries,
            nav,
            chapters: HashMap::new(),
            theme: Theme::default(),
            status: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub(super) fn draw(&mut self, f: &mut Frame<'_>) {
        let area = f.area();
        let h = area.height as usize;
        match self.nav.mode {
            Mode::Toc => {
                paging::clamp_toc(&mut self.nav, self.entries.len(), h);
                views::draw_toc(f, area, &self.entries, &self.nav, &self.theme);
            }
            Mode::Chapter => {
                let idx = self.nav.active_chapter.unwrap_or(0);
                let n = self.chapters.get(&idx).map_or(0, |c| c.lines.len());
                paging::clamp_chapter(&mut self.nav, idx, n, h);
                if let Some(text) = self.chapters.get(&idx) {
                    views::draw_chapter(f, area, text, self.nav.active_offset());
                }
            }
        }
        if let Some(message) = &self.status {
            views::draw_status(f, area, &self.theme, message);
        }
    }

    /// Lines in whatever the current mode scrolls over.
    pub(super) fn content_len(&self) -> usize {
        match self.nav.mode {
            Mode::Toc => self.entries.len(),
            Mode::Chapter => self
                .nav
                .active_chapter
                .and_then(|idx| self.chapters.get(&idx))
                .map_or(0, |c| c.lines.len()),
        }
    }

    /// Jump from the contents list into the selected chapter, rendering
    /// it on first visit. The title pseudo-row stays put.
    pub(super) fn enter_chapter(&mut self, width: usize, h: usize) {
        paging::clamp_toc(&mut self.nav, self.entries.len(), h);
        let selected = self.nav.selected_entry();
        let Some(entry) = self.entries.get(selected) else {
            return;
        };
        let Some(path) = entry.source_path.clone() else {
            return;
        };
        if !self.chapters.contains_key(&selected) {
            let text = match self.container.read_to_string(&path) {
                Ok(html) => {
                    tracing::debug!(chapter = selected, %path, "rendering chapter");
                    render_chapter(&html, &path, Some(width.max(1)))
                }
                Err(err) => {
                    tracing::warn!(chapter = selected, %path, %err, "chapter read failed");
                    ChapterText {
                        lines: vec![format!("[unreadable chapter: {err}]")],
                        image_refs: Vec::new(),
                    }
                }
            };
            self.chapters.insert(selected, text);
        }
        self.nav.active_chapter = Some(selected);
        self.nav.mode = Mode::Chapter;
    }

    /// Hand every image referenced on the visible page to the external
    /// viewer. Failures become a status line, never an exit.
    pub(super) fn open_visible_images(&mut self, h: usize) {
        let Some(idx) = self.nav.active_chapter else {
            return;
        };
        let Some(text) = self.chapters.get(&idx) else {
            return;
        };
        let offset = self.nav.active_offset().min(text.lines.len());
        let end = (offset + h).min(text.lines.len());
        let mut paths: Vec<String> = Vec::new();
        for line in &text.lines[offset..end] {
            for image in extract_image_refs(line) {
                if !paths.contains(&image.path) {
                    paths.push(image.path);
                }
            }
        }
        for path in paths {
            match self.container.read(&path) {
                Ok(bytes) => {
                    if let Err(err) = images::open_external(&bytes, &path) {
                        tracing::warn!(%path, %err, "image viewer handoff failed");
                        self.status = Some(format!("cannot open image: {path}"));
                    }
                }
                Err(ReaderError::EntryNotFound(_)) => {
                    self.status = Some(format!("image not found: {path}"));
                }
                Err(err) => {
                    tracing::warn!(%path, %err, "image read failed");
                    self.status = Some(format!("cannot read image: {path}"));
                }
            }
        }
    }
}
