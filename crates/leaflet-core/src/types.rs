/// One row of the table of contents. The first entry of a book is the
/// title pseudo-entry: it carries no `source_path` and cannot be opened
/// as a chapter. Every other entry points at a spine document, in
/// reading order, with its label taken from the navigation document
/// when one matched (empty otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub source_path: Option<String>,
}

impl TocEntry {
    pub fn is_title_row(&self) -> bool {
        self.source_path.is_none()
    }
}

/// A chapter rendered to plain text: wrapped lines plus every image
/// path referenced by the chapter, deduplicated, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChapterText {
    pub lines: Vec<String>,
    pub image_refs: Vec<String>,
}

impl ChapterText {
    pub(crate) fn record_image_ref(&mut self, path: &str) {
        if !self.image_refs.iter().any(|p| p == path) {
            self.image_refs.push(path.to_string());
        }
    }
}
