use kuchiki::{traits::*, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::paths::resolve_sibling;
use crate::types::ChapterText;

// <br> inside a paragraph; becomes a line break without the blank line
// a paragraph boundary gets.
const BR_MARKER: char = '\x1D';

/// Render a chapter document to wrapped plain text.
///
/// Markup is stripped and inline whitespace collapsed; block elements
/// become paragraph boundaries (a blank line). Inline images turn into
/// `[img="<path>" "<alt>"]` placeholders, with the path resolved
/// against the chapter's directory and recorded in `image_refs`.
/// Anchor text is kept, hrefs are dropped. `wrap_col == None` disables
/// wrapping (dump mode). Malformed markup never fails: whatever text
/// the parser recovers is rendered.
pub fn render_chapter(html: &str, chapter_path: &str, wrap_col: Option<usize>) -> ChapterText {
    let doc = kuchiki::parse_html().one(html.to_string());
    let body = doc
        .select("body")
        .ok()
        .and_then(|mut bodies| bodies.next())
        .map(|body| body.as_node().clone())
        .unwrap_or_else(|| doc.clone());
    let mut flow = FlowBuilder::new(chapter_path);
    flow.walk(&body);
    flow.finish(wrap_col)
}

/// An image placeholder recovered from a rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: String,
    pub alt: String,
}

static IMG_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\[img="([^"]+)" "([^"]*)"\]"#).expect("placeholder pattern"));

/// Parse every image placeholder out of a rendered line. Inverse of the
/// placeholder format emitted by `render_chapter`.
pub fn extract_image_refs(line: &str) -> Vec<ImageRef> {
    IMG_PLACEHOLDER
        .captures_iter(line)
        .map(|cap| ImageRef {
            path: cap[1].to_string(),
            alt: cap[2].to_string(),
        })
        .collect()
}

struct FlowBuilder {
    chapter_path: String,
    paragraphs: Vec<String>,
    current: String,
    pending_space: bool,
    image_refs: Vec<String>,
}

impl FlowBuilder {
    fn new(chapter_path: &str) -> Self {
        Self {
            chapter_path: chapter_path.to_string(),
            paragraphs: Vec::new(),
            current: String::new(),
            pending_space: false,
            image_refs: Vec::new(),
        }
    }

    fn walk(&mut self, node: &NodeRef) {
        if let Some(text) = node.as_text() {
            self.push_text(&text.borrow());
            return;
        }
        let Some(el) = node.as_element() else {
            for child in node.children() {
                self.walk(&child);
            }
            return;
        };
        let tag = el.name.local.to_lowercase();
        match tag.as_str() {
            "script" | "style" | "head" | "title" => {}
            "br" => self.current.push(BR_MARKER),
            "img" => {
                let attrs = el.attributes.borrow();
                let src = attrs.get("src").unwrap_or("");
                if !src.is_empty() {
                    let resolved = resolve_sibling(&self.chapter_path, src);
                    let alt = attrs.get("alt").unwrap_or("");
                    self.push_token(&format_placeholder(&resolved, alt));
                    if !self.image_refs.iter().any(|p| p == &resolved) {
                        self.image_refs.push(resolved);
                    }
                }
            }
            // Anchors contribute only their text; the href and any
            // anchor-scoped state end with the element.
            "a" => {
                for child in node.children() {
                    self.walk(&child);
                }
            }
            _ if is_block_tag(&tag) => {
                self.flush_paragraph();
                for child in node.children() {
                    self.walk(&child);
                }
                self.flush_paragraph();
            }
            _ => {
                for child in node.children() {
                    self.walk(&child);
                }
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                self.pending_space = true;
            } else {
                self.push_space_if_pending();
                self.current.push(ch);
            }
        }
    }

    fn push_token(&mut self, token: &str) {
        self.push_space_if_pending();
        self.current.push_str(token);
        self.pending_space = true;
    }

    fn push_space_if_pending(&mut self) {
        if self.pending_space {
            if matches!(self.current.chars().last(), Some(c) if c != BR_MARKER) {
                self.current.push(' ');
            }
            self.pending_space = false;
        }
    }

    fn flush_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.current);
        self.pending_space = false;
        if paragraph.chars().any(|c| c != BR_MARKER && !c.is_whitespace()) {
            self.paragraphs.push(paragraph);
        }
    }

    fn finish(mut self, wrap_col: Option<usize>) -> ChapterText {
        self.flush_paragraph();
        let mut text = ChapterText::default();
        for (i, paragraph) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                text.lines.push(String::new());
            }
            for segment in paragraph.split(BR_MARKER) {
                let segment = segment.trim();
                match wrap_col {
                    Some(col) if col > 0 => wrap_segment(segment, col, &mut text.lines),
                    _ => text.lines.push(segment.to_string()),
                }
            }
        }
        for path in self.image_refs {
            text.record_image_ref(&path);
        }
        text
    }
}

fn format_placeholder(path: &str, alt: &str) -> String {
    format!("[img=\"{}\" \"{}\"]", path, alt)
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "ul"
            | "ol"
            | "dl"
            | "dt"
            | "dd"
            | "blockquote"
            | "pre"
            | "table"
            | "tr"
            | "figure"
            | "figcaption"
            | "section"
            | "article"
            | "aside"
            | "header"
            | "footer"
            | "hr"
    )
}

/// Greedy word wrap measured in graphemes. Image placeholders wrap as a
/// single unbreakable token so they stay machine-parseable; any token
/// wider than the column gets a line of its own, unbroken.
fn wrap_segment(segment: &str, col: usize, out: &mut Vec<String>) {
    if segment.is_empty() {
        out.push(String::new());
        return;
    }
    let mut line = String::new();
    let mut line_width = 0usize;
    for token in tokenize(segment) {
        let width = token.graphemes(true).count();
        if line_width == 0 {
            line.push_str(token);
            line_width = width;
        } else if line_width + 1 + width <= col {
            line.push(' ');
            line.push_str(token);
            line_width += 1 + width;
        } else {
            out.push(std::mem::take(&mut line));
            line.push_str(token);
            line_width = width;
        }
    }
    if !line.is_empty() {
        out.push(line);
    }
}

fn tokenize(segment: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut cursor = 0;
    for m in IMG_PLACEHOLDER.find_iter(segment) {
        tokens.extend(segment[cursor..m.start()].split_whitespace());
        tokens.push(m.as_str());
        cursor = m.end();
    }
    tokens.extend(segment[cursor..].split_whitespace());
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_collapses_whitespace() {
        let html = "<html><body><p>Hello   <em>brave</em>\n  world.</p></body></html>";
        let text = render_chapter(html, "ch.xhtml", None);
        assert_eq!(text.lines, vec!["Hello brave world."]);
    }

    #[test]
    fn block_boundaries_become_blank_lines() {
        let html = "<body><p>First.</p><p>Second.</p></body>";
        let text = render_chapter(html, "ch.xhtml", None);
        assert_eq!(text.lines, vec!["First.", "", "Second."]);
    }

    #[test]
    fn br_breaks_the_line_without_a_blank() {
        let html = "<body><p>one<br/>two</p></body>";
        let text = render_chapter(html, "ch.xhtml", None);
        assert_eq!(text.lines, vec!["one", "two"]);
    }

    #[test]
    fn wraps_to_the_column() {
        let html = "<body><p>alpha beta gamma delta epsilon</p></body>";
        let text = render_chapter(html, "ch.xhtml", Some(11));
        assert_eq!(text.lines, vec!["alpha beta", "gamma delta", "epsilon"]);
        for line in &text.lines {
            assert!(line.graphemes(true).count() <= 11);
        }
    }

    #[test]
    fn unbounded_mode_never_wraps() {
        let long = "word ".repeat(200);
        let html = format!("<body><p>{}</p></body>", long);
        let text = render_chapter(&html, "ch.xhtml", None);
        assert_eq!(text.lines.len(), 1);
    }

    #[test]
    fn images_emit_placeholders_and_refs() {
        let html = r#"<body><p>Before <img src="pics/a.png" alt="a cat"/> after.</p></body>"#;
        let text = render_chapter(html, "OEBPS/ch1.xhtml", None);
        assert_eq!(
            text.lines,
            vec![r#"Before [img="OEBPS/pics/a.png" "a cat"] after."#]
        );
        assert_eq!(text.image_refs, vec!["OEBPS/pics/a.png"]);
    }

    #[test]
    fn repeated_images_are_recorded_once() {
        let html = r#"<body><p><img src="a.png" alt=""/></p><p><img src="a.png" alt=""/></p></body>"#;
        let text = render_chapter(html, "ch.xhtml", None);
        assert_eq!(text.image_refs, vec!["a.png"]);
    }

    #[test]
    fn placeholders_survive_wrapping_intact() {
        let html = r#"<body><p>xx <img src="a.png" alt="alt text here"/> yy</p></body>"#;
        let text = render_chapter(html, "ch.xhtml", Some(10));
        let joined = text.lines.join("\n");
        assert!(joined.contains(r#"[img="a.png" "alt text here"]"#));
        let refs: Vec<_> = text
            .lines
            .iter()
            .flat_map(|line| extract_image_refs(line))
            .collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].path, "a.png");
    }

    #[test]
    fn anchor_text_kept_href_dropped() {
        let html = r#"<body><p>See <a href="other.xhtml#x">the appendix</a> now.</p></body>"#;
        let text = render_chapter(html, "ch.xhtml", None);
        assert_eq!(text.lines, vec!["See the appendix now."]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let html = r#"<body><h1>T</h1><p>Some <b>text</b> and <img src="i.png" alt="i"/>.</p></body>"#;
        let a = render_chapter(html, "ch.xhtml", Some(20));
        let b = render_chapter(html, "ch.xhtml", Some(20));
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_markup_degrades_to_text() {
        let html = "<body><p>unclosed <em>emphasis<p>next one";
        let text = render_chapter(html, "ch.xhtml", None);
        let joined = text.lines.join(" ");
        assert!(joined.contains("unclosed emphasis"));
        assert!(joined.contains("next one"));
    }

    #[test]
    fn extract_image_refs_recovers_the_path() {
        let refs = extract_image_refs(r#"text [img="a.png" "alt text"] more"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].path, "a.png");
        assert_eq!(refs[0].alt, "alt text");
    }

    #[test]
    fn extract_ignores_lines_without_placeholders() {
        assert!(extract_image_refs("plain [img=] text").is_empty());
    }
}
