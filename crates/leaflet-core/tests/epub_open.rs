use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use leaflet_core::toc::build_table_of_contents;
use leaflet_core::{Container, ReaderError};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

const OPF_WITH_NCX: &str = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Sample Book</dc:title>
  </metadata>
  <manifest>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch3" href="text/ch3.xhtml" media-type="application/xhtml+xml"/>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="ch1"/>
    <itemref idref="ch2"/>
    <itemref idref="ch3"/>
  </spine>
</package>"#;

// Labels for ch1 and ch2 only; ch3 is in the spine but not the NCX.
const NCX: &str = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <navMap>
    <navPoint id="p1" playOrder="1">
      <navLabel><text>Chapter One</text></navLabel>
      <content src="text/ch1.xhtml"/>
    </navPoint>
    <navPoint id="p2" playOrder="2">
      <navLabel><text>Chapter Two</text></navLabel>
      <content src="text/ch2.xhtml#start"/>
    </navPoint>
  </navMap>
</ncx>"#;

const CHAPTER_HTML: &str = r#"<html><body>
<h1>Chapter One</h1>
<p>Some opening text with an <img src="../images/map.png" alt="map"/> inline.</p>
</body></html>"#;

fn write_epub(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, content) in entries {
        zip.start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn sample_epub(dir: &Path) -> PathBuf {
    let path = dir.join("sample.epub");
    write_epub(
        &path,
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            ("OEBPS/content.opf", OPF_WITH_NCX),
            ("OEBPS/toc.ncx", NCX),
            ("OEBPS/text/ch1.xhtml", CHAPTER_HTML),
            ("OEBPS/text/ch2.xhtml", "<html><body><p>two</p></body></html>"),
            ("OEBPS/text/ch3.xhtml", "<html><body><p>three</p></body></html>"),
            ("OEBPS/images/map.png", "not really a png"),
        ],
    );
    path
}

#[test]
fn toc_follows_spine_order_with_a_title_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample_epub(dir.path());
    let container = Container::open(&path).unwrap();
    let entries = build_table_of_contents(&container).unwrap();

    assert_eq!(entries.len(), 4); // title row + 3 spine items
    assert!(entries[0].source_path.is_none());
    assert_eq!(entries[0].title, "Sample Book");
    assert_eq!(
        entries[1].source_path.as_deref(),
        Some("OEBPS/text/ch1.xhtml")
    );
    assert_eq!(entries[1].title, "Chapter One");
    assert_eq!(entries[2].title, "Chapter Two");
    // In the spine but absent from the NCX: empty title, not an error.
    assert_eq!(entries[3].title, "");
    assert_eq!(
        entries[3].source_path.as_deref(),
        Some("OEBPS/text/ch3.xhtml")
    );
}

#[test]
fn missing_nav_document_degrades_to_empty_titles() {
    let opf = OPF_WITH_NCX
        .replace(
            r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
            "",
        )
        .replace(r#"<spine toc="ncx">"#, "<spine>");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nolabels.epub");
    write_epub(
        &path,
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            ("OEBPS/content.opf", &opf),
            ("OEBPS/text/ch1.xhtml", "<p>1</p>"),
            ("OEBPS/text/ch2.xhtml", "<p>2</p>"),
            ("OEBPS/text/ch3.xhtml", "<p>3</p>"),
        ],
    );
    let container = Container::open(&path).unwrap();
    let entries = build_table_of_contents(&container).unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries[1..].iter().all(|e| e.title.is_empty()));
}

#[test]
fn spine_idref_missing_from_manifest_is_malformed() {
    let opf = OPF_WITH_NCX.replace(
        r#"<item id="ch2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>"#,
        "",
    );
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.epub");
    write_epub(
        &path,
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            ("OEBPS/content.opf", &opf),
        ],
    );
    let container = Container::open(&path).unwrap();
    let err = build_table_of_contents(&container).unwrap_err();
    assert!(matches!(err, ReaderError::MalformedPackage(_)));
}

#[test]
fn wrong_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.zip");
    write_epub(&path, &[("META-INF/container.xml", CONTAINER_XML)]);
    let err = Container::open(&path).unwrap_err();
    assert!(matches!(err, ReaderError::NotAnEpub(_)));
}

#[test]
fn nonexistent_path_is_rejected() {
    let err = Container::open(Path::new("/no/such/book.epub")).unwrap_err();
    assert!(matches!(err, ReaderError::NotAnEpub(_)));
}

#[test]
fn missing_member_is_entry_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample_epub(dir.path());
    let container = Container::open(&path).unwrap();
    let err = container.read("OEBPS/text/ch9.xhtml").unwrap_err();
    assert!(matches!(err, ReaderError::EntryNotFound(name) if name.contains("ch9")));
}

#[test]
fn members_are_read_whole() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample_epub(dir.path());
    let container = Container::open(&path).unwrap();
    let bytes = container.read("OEBPS/images/map.png").unwrap();
    assert_eq!(bytes, b"not really a png");
}

#[test]
fn chapter_renders_straight_from_the_container() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample_epub(dir.path());
    let container = Container::open(&path).unwrap();
    let entries = build_table_of_contents(&container).unwrap();

    let source = entries[1].source_path.as_deref().unwrap();
    let html = container.read_to_string(source).unwrap();
    let text = leaflet_core::render::render_chapter(&html, source, Some(40));
    assert!(text.lines.iter().any(|l| l.contains("Chapter One")));
    // Image src resolved relative to the chapter file.
    assert_eq!(text.image_refs, vec!["OEBPS/images/map.png"]);
    assert!(container.has_entry(&text.image_refs[0]));
}
