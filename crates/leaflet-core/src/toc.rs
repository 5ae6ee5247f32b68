use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kuchiki::traits::*;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;

use crate::container::Container;
use crate::error::ReaderError;
use crate::paths::{resolve_from_dir, resolve_sibling, strip_fragment};
use crate::types::TocEntry;

const CONTAINER_ENTRY: &str = "META-INF/container.xml";
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Build the ordered table of contents for an opened container.
///
/// The first entry is the book-title pseudo-entry (`source_path ==
/// None`); the rest follow the spine in reading order with labels
/// overlaid from the navigation document where one matches. A spine
/// idref missing from the manifest is fatal (`MalformedPackage`); a
/// missing navigation document only costs the labels.
pub fn build_table_of_contents(container: &Container) -> Result<Vec<TocEntry>, ReaderError> {
    let rootfile = locate_rootfile(container)?;
    let base = rootfile.parent().unwrap_or(Path::new("")).to_path_buf();
    let package = read_package(container, &rootfile)?;
    let labels = read_nav_labels(container, &package, &base);

    let mut entries = Vec::with_capacity(package.spine.len() + 1);
    entries.push(TocEntry {
        title: package.title.unwrap_or_default(),
        source_path: None,
    });
    for idref in &package.spine {
        let item = package
            .manifest
            .iter()
            .find(|item| &item.id == idref)
            .ok_or_else(|| {
                ReaderError::MalformedPackage(format!("spine idref {idref:?} missing from manifest"))
            })?;
        let href = resolve_from_dir(&base, &item.href);
        let title = labels.get(&href).cloned().unwrap_or_default();
        entries.push(TocEntry {
            title,
            source_path: Some(href),
        });
    }
    Ok(entries)
}

fn locate_rootfile(container: &Container) -> Result<PathBuf, ReaderError> {
    let xml = container.read_to_string(CONTAINER_ENTRY)?;
    let mut reader = XmlReader::from_str(&xml);
    let mut rootfile_path: Option<String> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name.contains("rootfile") {
                    for a in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(a.key.as_ref());
                        if key.contains("full-path") {
                            let val = a
                                .unescape_value()
                                .map_err(|e| ReaderError::Parse(e.to_string()))?;
                            rootfile_path = Some(val.into_owned());
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReaderError::Parse(e.to_string())),
            _ => {}
        }
    }
    let root = rootfile_path
        .ok_or_else(|| ReaderError::MalformedPackage("missing rootfile in container.xml".into()))?;
    Ok(PathBuf::from(root))
}

struct ManifestItem {
    id: String,
    href: String,
    media_type: Option<String>,
    properties: Option<String>,
}

struct Package {
    title: Option<String>,
    manifest: Vec<ManifestItem>,
    spine: Vec<String>,
}

impl Package {
    fn nav_href(&self) -> Option<&str> {
        self.manifest
            .iter()
            .find(|item| {
                item.properties
                    .as_deref()
                    .map(properties_has_nav)
                    .unwrap_or(false)
            })
            .map(|item| item.href.as_str())
    }

    fn ncx_href(&self) -> Option<&str> {
        self.manifest
            .iter()
            .find(|item| {
                item.media_type
                    .as_deref()
                    .map(|mt| mt.eq_ignore_ascii_case(NCX_MEDIA_TYPE))
                    .unwrap_or(false)
            })
            .map(|item| item.href.as_str())
    }
}

fn read_package(container: &Container, opf_path: &Path) -> Result<Package, ReaderError> {
    let entry = opf_path.to_string_lossy().replace('\\', "/");
    let xml = container.read_to_string(&entry)?;
    let mut reader = XmlReader::from_str(&xml);
    let mut package = Package {
        title: None,
        manifest: Vec::new(),
        spine: Vec::new(),
    };
    let mut in_metadata = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                handle_package_event(&mut reader, &e, false, &mut in_metadata, &mut package)?;
            }
            Ok(Event::Empty(e)) => {
                handle_package_event(&mut reader, &e, true, &mut in_metadata, &mut package)?;
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if local_name(&name) == "metadata" {
                    in_metadata = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReaderError::Parse(e.to_string())),
            _ => {}
        }
    }
    Ok(package)
}

fn handle_package_event(
    reader: &mut XmlReader<&[u8]>,
    e: &BytesStart<'_>,
    is_empty: bool,
    in_metadata: &mut bool,
    package: &mut Package,
) -> Result<(), ReaderError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let local = local_name(&name);

    if local == "metadata" {
        *in_metadata = true;
        return Ok(());
    }

    if local == "item" {
        let mut id: Option<String> = None;
        let mut href: Option<String> = None;
        let mut media_type: Option<String> = None;
        let mut properties: Option<String> = None;
        for a in e.attributes().flatten() {
            let key = String::from_utf8_lossy(a.key.as_ref());
            let attr = local_name(&key);
            let val = a
                .unescape_value()
                .map_err(|e| ReaderError::Parse(e.to_string()))?;
            let sval = val.into_owned();
            match attr {
                "id" => id = Some(sval),
                "href" => href = Some(sval),
                "media-type" => media_type = Some(sval),
                "properties" => properties = Some(sval),
                _ => {}
            }
        }
        if let (Some(id), Some(href)) = (id, href) {
            package.manifest.push(ManifestItem {
                id,
                href,
                media_type,
                properties,
            });
        }
        return Ok(());
    }

    if local == "itemref" {
        for a in e.attributes().flatten() {
            let key = String::from_utf8_lossy(a.key.as_ref());
            if local_name(&key) != "idref" {
                continue;
            }
            let val = a
                .unescape_value()
                .map_err(|e| ReaderError::Parse(e.to_string()))?;
            let sval = val.into_owned();
            if !sval.is_empty() {
                package.spine.push(sval);
            }
        }
        return Ok(());
    }

    if *in_metadata && local == "title" && package.title.is_none() && !is_empty {
        if let Some(text) = read_text_value(reader) {
            let text = collapse_whitespace(&text);
            if !text.is_empty() {
                package.title = Some(text);
            }
        }
    }

    Ok(())
}

/// Label lookup: resolved chapter path (fragment stripped) to display
/// label. Tries the EPUB3 nav document first, then the NCX; either may
/// be absent or unreadable, in which case the map stays empty.
fn read_nav_labels(container: &Container, package: &Package, base: &Path) -> HashMap<String, String> {
    if let Some(href) = package.nav_href() {
        let entry = resolve_from_dir(base, href);
        if let Ok(html) = container.read_to_string(&entry) {
            let labels = parse_epub3_nav(&html, &entry);
            if !labels.is_empty() {
                return labels;
            }
        }
    }
    if let Some(href) = package.ncx_href() {
        let entry = resolve_from_dir(base, href);
        if let Ok(xml) = container.read_to_string(&entry) {
            let labels = parse_ncx(&xml, &entry);
            if !labels.is_empty() {
                return labels;
            }
        }
    }
    HashMap::new()
}

fn parse_epub3_nav(html: &str, nav_path: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let doc = kuchiki::parse_html().one(html.to_string());
    // Prefer the toc <nav>; fall back to every anchor in the document.
    let scope = doc
        .select("nav")
        .ok()
        .and_then(|mut navs| navs.next())
        .map(|nav| nav.as_node().clone())
        .unwrap_or_else(|| doc.clone());
    let Ok(anchors) = scope.select("a[href]") else {
        return map;
    };
    for anchor in anchors {
        let href = {
            let attrs = anchor.attributes.borrow();
            attrs.get("href").map(|s| s.to_string())
        };
        let Some(href) = href else { continue };
        let label = collapse_whitespace(&anchor.as_node().text_contents());
        if label.is_empty() {
            continue;
        }
        let key = resolve_sibling(nav_path, strip_fragment(&href));
        map.entry(key).or_insert(label);
    }
    map
}

fn parse_ncx(xml: &str, ncx_path: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut reader = XmlReader::from_str(xml);
    let mut current_label: Option<String> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name.ends_with("text") {
                    if let Ok(Event::Text(t)) = reader.read_event() {
                        current_label =
                            Some(collapse_whitespace(&String::from_utf8_lossy(t.as_ref())));
                    }
                } else if name.ends_with("content") {
                    for a in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(a.key.as_ref());
                        if !key.ends_with("src") {
                            continue;
                        }
                        if let Ok(val) = a.unescape_value() {
                            let src = strip_fragment(val.as_ref()).to_string();
                            if src.is_empty() {
                                continue;
                            }
                            if let Some(label) = current_label.clone() {
                                if !label.is_empty() {
                                    let full = resolve_sibling(ncx_path, &src);
                                    map.entry(full).or_insert(label);
                                }
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    map
}

fn properties_has_nav(properties: &str) -> bool {
    properties
        .split_whitespace()
        .any(|prop| prop.eq_ignore_ascii_case("nav"))
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn read_text_value(reader: &mut XmlReader<&[u8]>) -> Option<String> {
    match reader.read_event() {
        Ok(Event::Text(t)) => Some(String::from_utf8_lossy(t.as_ref()).to_string()),
        Ok(Event::CData(t)) => Some(String::from_utf8_lossy(t.as_ref()).to_string()),
        _ => None,
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out.trim().to_string()
}
