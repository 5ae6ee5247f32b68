use std::path::{Component, Path, PathBuf};

/// Resolve an href against a directory, stripping any anchor fragment
/// and collapsing `.`/`..` components. Archive member names are always
/// forward-slash relative paths, so the result is returned as a string
/// key suitable for zip lookups.
pub(crate) fn resolve_from_dir(base_dir: &Path, href: &str) -> String {
    let path_part = strip_fragment(href);
    let joined = if path_part.is_empty() {
        base_dir.to_path_buf()
    } else {
        base_dir.join(path_part)
    };
    normalize_path(&joined).to_string_lossy().replace('\\', "/")
}

/// Resolve an href relative to another archive member (e.g. an image
/// `src` inside a chapter document).
pub(crate) fn resolve_sibling(base_file: &str, href: &str) -> String {
    let base_dir = Path::new(base_file).parent().unwrap_or(Path::new(""));
    resolve_from_dir(base_dir, href)
}

pub(crate) fn strip_fragment(href: &str) -> &str {
    href.split('#').next().unwrap_or(href)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            _ => out.push(comp.as_os_str()),
        }
    }
    out
}
