use std::io::Write;
use std::path::Path;

/// Hand raw image bytes to the system's external viewer.
///
/// Writes a temp file carrying the suggested name's extension so the
/// viewer can sniff the format, then launches detached: the handoff
/// returns as soon as the process is spawned. The temp file is kept;
/// the OS temp dir owns its cleanup.
pub fn open_external(bytes: &[u8], suggested_name: &str) -> std::io::Result<()> {
    let ext = Path::new(suggested_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("img");
    let mut file = tempfile::Builder::new()
        .prefix("leaflet-")
        .suffix(&format!(".{ext}"))
        .tempfile()?;
    file.write_all(bytes)?;
    let path = file
        .into_temp_path()
        .keep()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    tracing::debug!(path = %path.display(), "handing image to external viewer");
    open::that_detached(&path)
}
