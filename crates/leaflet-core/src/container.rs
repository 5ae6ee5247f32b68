use std::{cell::RefCell, fs::File, io::Read, path::Path};

use zip::{result::ZipError, ZipArchive};

use crate::error::ReaderError;

/// An opened EPUB container. Wraps the zip archive behind a `RefCell`
/// so read methods can take `&self`; the file handle lives for the
/// session and the archive is never written to.
#[derive(Debug)]
pub struct Container {
    archive: RefCell<ZipArchive<File>>,
}

impl Container {
    /// Open an EPUB file. Fails with `NotAnEpub` when the path is not a
    /// regular file carrying an `.epub` extension.
    pub fn open(path: &Path) -> Result<Self, ReaderError> {
        if !is_epub_path(path) {
            return Err(ReaderError::NotAnEpub(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let archive = ZipArchive::new(file).map_err(ReaderError::Zip)?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read a whole archive member. No partial reads.
    pub fn read(&self, entry: &str) -> Result<Vec<u8>, ReaderError> {
        let mut archive = self.archive.borrow_mut();
        let mut member = archive.by_name(entry).map_err(|e| entry_error(entry, e))?;
        let mut buf = Vec::new();
        member.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read a member as text. Invalid UTF-8 is replaced rather than
    /// rejected; chapter parsing downstream is best-effort anyway.
    pub fn read_to_string(&self, entry: &str) -> Result<String, ReaderError> {
        let bytes = self.read(entry)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn has_entry(&self, entry: &str) -> bool {
        self.archive.borrow_mut().by_name(entry).is_ok()
    }
}

fn is_epub_path(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("epub"))
            .unwrap_or(false)
}

fn entry_error(entry: &str, err: ZipError) -> ReaderError {
    match err {
        ZipError::FileNotFound => ReaderError::EntryNotFound(entry.to_string()),
        other => ReaderError::Zip(other),
    }
}
