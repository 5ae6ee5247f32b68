use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(zip::result::ZipError),
    #[error("not an EPUB file: {0}")]
    NotAnEpub(PathBuf),
    #[error("archive entry not found: {0}")]
    EntryNotFound(String),
    #[error("malformed package: {0}")]
    MalformedPackage(String),
    #[error("parse error: {0}")]
    Parse(String),
}
