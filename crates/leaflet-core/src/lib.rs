pub mod container;
pub mod error;
pub mod paging;
pub mod render;
pub mod toc;
pub mod types;

mod paths;

pub use container::Container;
pub use error::ReaderError;
pub use types::{ChapterText, TocEntry};
