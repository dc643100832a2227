mod file;

pub use file::{CollectionArchive, FileDownload, IncomingFile};
