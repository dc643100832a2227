mod collection;
mod file_metadata;

pub use collection::{Collection, CollectionWithCount};
pub use file_metadata::{FileMetadata, NewFileMetadata};
