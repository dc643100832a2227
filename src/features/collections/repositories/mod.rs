mod collection_repository;

pub use collection_repository::{CollectionRepository, PgCollectionRepository};
