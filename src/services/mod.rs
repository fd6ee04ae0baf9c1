// Service exports
pub mod cache;
pub mod postgres;
pub mod storage;

pub use cache::RedisCache;
pub use postgres::PostgresStore;
pub use storage::{ObjectStore, S3ObjectStore, StorageError};
