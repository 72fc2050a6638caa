pub mod cache;
pub mod db;

pub use cache::{CacheEntry, CacheError, LocalCache};
pub use db::{create_db, create_memory_db, DbError, DbPool};
