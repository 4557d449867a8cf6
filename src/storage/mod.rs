mod kv;
mod memory;
mod schema;
mod types;

pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use schema::Database;
pub use types::{DatabaseError, StoreError};
