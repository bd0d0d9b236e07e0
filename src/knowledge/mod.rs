//! Policy document collection.
//!
//! - `types`: `Document` and its inputs
//! - `kv`: key-value persistence backends
//! - `store`: the ordered, whole-collection-persisted `DocumentStore`
//! - `seed`: built-in documents and the seed-wins merge
//! - `upload`: file upload to document conversion

pub mod kv;
pub mod seed;
pub mod store;
pub mod types;
pub mod upload;

pub use kv::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use store::DocumentStore;
pub use types::{Document, DocumentFormat, DocumentPatch, NewDocument};
