//! Type-safe durable key-value storage for the AIMS storefront.
//!
//! Plays the role of the browser's local storage: a small set of fixed keys
//! (`aims-cart`, `order`, `delivery`) holding JSON documents that survive a
//! reload. Values are serialized automatically.
//!
//! # Example
//!
//! ```rust
//! use aims_cache::Cache;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Note {
//!     text: String,
//! }
//!
//! let cache = Cache::in_memory();
//! cache.set("note", &Note { text: "hi".into() }).unwrap();
//!
//! let note: Option<Note> = cache.get("note").unwrap();
//! assert_eq!(note, Some(Note { text: "hi".into() }));
//!
//! cache.delete("note").unwrap();
//! assert!(!cache.exists("note").unwrap());
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, MemoryStore, Store};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, MemoryStore, Store};
}
