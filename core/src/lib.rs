//! Redis-backed term→document search index.
//!
//! A [`Store`] abstracts the key-value capabilities the index needs
//! (set membership, hash fields, key scans, atomic transactions);
//! [`Index`] writes and reads postings over it, and [`SearchResult`]
//! combines single-term lookups with AND/OR/MINUS set algebra.

pub mod counter;
pub mod error;
pub mod index;
pub mod memory;
pub mod redis;
pub mod search;
pub mod store;

pub use counter::{TermCounter, TermCounts};
pub use error::{Error, Result};
pub use index::Index;
pub use memory::MemoryStore;
pub use search::{SearchResult, SortOrder};
pub use store::{Command, Reply, Store, Transaction};

pub use self::redis::RedisStore;
