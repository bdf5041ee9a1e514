//! Metrix Index Store
//!
//! Embedded store for hierarchical metric names (`a.b.c.d`) and their
//! index records.
//!
//! # Design
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      IndexStore                         │
//! │  ┌─────────────────────────────────────────────────────┐│
//! │  │        PatternTrie (in-memory, one node/segment)    ││
//! │  │  • get / has / len served here                      ││
//! │  │  • wildcard filter walks segments                   ││
//! │  └─────────────────────────────────────────────────────┘│
//! │                          │                              │
//! │  ┌─────────────────────────────────────────────────────┐│
//! │  │           Backend (redb, one table)                 ││
//! │  │  • name -> bincode(stamp, score, average)           ││
//! │  │  • every write committed before the trie changes    ││
//! │  │  • scanned in full on open / load                   ││
//! │  └─────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Write Path
//! 1. Encode and commit to the backend
//! 2. Update the trie
//!
//! # Read Path
//! 1. Look up the trie, never the backend

pub mod backend;
pub mod codec;
pub mod store;
pub mod tables;
pub mod trie;

// Re-exports
pub use backend::{Backend, BackendError, BackendResult, RedbBackend};
pub use store::{CorruptEntry, IndexStore, LoadReport};
pub use trie::PatternTrie;
