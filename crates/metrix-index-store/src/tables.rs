//! Redb table definitions for persistent index storage.

use redb::TableDefinition;

// Key: full dotted metric name, Value: bincode-encoded StoredIndex
pub const INDEXES: TableDefinition<&str, &[u8]> = TableDefinition::new("indexes");
