//! Segment trie over metric names
//!
//! Names are split on `.` and stored as a path of segment nodes. A node
//! carrying a record is terminal: its root-to-node path is a live name.
//!
//! Wildcard filtering walks the trie alongside the pattern segments instead
//! of matching every stored name: a literal segment descends into a single
//! child, `*` descends into every child. A match needs the whole pattern
//! consumed exactly at a terminal node, so `a.*` never matches `a.b.c`.
//!
//! Children are kept in a `BTreeMap`, so every traversal visits records in
//! lexicographic segment order.

use metrix_common::{is_valid_pattern, IndexRecord, SEGMENT_SEPARATOR, WILDCARD};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
    record: Option<IndexRecord>,
}

impl Node {
    /// A node with no record and no children is dead weight
    fn is_prunable(&self) -> bool {
        self.record.is_none() && self.children.is_empty()
    }

    fn count(&self) -> usize {
        1 + self.children.values().map(Node::count).sum::<usize>()
    }
}

/// In-memory trie of index records keyed by name segments
#[derive(Debug, Default)]
pub struct PatternTrie {
    root: Node,
    /// Number of terminal nodes
    len: usize,
}

impl PatternTrie {
    /// Create an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record stored under its name.
    ///
    /// Returns the record previously stored under that name. Records with
    /// an empty name are ignored.
    pub fn insert(&mut self, record: IndexRecord) -> Option<IndexRecord> {
        if record.name.is_empty() {
            return None;
        }

        let mut node = &mut self.root;
        for segment in record.name.split(SEGMENT_SEPARATOR) {
            node = node.children.entry(segment.to_string()).or_default();
        }

        let previous = node.record.replace(record);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Remove the record stored under `name`, pruning branches left empty.
    ///
    /// Returns the removed record, or `None` if the name was not live.
    pub fn remove(&mut self, name: &str) -> Option<IndexRecord> {
        let segments: Vec<&str> = name.split(SEGMENT_SEPARATOR).collect();
        let removed = Self::remove_path(&mut self.root, &segments);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn remove_path(node: &mut Node, segments: &[&str]) -> Option<IndexRecord> {
        let Some((head, rest)) = segments.split_first() else {
            return node.record.take();
        };

        let child = node.children.get_mut(*head)?;
        let removed = Self::remove_path(child, rest);
        if removed.is_some() && child.is_prunable() {
            node.children.remove(*head);
        }
        removed
    }

    /// Get the record stored under `name`
    pub fn get(&self, name: &str) -> Option<&IndexRecord> {
        let mut node = &self.root;
        for segment in name.split(SEGMENT_SEPARATOR) {
            node = node.children.get(segment)?;
        }
        node.record.as_ref()
    }

    /// Check whether `name` is live
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of live names
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the trie holds no live names
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Collect every record whose name matches `pattern`.
    ///
    /// Each pattern segment is either a literal or `*`, which matches
    /// exactly one segment. Empty patterns and patterns containing empty
    /// segments match nothing.
    pub fn filter(&self, pattern: &str) -> Vec<&IndexRecord> {
        let mut matched = Vec::new();
        if !is_valid_pattern(pattern) {
            return matched;
        }

        let segments: Vec<&str> = pattern.split(SEGMENT_SEPARATOR).collect();
        Self::collect_matches(&self.root, &segments, &mut matched);
        matched
    }

    fn collect_matches<'a>(node: &'a Node, pattern: &[&str], matched: &mut Vec<&'a IndexRecord>) {
        let Some((head, rest)) = pattern.split_first() else {
            if let Some(record) = &node.record {
                matched.push(record);
            }
            return;
        };

        if *head == WILDCARD {
            for child in node.children.values() {
                Self::collect_matches(child, rest, matched);
            }
        } else if let Some(child) = node.children.get(*head) {
            Self::collect_matches(child, rest, matched);
        }
    }

    /// All live records
    pub fn records(&self) -> Vec<&IndexRecord> {
        let mut records = Vec::with_capacity(self.len);
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Some(record) = &node.record {
                records.push(record);
            }
            // Reverse so children pop in key order
            stack.extend(node.children.values().rev());
        }
        records
    }

    /// Remove every record
    pub fn clear(&mut self) {
        self.root = Node::default();
        self.len = 0;
    }

    /// Number of allocated nodes, root included
    pub fn node_count(&self) -> usize {
        self.root.count()
    }
}
