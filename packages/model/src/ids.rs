use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::document::PageDocument;

/// Identifier of a section or component.
///
/// Ids are unique across the whole document, not just within a container.
/// An empty id means "not yet assigned"; the editor allocates one on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of a page, supplied by whoever owns persistence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Generate the id seed for a page using CRC32
pub fn page_seed(page_id: &str) -> String {
    let mut buff = String::from(page_id);
    if !page_id.starts_with("page://") {
        buff = format!("page://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id allocator for the nodes of one page
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Page seed (CRC32)
    count: u64,   // Sequential counter
}

impl IdGenerator {
    pub fn new(page_id: &str) -> Self {
        Self {
            seed: page_seed(page_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Create a generator whose counter starts past every id this page's
    /// seed has already produced in `doc`.
    pub fn for_document(page_id: &str, doc: &PageDocument) -> Self {
        let mut gen = Self::new(page_id);
        let prefix = format!("{}-", gen.seed);

        gen.count = doc
            .ids()
            .filter_map(|id| id.as_str().strip_prefix(&prefix))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        gen
    }

    /// Generate next sequential id. The counter wraps at `u64::MAX`; use
    /// [`IdGenerator::next_unused`] when ids must not collide with a document.
    pub fn new_id(&mut self) -> NodeId {
        self.count = self.count.wrapping_add(1);
        NodeId(format!("{}-{}", self.seed, self.count))
    }

    /// Generate the next id that is not already present in `doc`.
    pub fn next_unused(&mut self, doc: &PageDocument) -> NodeId {
        loop {
            let id = self.new_id();
            if !doc.contains_id(id.as_str()) {
                return id;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
