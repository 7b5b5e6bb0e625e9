//! Pagination metadata.
//!
//! Paginated collections carry page counters alongside their members. The
//! counters never land in the document body; they travel in the
//! [`Document`](crate::Document) meta side channel for whatever frames the
//! response to merge where it wants them.

use portray_schema::{Value, ValueMap};
use serde::{Deserialize, Serialize};

/// Page counters for one paginated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// The page being rendered, 1-based.
    pub current_page: u64,
    /// The following page, absent on the last page.
    pub next_page: Option<u64>,
    /// The preceding page, absent on the first page.
    pub prev_page: Option<u64>,
    /// Total number of pages.
    pub total_pages: u64,
    /// Total number of entries across all pages.
    pub total_count: u64,
}

impl PageInfo {
    /// Build counters for a page, deriving the neighbor pages.
    pub fn new(current_page: u64, total_pages: u64, total_count: u64) -> Self {
        Self {
            current_page,
            next_page: (current_page < total_pages).then(|| current_page + 1),
            prev_page: (current_page > 1).then(|| current_page - 1),
            total_pages,
            total_count,
        }
    }

    /// The counters as a value map, absent neighbors rendered as `Null`.
    pub fn to_value(&self) -> Value {
        let mut map = ValueMap::new();
        map.insert("current_page".to_string(), (self.current_page as i64).into());
        map.insert(
            "next_page".to_string(),
            self.next_page.map(|p| p as i64).into(),
        );
        map.insert(
            "prev_page".to_string(),
            self.prev_page.map(|p| p as i64).into(),
        );
        map.insert("total_pages".to_string(), (self.total_pages as i64).into());
        map.insert("total_count".to_string(), (self.total_count as i64).into());
        Value::Map(map)
    }
}

/// The capability a paginated collection type exposes.
///
/// Implementing this is what marks a collection as paginated; there is no
/// further probing.
pub trait Paginated {
    /// The page counters for the collection's current page.
    fn page_info(&self) -> PageInfo;
}
