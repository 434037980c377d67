//! Listing filter for raindrops and highlights.

use serde::{Deserialize, Serialize};

use crate::types::is_zero;

/// Sentinel for an unset `page` / `perpage`.
pub const UNSET: i64 = -1;

fn unset() -> i64 {
    UNSET
}

fn is_unset(value: &i64) -> bool {
    *value < 0
}

/// Query parameters for listing raindrops.
///
/// `collection_id` selects the route (`0` lists every collection); the
/// remaining fields feed the query string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Filter {
    #[serde(rename = "collectionId", default, skip_serializing_if = "is_zero")]
    pub collection_id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sort: String,
    #[serde(default = "unset", skip_serializing_if = "is_unset")]
    pub page: i64,
    #[serde(default = "unset", skip_serializing_if = "is_unset")]
    pub perpage: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<i64>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            collection_id: 0,
            search: String::new(),
            sort: String::new(),
            page: UNSET,
            perpage: UNSET,
            ids: Vec::new(),
        }
    }
}

impl Filter {
    pub fn for_collection(collection_id: i64) -> Self {
        Self {
            collection_id,
            ..Self::default()
        }
    }

    /// Render `?sort=..&page=..&perpage=..&search=..`, keeping only the
    /// parameters that are set. Always starts with `?`, so an empty filter
    /// renders as a bare `?`.
    pub fn query_string(&self) -> String {
        let mut params = Vec::with_capacity(4);
        if !self.sort.is_empty() {
            params.push(format!("sort={}", urlencoding::encode(&self.sort)));
        }
        if !is_unset(&self.page) {
            params.push(format!("page={}", self.page));
        }
        if !is_unset(&self.perpage) {
            params.push(format!("perpage={}", self.perpage));
        }
        if !self.search.is_empty() {
            params.push(format!("search={}", urlencoding::encode(&self.search)));
        }
        format!("?{}", params.join("&"))
    }
}
