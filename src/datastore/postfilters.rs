//! Ways to filter posts based on their fields. Filter semantics work just like SQL:
//! If a field is unset, its filter won't be applied.
//! If set, filter out posts that don't match the filter.
use chrono::{offset::Utc, DateTime};
use serde::Deserialize;

/// Filters that can be applied to queries on the datastore.
#[derive(Deserialize, Debug, Eq, PartialEq)]
pub struct PostFilters {
    pub text_contains: Option<String>,
    pub created_before: Option<DateTime<Utc>>,
    pub id: Option<i32>,
    pub author_id: Option<i32>,
    /// Maximum number of posts to let match the filter
    #[serde(default = "default_limit")]
    pub limit: u8,
}

impl Default for PostFilters {
    fn default() -> Self {
        Self {
            text_contains: None,
            created_before: None,
            id: None,
            author_id: None,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> u8 {
    100
}
