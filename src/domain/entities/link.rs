//! Link entities returned by the group link listing endpoint.

use serde::Deserialize;

/// A shortened link owned by a group.
///
/// Only `id` is used by the aggregation pipeline; the remaining fields are
/// decoded so the listing can be logged and inspected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Link {
    /// Opaque link identifier, e.g. `bit.ly/2Xyz`.
    pub id: String,
    pub link: String,
    pub long_url: String,
    pub title: Option<String>,
    pub created_at: String,
    pub archived: bool,
    pub tags: Vec<String>,
}

impl Link {
    /// Creates a link with only its identifier set.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Pagination block attached to every link page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub total: u64,
    pub size: u32,
    pub page: u32,
    pub prev: String,
    pub next: String,
}

/// One page of links for a group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub pagination: Pagination,
}

impl LinkPage {
    /// Builds a page from link ids and a continuation cursor.
    ///
    /// An empty `next` marks the final page.
    pub fn new<I, S>(ids: I, next: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let links: Vec<Link> = ids.into_iter().map(Link::with_id).collect();
        Self {
            pagination: Pagination {
                size: links.len() as u32,
                next: next.into(),
                ..Pagination::default()
            },
            links,
        }
    }

    /// Returns the continuation cursor, or `None` on the last page.
    pub fn next_cursor(&self) -> Option<&str> {
        let next = self.pagination.next.trim();
        (!next.is_empty()).then_some(next)
    }
}
