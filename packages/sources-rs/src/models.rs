//! Wire shapes and lookup outcomes for the sources-api.

use std::fmt;

use serde::Deserialize;

/// Outcome of an existence check.
///
/// The inventory's answer is only trusted when it is definitive: 200 maps to
/// `Present`, 404 to `Absent`. Everything else surfaces as a
/// [`LookupError`](crate::LookupError) so callers never mistake an outage for
/// a missing source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceExistence {
    /// The inventory confirmed the source exists.
    Present,
    /// The inventory confirmed the source does not exist.
    Absent,
}

impl SourceExistence {
    pub fn is_present(self) -> bool {
        matches!(self, SourceExistence::Present)
    }
}

/// The kinds of sub-resources a source can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubResourceKind {
    Applications,
    Endpoints,
}

impl SubResourceKind {
    /// Path segment under `/sources/{id}/` for this kind.
    pub fn path_segment(self) -> &'static str {
        match self {
            SubResourceKind::Applications => "applications",
            SubResourceKind::Endpoints => "endpoints",
        }
    }
}

impl fmt::Display for SubResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// A single sub-resource id as the inventory returns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubResourceId {
    pub id: String,
}

/// Collection envelope for list endpoints: `{"data": [{"id": "..."}]}`.
///
/// The inventory sends more fields (pagination meta among them); only `data`
/// matters here.
#[derive(Debug, Deserialize)]
pub(crate) struct CollectionResponse {
    #[serde(default)]
    pub data: Vec<SubResourceId>,
}
