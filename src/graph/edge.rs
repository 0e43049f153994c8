use serde::{Deserialize, Serialize};

/// The kind of directed relationship between two entity identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// The source entity calls the target entity.
    Calls,
    /// The source file imports the target symbol.
    Imports,
}

impl EdgeKind {
    /// The serialized tag used in CSV artifacts and listings.
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Calls => "calls",
            EdgeKind::Imports => "imports",
        }
    }
}

/// A directed edge between two entity identities.
///
/// Endpoints need not exist as entities: a call to a built-in or otherwise
/// untracked symbol keeps its bare name as the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    /// Literal argument-list rendering for call edges. A qualifier only —
    /// never part of the identity key, and discarded for later duplicates.
    pub detail: Option<String>,
}
