use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of entity recorded as a graph node.
///
/// A flat tag — kinds are not ordered or hierarchical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// A named function declaration or an anonymous arrow literal.
    Function,
    /// A class method or a function-valued variable binding.
    Method,
    /// A class declaration.
    Class,
    /// A plain variable binding (reserved for non-function bindings).
    Variable,
    /// A function-valued property of an object literal (component method map).
    VueMethod,
    /// An imported module, keyed by its raw specifier string.
    Library,
    /// A named symbol imported from a module, keyed as `module/name`.
    ImportedMethod,
}

impl EntityKind {
    /// The serialized tag used in CSV artifacts and listings.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::Class => "class",
            EntityKind::Variable => "variable",
            EntityKind::VueMethod => "vue-method",
            EntityKind::Library => "library",
            EntityKind::ImportedMethod => "imported-method",
        }
    }
}

/// A 1-based inclusive source-line range where an entity was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A deduplicated graph node: one named program construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identity: `file:name` for file-scoped entities, the raw module
    /// specifier for libraries, `module/name` for imported symbols.
    pub id: String,
    /// Bare local name, used to match call sites against declarations.
    pub name: String,
    /// Human-readable display name. Usually equals `name`; synthetic for
    /// anonymous constructs ("arrow function").
    pub label: String,
    pub kind: EntityKind,
    /// Ordered, append-only provenance. Empty for entities with no concrete
    /// site (a library name).
    pub lines: Vec<LineRange>,
}

impl Entity {
    /// Comma-joined rendering of all observed ranges, in first-seen order.
    pub fn lines_rendering(&self) -> String {
        self.lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
