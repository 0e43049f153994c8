pub mod calls;
pub mod entities;
pub mod imports;

use tree_sitter::Node;

use crate::graph::edge::Edge;
use crate::graph::node::{EntityKind, LineRange};
use crate::parser::ParsedFile;

/// Sentinel caller identity for call sites with no enclosing named scope.
pub const GLOBAL_CALLER: &str = "global";

/// Identity suffix and label shared by every anonymous arrow literal in a
/// file.
pub const ARROW_NAME: &str = "arrow";
pub const ARROW_LABEL: &str = "arrow function";

/// Extraction knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Key class methods as `file:Class.method` instead of `file:method`.
    /// The default coarse keying collapses same-named methods across classes
    /// into one identity.
    pub qualified_methods: bool,
}

/// One raw observation of an entity-declaration site. May repeat for the
/// same identity; merging happens downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityObservation {
    pub id: String,
    /// Bare local name, used for callee matching.
    pub name: String,
    pub label: String,
    pub kind: EntityKind,
    /// `None` for entities with no concrete site (a library name).
    pub range: Option<LineRange>,
}

/// One raw observation of a call site. The callee is a bare name; matching
/// it against declared entities happens downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallObservation {
    /// Identity of the enclosing entity, or [`GLOBAL_CALLER`].
    pub caller: String,
    pub callee: String,
    /// Literal argument-list rendering, parentheses included.
    pub args: String,
}

/// Everything one file contributes to the graph, in tree-walk order.
#[derive(Debug, Default)]
pub struct FileObservations {
    pub entities: Vec<EntityObservation>,
    pub calls: Vec<CallObservation>,
    /// Import edges are fully formed at extraction time.
    pub edges: Vec<Edge>,
}

/// Walk one parsed file and collect all entity, call, and import
/// observations.
///
/// Defensive by contract: node shapes that are not recognised are ignored,
/// never fatal — a malformed tree simply yields fewer observations.
pub fn extract_file(parsed: &ParsedFile, file: &str, opts: &ExtractOptions) -> FileObservations {
    let mut entities = entities::extract_entities(parsed, file, opts);
    let (import_entities, edges) = imports::extract_imports(parsed, file);
    entities.extend(import_entities);
    let calls = calls::extract_calls(parsed, file, opts);

    FileObservations {
        entities,
        calls,
        edges,
    }
}

/// The 1-based inclusive line range of a node, shifted by the file's
/// embedded-script offset.
pub(crate) fn node_range(node: Node, line_offset: usize) -> LineRange {
    LineRange {
        start: node.start_position().row + 1 + line_offset,
        end: node.end_position().row + 1 + line_offset,
    }
}

/// True if `node` is a function or arrow-function literal.
pub(crate) fn is_function_value(node: Node) -> bool {
    matches!(
        node.kind(),
        "arrow_function" | "function_expression" | "function"
    )
}

/// The name of the class owning `method_node`, when the method sits directly
/// in a class body.
pub(crate) fn owning_class_name<'a>(method_node: Node<'a>, source: &'a [u8]) -> Option<&'a str> {
    let body = method_node.parent()?;
    if body.kind() != "class_body" {
        return None;
    }
    let mut current = body.parent();
    while let Some(n) = current {
        if matches!(n.kind(), "class_declaration" | "class") {
            let name = n.child_by_field_name("name")?;
            return name.utf8_text(source).ok();
        }
        current = n.parent();
    }
    None
}
