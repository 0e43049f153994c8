use std::sync::OnceLock;

use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

use crate::graph::edge::{Edge, EdgeKind};
use crate::graph::node::EntityKind;
use crate::parser::ParsedFile;
use crate::parser::languages::GrammarKind;

use super::{EntityObservation, node_range};

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// ESM static import declarations: `import ... from 'module'`.
const IMPORT_QUERY: &str = r#"
    (import_statement
      source: (string (string_fragment) @module_path)) @import
"#;

// ---------------------------------------------------------------------------
// Query cache
// ---------------------------------------------------------------------------

static JS_IMPORT_QUERY: OnceLock<Query> = OnceLock::new();
static TS_IMPORT_QUERY: OnceLock<Query> = OnceLock::new();
static TSX_IMPORT_QUERY: OnceLock<Query> = OnceLock::new();

fn import_query(grammar: GrammarKind) -> &'static Query {
    let cell = match grammar {
        GrammarKind::JavaScript => &JS_IMPORT_QUERY,
        GrammarKind::TypeScript => &TS_IMPORT_QUERY,
        GrammarKind::Tsx => &TSX_IMPORT_QUERY,
    };
    cell.get_or_init(|| Query::new(&grammar.language(), IMPORT_QUERY).expect("invalid import query"))
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Discover import declarations.
///
/// Each declaration yields one library entity (no provenance) and, per
/// *named* specifier, one imported-method entity plus one `imports` edge
/// from the file to it. Default and namespace specifiers are not recorded.
pub fn extract_imports(parsed: &ParsedFile, file: &str) -> (Vec<EntityObservation>, Vec<Edge>) {
    let query = import_query(parsed.grammar);
    let source = parsed.source.as_slice();

    let module_path_idx = query
        .capture_index_for_name("module_path")
        .expect("import query must have @module_path");
    let import_idx = query
        .capture_index_for_name("import")
        .expect("import query must have @import");

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, parsed.tree.root_node(), source);

    let mut entities: Vec<EntityObservation> = Vec::new();
    let mut edges: Vec<Edge> = Vec::new();

    while let Some(m) = matches.next() {
        let mut import_node: Option<Node> = None;
        let mut module_path: Option<&str> = None;

        for capture in m.captures {
            if capture.index == import_idx {
                import_node = Some(capture.node);
            } else if capture.index == module_path_idx {
                module_path = Some(node_text(capture.node, source));
            }
        }

        let (import_node, module) = match (import_node, module_path) {
            (Some(n), Some(p)) if !p.is_empty() => (n, p),
            _ => continue,
        };

        // The library itself — an externally-sourced entity with no
        // concrete site in this file.
        entities.push(EntityObservation {
            id: module.to_owned(),
            name: module.to_owned(),
            label: module.to_owned(),
            kind: EntityKind::Library,
            range: None,
        });

        for spec in named_specifiers(import_node, source) {
            let id = format!("{module}/{}", spec.local);
            entities.push(EntityObservation {
                id: id.clone(),
                name: spec.local.to_owned(),
                label: spec.local.to_owned(),
                kind: EntityKind::ImportedMethod,
                range: Some(node_range(spec.node, parsed.line_offset)),
            });
            edges.push(Edge {
                source: file.to_owned(),
                target: id,
                kind: EdgeKind::Imports,
                detail: None,
            });
        }
    }

    (entities, edges)
}

struct NamedSpecifier<'a> {
    /// The local binding name (the alias, for `import { x as y }`).
    local: &'a str,
    node: Node<'a>,
}

/// Collect the named specifiers of an import statement.
///
/// Walks `import_clause` -> `named_imports` -> `import_specifier`; default
/// and namespace clauses are skipped.
fn named_specifiers<'a>(import_node: Node<'a>, source: &'a [u8]) -> Vec<NamedSpecifier<'a>> {
    let mut specifiers = Vec::new();

    let mut clause_cursor = import_node.walk();
    for clause in import_node.children(&mut clause_cursor) {
        if clause.kind() != "import_clause" {
            continue;
        }
        let mut named_cursor = clause.walk();
        for named in clause.children(&mut named_cursor) {
            if named.kind() != "named_imports" {
                continue;
            }
            let mut spec_cursor = named.walk();
            for spec in named.children(&mut spec_cursor) {
                if spec.kind() != "import_specifier" {
                    continue;
                }
                // In `import { foo as bar }` the grammar assigns name="foo"
                // and alias="bar"; the alias is the local binding.
                let name_node = spec.child_by_field_name("name");
                let alias_node = spec.child_by_field_name("alias");
                let local_node = match (alias_node, name_node) {
                    (Some(a), _) => a,
                    (None, Some(n)) => n,
                    (None, None) => continue,
                };
                let local = node_text(local_node, source);
                if local.is_empty() {
                    continue;
                }
                specifiers.push(NamedSpecifier { local, node: spec });
            }
        }
    }

    specifiers
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
