use std::sync::OnceLock;

use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

use crate::parser::ParsedFile;
use crate::parser::languages::GrammarKind;

use super::{CallObservation, ExtractOptions, GLOBAL_CALLER, owning_class_name};

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// Call-site query. Only calls to a bare identifier are observed; member and
/// computed calls (`obj.method()`, `obj[k]()`) are invisible to the
/// extractor.
const CALLS_QUERY: &str = r#"
    (call_expression
      function: (identifier) @callee
      arguments: (arguments) @args)
"#;

// ---------------------------------------------------------------------------
// Query cache — one static per grammar; a query compiled for one grammar
// cannot be used with another grammar's tree.
// ---------------------------------------------------------------------------

static JS_CALLS_QUERY: OnceLock<Query> = OnceLock::new();
static TS_CALLS_QUERY: OnceLock<Query> = OnceLock::new();
static TSX_CALLS_QUERY: OnceLock<Query> = OnceLock::new();

fn calls_query(grammar: GrammarKind) -> &'static Query {
    let cell = match grammar {
        GrammarKind::JavaScript => &JS_CALLS_QUERY,
        GrammarKind::TypeScript => &TS_CALLS_QUERY,
        GrammarKind::Tsx => &TSX_CALLS_QUERY,
    };
    cell.get_or_init(|| Query::new(&grammar.language(), CALLS_QUERY).expect("invalid calls query"))
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Discover all bare-identifier call sites and resolve each one's enclosing
/// entity.
pub fn extract_calls(parsed: &ParsedFile, file: &str, opts: &ExtractOptions) -> Vec<CallObservation> {
    let query = calls_query(parsed.grammar);
    let source = parsed.source.as_slice();

    let callee_idx = query
        .capture_index_for_name("callee")
        .expect("calls query must have @callee");
    let args_idx = query
        .capture_index_for_name("args")
        .expect("calls query must have @args");

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, parsed.tree.root_node(), source);

    let mut out: Vec<CallObservation> = Vec::new();

    while let Some(m) = matches.next() {
        let mut callee_node: Option<Node> = None;
        let mut args_node: Option<Node> = None;

        for capture in m.captures {
            if capture.index == callee_idx {
                callee_node = Some(capture.node);
            } else if capture.index == args_idx {
                args_node = Some(capture.node);
            }
        }

        let (callee_node, args_node) = match (callee_node, args_node) {
            (Some(c), Some(a)) => (c, a),
            _ => continue,
        };

        let callee = node_text(callee_node, source);
        if callee.is_empty() {
            continue;
        }

        out.push(CallObservation {
            caller: enclosing_entity(callee_node, source, file, opts),
            callee: callee.to_owned(),
            args: node_text(args_node, source).to_owned(),
        });
    }

    out
}

/// Resolve the identity of the entity enclosing a call site.
///
/// Policy: walk the ancestor chain upward to the nearest named function
/// declaration or method definition; call sites with neither attribute to
/// the fixed [`GLOBAL_CALLER`] sentinel.
fn enclosing_entity(node: Node, source: &[u8], file: &str, opts: &ExtractOptions) -> String {
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "function_declaration" => {
                if let Some(name) = n.child_by_field_name("name") {
                    return format!("{file}:{}", node_text(name, source));
                }
            }
            "method_definition" => {
                if let Some(name) = n.child_by_field_name("name") {
                    let name = node_text(name, source);
                    if opts.qualified_methods
                        && let Some(class) = owning_class_name(n, source)
                    {
                        return format!("{file}:{class}.{name}");
                    }
                    return format!("{file}:{name}");
                }
            }
            _ => {}
        }
        current = n.parent();
    }
    GLOBAL_CALLER.to_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
