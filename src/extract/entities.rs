use std::sync::OnceLock;

use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

use crate::graph::node::EntityKind;
use crate::parser::ParsedFile;
use crate::parser::languages::GrammarKind;

use super::{
    ARROW_LABEL, ARROW_NAME, EntityObservation, ExtractOptions, is_function_value, node_range,
    owning_class_name,
};

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// Declaration-site query for JavaScript (`.js`/`.jsx`) sources.
///
/// Property and variable-declarator values are captured as wildcards and
/// classified in code, so non-function bindings are ignored without
/// depending on the grammar's function-literal node name.
const ENTITY_QUERY_JS: &str = r#"
    ; Named function declarations
    (function_declaration
      name: (identifier) @fn_name) @fn

    ; Class declarations
    (class_declaration
      name: (identifier) @class_name) @class

    ; Methods inside a class body
    (class_body
      (method_definition
        name: (property_identifier) @method_name) @method)

    ; Object-literal shorthand methods (component method maps)
    (object
      (method_definition
        name: (property_identifier) @obj_method_name) @obj_method)

    ; Object-literal properties, classified by value
    (object
      (pair
        key: (property_identifier) @pair_name
        value: (_) @pair_value) @pair)

    ; Variable declarators, classified by initializer
    (variable_declarator
      name: (identifier) @var_name
      value: (_) @var_value) @var

    ; Anonymous arrow-function literals, regardless of binding context
    (arrow_function) @arrow
"#;

/// Declaration-site query for TypeScript/TSX sources. Identical to the
/// JavaScript query except that class names are `type_identifier` nodes.
const ENTITY_QUERY_TS: &str = r#"
    ; Named function declarations
    (function_declaration
      name: (identifier) @fn_name) @fn

    ; Class declarations
    (class_declaration
      name: (type_identifier) @class_name) @class

    ; Methods inside a class body
    (class_body
      (method_definition
        name: (property_identifier) @method_name) @method)

    ; Object-literal shorthand methods (component method maps)
    (object
      (method_definition
        name: (property_identifier) @obj_method_name) @obj_method)

    ; Object-literal properties, classified by value
    (object
      (pair
        key: (property_identifier) @pair_name
        value: (_) @pair_value) @pair)

    ; Variable declarators, classified by initializer
    (variable_declarator
      name: (identifier) @var_name
      value: (_) @var_value) @var

    ; Anonymous arrow-function literals, regardless of binding context
    (arrow_function) @arrow
"#;

// ---------------------------------------------------------------------------
// Query cache (compiled once per grammar via OnceLock)
// ---------------------------------------------------------------------------

static JS_ENTITY_QUERY: OnceLock<Query> = OnceLock::new();
static TS_ENTITY_QUERY: OnceLock<Query> = OnceLock::new();
static TSX_ENTITY_QUERY: OnceLock<Query> = OnceLock::new();

fn entity_query(grammar: GrammarKind) -> &'static Query {
    match grammar {
        GrammarKind::JavaScript => JS_ENTITY_QUERY.get_or_init(|| {
            Query::new(&grammar.language(), ENTITY_QUERY_JS).expect("invalid JS entity query")
        }),
        GrammarKind::TypeScript => TS_ENTITY_QUERY.get_or_init(|| {
            Query::new(&grammar.language(), ENTITY_QUERY_TS).expect("invalid TS entity query")
        }),
        GrammarKind::Tsx => TSX_ENTITY_QUERY.get_or_init(|| {
            Query::new(&grammar.language(), ENTITY_QUERY_TS).expect("invalid TSX entity query")
        }),
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// The finite set of declaration shapes the walker recognises. Everything
/// else falls through to the ignore arm.
#[derive(Clone, Copy)]
enum Shape {
    Function,
    Class,
    ClassMethod,
    ObjectMethod,
    Property,
    Binding,
    Arrow,
}

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Discover all entity-declaration sites in one parsed file.
///
/// Emission order is tree-walk order; duplicates are expected and merged
/// downstream.
pub fn extract_entities(
    parsed: &ParsedFile,
    file: &str,
    opts: &ExtractOptions,
) -> Vec<EntityObservation> {
    let query = entity_query(parsed.grammar);
    let source = parsed.source.as_slice();

    let fn_name_idx = query
        .capture_index_for_name("fn_name")
        .expect("entity query must have @fn_name");
    let class_name_idx = query
        .capture_index_for_name("class_name")
        .expect("entity query must have @class_name");
    let method_name_idx = query
        .capture_index_for_name("method_name")
        .expect("entity query must have @method_name");
    let obj_method_name_idx = query
        .capture_index_for_name("obj_method_name")
        .expect("entity query must have @obj_method_name");
    let pair_name_idx = query
        .capture_index_for_name("pair_name")
        .expect("entity query must have @pair_name");
    let var_name_idx = query
        .capture_index_for_name("var_name")
        .expect("entity query must have @var_name");
    let arrow_idx = query
        .capture_index_for_name("arrow")
        .expect("entity query must have @arrow");
    let fn_idx = query.capture_index_for_name("fn");
    let class_idx = query.capture_index_for_name("class");
    let method_idx = query.capture_index_for_name("method");
    let obj_method_idx = query.capture_index_for_name("obj_method");
    let pair_idx = query.capture_index_for_name("pair");
    let var_idx = query.capture_index_for_name("var");
    let pair_value_idx = query.capture_index_for_name("pair_value");
    let var_value_idx = query.capture_index_for_name("var_value");

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, parsed.tree.root_node(), source);

    let mut out: Vec<EntityObservation> = Vec::new();

    while let Some(m) = matches.next() {
        let mut shape: Option<Shape> = None;
        let mut name_node: Option<Node> = None;
        let mut site_node: Option<Node> = None;
        let mut value_node: Option<Node> = None;

        for capture in m.captures {
            let idx = capture.index;
            if idx == fn_name_idx {
                shape = Some(Shape::Function);
                name_node = Some(capture.node);
            } else if idx == class_name_idx {
                shape = Some(Shape::Class);
                name_node = Some(capture.node);
            } else if idx == method_name_idx {
                shape = Some(Shape::ClassMethod);
                name_node = Some(capture.node);
            } else if idx == obj_method_name_idx {
                shape = Some(Shape::ObjectMethod);
                name_node = Some(capture.node);
            } else if idx == pair_name_idx {
                shape = Some(Shape::Property);
                name_node = Some(capture.node);
            } else if idx == var_name_idx {
                shape = Some(Shape::Binding);
                name_node = Some(capture.node);
            } else if idx == arrow_idx {
                shape = Some(Shape::Arrow);
                site_node = Some(capture.node);
            } else if Some(idx) == fn_idx
                || Some(idx) == class_idx
                || Some(idx) == method_idx
                || Some(idx) == obj_method_idx
                || Some(idx) == pair_idx
                || Some(idx) == var_idx
            {
                site_node = Some(capture.node);
            } else if Some(idx) == pair_value_idx || Some(idx) == var_value_idx {
                value_node = Some(capture.node);
            }
        }

        let site = match site_node {
            Some(s) => s,
            None => continue,
        };
        let range = node_range(site, parsed.line_offset);

        match shape {
            Some(Shape::Arrow) => {
                out.push(EntityObservation {
                    id: format!("{file}:{ARROW_NAME}"),
                    name: ARROW_NAME.to_owned(),
                    label: ARROW_LABEL.to_owned(),
                    kind: EntityKind::Function,
                    range: Some(range),
                });
                continue;
            }
            None => continue,
            _ => {}
        }

        let name = match name_node {
            Some(n) => node_text(n, source),
            None => continue,
        };
        if name.is_empty() {
            continue;
        }

        let (id, kind) = match shape {
            Some(Shape::Function) => (format!("{file}:{name}"), EntityKind::Function),
            Some(Shape::Class) => (format!("{file}:{name}"), EntityKind::Class),
            Some(Shape::ClassMethod) => {
                let id = if opts.qualified_methods
                    && let Some(class) = owning_class_name(site, source)
                {
                    format!("{file}:{class}.{name}")
                } else {
                    format!("{file}:{name}")
                };
                (id, EntityKind::Method)
            }
            Some(Shape::ObjectMethod) => (format!("{file}:{name}"), EntityKind::VueMethod),
            Some(Shape::Property) => {
                // Only function-valued properties become entities.
                match value_node {
                    Some(v) if is_function_value(v) => {
                        (format!("{file}:{name}"), EntityKind::VueMethod)
                    }
                    _ => continue,
                }
            }
            Some(Shape::Binding) => {
                // Function-valued bindings are treated as methods, not plain
                // variables; everything else is ignored.
                match value_node {
                    Some(v) if is_function_value(v) => {
                        (format!("{file}:{name}"), EntityKind::Method)
                    }
                    _ => continue,
                }
            }
            Some(Shape::Arrow) | None => unreachable!("handled above"),
        };

        out.push(EntityObservation {
            id,
            name: name.to_owned(),
            label: name.to_owned(),
            kind,
            range: Some(range),
        });
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
