pub mod languages;
pub mod vue;

use std::cell::RefCell;
use std::path::Path;

use tree_sitter::{Parser, Tree};

use crate::error::ParseError;
use crate::language::Dialect;
use languages::GrammarKind;

// Thread-local Parser instances — one per rayon worker thread, zero lock
// contention. Each Parser is initialised once per thread with the
// appropriate grammar.
thread_local! {
    static PARSER_JS: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&tree_sitter_javascript::LANGUAGE.into()).unwrap();
        p
    });
    static PARSER_TS: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()).unwrap();
        p
    });
    static PARSER_TSX: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&tree_sitter_typescript::LANGUAGE_TSX.into()).unwrap();
        p
    });
}

/// A parsed source file ready for extraction.
///
/// For Vue components `source` holds the extracted script block and
/// `line_offset` maps tree rows back to component-file lines; for every
/// other dialect `source` is the raw file text and the offset is zero.
pub struct ParsedFile {
    pub tree: Tree,
    pub source: Vec<u8>,
    pub grammar: GrammarKind,
    pub line_offset: usize,
}

/// Parse a source file's text according to its dialect hint.
///
/// Returns `Ok(None)` for component files with no embedded script — such
/// files contribute nothing to the graph and are not an error.
///
/// # Errors
/// Returns a [`ParseError`] when tree-sitter cannot produce a tree. The
/// caller's policy is "warn and skip this file".
pub fn parse_source(path: &Path, text: &str, dialect: Dialect) -> Result<Option<ParsedFile>, ParseError> {
    match dialect {
        Dialect::Vue => {
            if !vue::has_embedded_script(text) {
                return Ok(None);
            }
            let script = match vue::extract_embedded_script(text) {
                Some(s) => s,
                // `<script` appeared but neither extraction strategy matched.
                None => return Ok(None),
            };
            let grammar = if script.typescript {
                GrammarKind::TypeScript
            } else {
                GrammarKind::JavaScript
            };
            let tree = parse_with(grammar, script.source.as_bytes())
                .ok_or_else(|| no_tree_error(path, "embedded script"))?;
            Ok(Some(ParsedFile {
                tree,
                source: script.source.into_bytes(),
                grammar,
                line_offset: script.line_offset,
            }))
        }
        Dialect::JavaScript | Dialect::TypeScript | Dialect::Tsx => {
            let grammar = match dialect {
                Dialect::JavaScript => GrammarKind::JavaScript,
                Dialect::TypeScript => GrammarKind::TypeScript,
                _ => GrammarKind::Tsx,
            };
            let tree =
                parse_with(grammar, text.as_bytes()).ok_or_else(|| no_tree_error(path, "source"))?;
            Ok(Some(ParsedFile {
                tree,
                source: text.as_bytes().to_vec(),
                grammar,
                line_offset: 0,
            }))
        }
    }
}

fn parse_with(grammar: GrammarKind, source: &[u8]) -> Option<Tree> {
    match grammar {
        GrammarKind::JavaScript => PARSER_JS.with(|p| p.borrow_mut().parse(source, None)),
        GrammarKind::TypeScript => PARSER_TS.with(|p| p.borrow_mut().parse(source, None)),
        GrammarKind::Tsx => PARSER_TSX.with(|p| p.borrow_mut().parse(source, None)),
    }
}

fn no_tree_error(path: &Path, what: &str) -> ParseError {
    ParseError {
        file: file_basename(path),
        message: format!("tree-sitter returned no tree for {what}"),
    }
}

/// The basename used as the identity prefix for a file's entities.
pub fn file_basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
