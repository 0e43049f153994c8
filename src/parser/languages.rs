use tree_sitter::Language;

/// The grammar used to parse a file's (possibly extracted) script source.
///
/// # Grammar selection rules
/// - JavaScript grammar covers `.js`/`.jsx` and Vue script blocks without a
///   `lang` attribute (the grammar parses JSX natively).
/// - `.ts` -> TypeScript grammar, `.tsx` -> TSX grammar.
///   These MUST be different: the TypeScript grammar cannot parse JSX, and
///   the TSX grammar breaks angle-bracket type assertions (`<T>expr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarKind {
    JavaScript,
    TypeScript,
    Tsx,
}

impl GrammarKind {
    /// The tree-sitter [`Language`] for this grammar.
    pub fn language(self) -> Language {
        match self {
            GrammarKind::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            GrammarKind::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            GrammarKind::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}
