use std::path::Path;

use serde::{Deserialize, Serialize};

/// A source dialect handled by ref-graph, derived from the file extension.
///
/// Uses a plain enum (not trait objects) to avoid `dyn` overhead. Cheap to
/// copy and pattern-matched at dispatch boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// `.js` / `.jsx` — parsed with the JavaScript grammar (which covers JSX).
    JavaScript,
    /// `.ts` — parsed with the TypeScript grammar.
    TypeScript,
    /// `.tsx` — parsed with the TSX grammar.
    Tsx,
    /// `.vue` — component file; the embedded script block is extracted and
    /// parsed as JavaScript (or TypeScript when `lang="ts"` is declared).
    Vue,
}

impl Dialect {
    /// The dialect hint for a file path, or `None` for unsupported extensions.
    pub fn from_path(path: &Path) -> Option<Dialect> {
        match path.extension().and_then(|e| e.to_str())? {
            "js" | "jsx" => Some(Dialect::JavaScript),
            "ts" => Some(Dialect::TypeScript),
            "tsx" => Some(Dialect::Tsx),
            "vue" => Some(Dialect::Vue),
            _ => None,
        }
    }

    /// Human-readable display name for summary output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::JavaScript => "JavaScript",
            Dialect::TypeScript => "TypeScript",
            Dialect::Tsx => "TSX",
            Dialect::Vue => "Vue",
        }
    }
}
