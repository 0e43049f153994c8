use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Extract a call/reference graph from JavaScript, TypeScript, and Vue
/// sources.
///
/// ref-graph parses every source file under a directory into a syntax tree,
/// records declared entities (functions, methods, classes, function-valued
/// bindings, imports) and the calls between them, and reports the resulting
/// deduplicated node/edge graph as CSV or console text.
#[derive(Parser, Debug)]
#[command(name = "ref-graph", version, about, long_about = None)]
pub struct Cli {
    /// Root directory to scan for source files.
    #[arg(long)]
    pub path: PathBuf,

    /// Basename for CSV artifacts; writes `<basename>_nodes.csv` and
    /// `<basename>_edges.csv` instead of the console listing.
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Print each discovered file path during the scan.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit the run summary as JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,

    /// Whether anonymous arrow-function nodes appear in reports.
    #[arg(long, value_enum, default_value_t = AnonymousFilter::Auto)]
    pub anonymous: AnonymousFilter,

    /// Key class methods as `file:Class.method` instead of `file:method`.
    ///
    /// The default coarse keying collapses same-named methods across classes
    /// into one node.
    #[arg(long)]
    pub qualified_methods: bool,
}

/// Presentation filter for anonymous arrow-function nodes and their edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AnonymousFilter {
    /// Keep anonymous nodes in CSV artifacts, hide them in the console
    /// listing.
    #[default]
    Auto,
    /// Always keep anonymous nodes.
    Show,
    /// Always hide anonymous nodes and their incident edges.
    Hide,
}

impl AnonymousFilter {
    /// Whether anonymous nodes appear in the CSV artifacts.
    pub fn show_in_csv(self) -> bool {
        !matches!(self, AnonymousFilter::Hide)
    }

    /// Whether anonymous nodes appear in the console listing.
    pub fn show_in_listing(self) -> bool {
        matches!(self, AnonymousFilter::Show)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_filter_defaults() {
        assert!(AnonymousFilter::Auto.show_in_csv());
        assert!(!AnonymousFilter::Auto.show_in_listing());
        assert!(AnonymousFilter::Show.show_in_listing());
        assert!(!AnonymousFilter::Hide.show_in_csv());
    }

    #[test]
    fn test_cli_requires_path() {
        let err = Cli::try_parse_from(["ref-graph"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_parses_output_and_flags() {
        let cli = Cli::try_parse_from([
            "ref-graph",
            "--path",
            "src",
            "-o",
            "graph",
            "--qualified-methods",
            "--anonymous",
            "hide",
        ])
        .unwrap();
        assert_eq!(cli.path, PathBuf::from("src"));
        assert_eq!(cli.output.as_deref(), Some("graph"));
        assert!(cli.qualified_methods);
        assert_eq!(cli.anonymous, AnonymousFilter::Hide);
    }
}
