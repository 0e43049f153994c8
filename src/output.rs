use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::extract::ARROW_LABEL;
use crate::graph::Graph;
use crate::graph::edge::EdgeKind;
use crate::graph::node::EntityKind;

/// Aggregate statistics for one run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub files_scanned: usize,
    /// Files skipped due to read or parse errors.
    pub files_skipped: usize,
    pub nodes: usize,
    pub edges: usize,
    pub functions: usize,
    pub methods: usize,
    pub classes: usize,
    pub vue_methods: usize,
    pub libraries: usize,
    pub imported_methods: usize,
    pub call_edges: usize,
    pub import_edges: usize,
    /// Wall-clock time for the run in seconds.
    pub elapsed_secs: f64,
}

impl RunSummary {
    pub fn collect(graph: &Graph, files_scanned: usize, files_skipped: usize, elapsed_secs: f64) -> Self {
        let by_kind = graph.nodes_by_kind();
        let kind = |k: EntityKind| by_kind.get(&k).copied().unwrap_or(0);
        let edges_by_kind = graph.edges_by_kind();

        Self {
            files_scanned,
            files_skipped,
            nodes: graph.nodes.len(),
            edges: graph.edges.len(),
            functions: kind(EntityKind::Function),
            methods: kind(EntityKind::Method),
            classes: kind(EntityKind::Class),
            vue_methods: kind(EntityKind::VueMethod),
            libraries: kind(EntityKind::Library),
            imported_methods: kind(EntityKind::ImportedMethod),
            call_edges: edges_by_kind.get(&EdgeKind::Calls).copied().unwrap_or(0),
            import_edges: edges_by_kind.get(&EdgeKind::Imports).copied().unwrap_or(0),
            elapsed_secs,
        }
    }
}

/// Print a summary of the run.
///
/// - `json = true`: emit a pretty-printed JSON object to stdout.
/// - `json = false`: emit a cargo-style human-readable summary to stdout.
///
/// If `files_skipped > 0`, a warning line is written to stderr so the stdout
/// stream stays clean for downstream consumers.
pub fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("error serialising summary: {}", e),
        }
        return;
    }

    println!(
        "Scanned {} files in {:.2}s",
        summary.files_scanned, summary.elapsed_secs
    );
    println!(
        "  graph: {} nodes, {} edges ({} calls, {} imports)",
        summary.nodes, summary.edges, summary.call_edges, summary.import_edges
    );
    println!(
        "  {} functions, {} methods, {} classes, {} vue-methods",
        summary.functions, summary.methods, summary.classes, summary.vue_methods
    );
    println!(
        "  {} libraries, {} imported methods",
        summary.libraries, summary.imported_methods
    );

    if summary.files_skipped > 0 {
        eprintln!("  {} files skipped (read/parse errors)", summary.files_skipped);
    }
}

/// Node ids suppressed by the anonymous-label presentation filter: every
/// node whose label contains the anonymous-construct marker.
fn suppressed_ids(graph: &Graph) -> HashSet<&str> {
    graph
        .nodes
        .iter()
        .filter(|n| n.label.contains(ARROW_LABEL))
        .map(|n| n.id.as_str())
        .collect()
}

/// Print the node and edge listing to stdout.
///
/// `show_anonymous = false` applies the presentation filter: anonymous nodes
/// and their incident edges are hidden. The filter never touches the graph
/// itself.
pub fn print_listing(graph: &Graph, show_anonymous: bool) {
    let suppressed = if show_anonymous {
        HashSet::new()
    } else {
        suppressed_ids(graph)
    };

    println!("Nodes:");
    for n in &graph.nodes {
        if suppressed.contains(n.id.as_str()) {
            continue;
        }
        let lines = n.lines_rendering();
        if lines.is_empty() {
            println!("  {}  [{}]", n.id, n.kind.as_str());
        } else {
            println!("  {}  [{}]  lines {}", n.id, n.kind.as_str(), lines);
        }
    }

    println!("Edges:");
    for e in &graph.edges {
        if suppressed.contains(e.source.as_str()) || suppressed.contains(e.target.as_str()) {
            continue;
        }
        match &e.detail {
            Some(detail) => println!("  {} -> {}  [{}] {}", e.source, e.target, e.kind.as_str(), detail),
            None => println!("  {} -> {}  [{}]", e.source, e.target, e.kind.as_str()),
        }
    }
}

/// Write `<basename>_nodes.csv` and `<basename>_edges.csv`.
///
/// Values are not quote-escaped; a value containing the field delimiter
/// corrupts its row. Returns the two artifact paths.
pub fn write_csv_reports(
    graph: &Graph,
    basename: &str,
    show_anonymous: bool,
) -> std::io::Result<(PathBuf, PathBuf)> {
    let suppressed = if show_anonymous {
        HashSet::new()
    } else {
        suppressed_ids(graph)
    };

    let nodes_path = PathBuf::from(format!("{basename}_nodes.csv"));
    let mut nodes_file = File::create(&nodes_path)?;
    writeln!(nodes_file, "id,label,type,lines")?;
    for n in &graph.nodes {
        if suppressed.contains(n.id.as_str()) {
            continue;
        }
        writeln!(
            nodes_file,
            "{},{},{},{}",
            n.id,
            n.label,
            n.kind.as_str(),
            n.lines_rendering()
        )?;
    }

    let edges_path = PathBuf::from(format!("{basename}_edges.csv"));
    let mut edges_file = File::create(&edges_path)?;
    writeln!(edges_file, "source,target,type")?;
    for e in &graph.edges {
        if suppressed.contains(e.source.as_str()) || suppressed.contains(e.target.as_str()) {
            continue;
        }
        writeln!(edges_file, "{},{},{}", e.source, e.target, e.kind.as_str())?;
    }

    Ok((nodes_path, edges_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edge::Edge;
    use crate::graph::node::{Entity, LineRange};

    fn sample_graph() -> Graph {
        Graph {
            nodes: vec![
                Entity {
                    id: "app.js:run".into(),
                    name: "run".into(),
                    label: "run".into(),
                    kind: EntityKind::Function,
                    lines: vec![LineRange { start: 1, end: 4 }],
                },
                Entity {
                    id: "app.js:arrow".into(),
                    name: "arrow".into(),
                    label: "arrow function".into(),
                    kind: EntityKind::Function,
                    lines: vec![LineRange { start: 6, end: 6 }],
                },
            ],
            edges: vec![
                Edge {
                    source: "app.js:run".into(),
                    target: "app.js:arrow".into(),
                    kind: EdgeKind::Calls,
                    detail: Some("()".into()),
                },
                Edge {
                    source: "global".into(),
                    target: "app.js:run".into(),
                    kind: EdgeKind::Calls,
                    detail: Some("()".into()),
                },
            ],
        }
    }

    #[test]
    fn test_csv_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("graph").to_string_lossy().into_owned();

        let (nodes_path, edges_path) =
            write_csv_reports(&sample_graph(), &base, true).expect("write");

        let nodes = std::fs::read_to_string(&nodes_path).unwrap();
        let mut lines = nodes.lines();
        assert_eq!(lines.next(), Some("id,label,type,lines"));
        assert_eq!(lines.next(), Some("app.js:run,run,function,1-4"));
        assert_eq!(lines.next(), Some("app.js:arrow,arrow function,function,6-6"));

        let edges = std::fs::read_to_string(&edges_path).unwrap();
        let mut lines = edges.lines();
        assert_eq!(lines.next(), Some("source,target,type"));
        assert_eq!(lines.next(), Some("app.js:run,app.js:arrow,calls"));
        assert_eq!(lines.next(), Some("global,app.js:run,calls"));
    }

    #[test]
    fn test_csv_anonymous_filter_drops_nodes_and_incident_edges() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("filtered").to_string_lossy().into_owned();

        let (nodes_path, edges_path) =
            write_csv_reports(&sample_graph(), &base, false).expect("write");

        let nodes = std::fs::read_to_string(&nodes_path).unwrap();
        assert!(!nodes.contains("arrow function"));
        assert!(nodes.contains("app.js:run"));

        let edges = std::fs::read_to_string(&edges_path).unwrap();
        assert!(!edges.contains("app.js:arrow"));
        assert!(edges.contains("global,app.js:run,calls"));
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary::collect(&sample_graph(), 3, 1, 0.5);
        assert_eq!(summary.files_scanned, 3);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.edges, 2);
        assert_eq!(summary.functions, 2);
        assert_eq!(summary.call_edges, 2);
        assert_eq!(summary.import_edges, 0);
    }
}
