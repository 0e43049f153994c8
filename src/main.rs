mod cli;
mod config;
mod error;
mod extract;
mod graph;
mod language;
mod output;
mod parser;
mod walker;

use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;

use cli::Cli;
use config::RefGraphConfig;
use error::{FileFailure, ParseError, ScanError};
use extract::{ExtractOptions, FileObservations, extract_file};
use graph::GraphBuilder;
use output::{RunSummary, print_listing, print_summary, write_csv_reports};
use parser::{file_basename, parse_source};
use walker::{dialect_hint, walk_project};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start = Instant::now();

    let config = RefGraphConfig::load(&cli.path);
    let files = walk_project(&cli.path, &config, cli.verbose)?;

    let opts = ExtractOptions {
        qualified_methods: cli.qualified_methods,
    };

    // Per-file extraction is independent; run it in parallel and merge the
    // results single-threaded in scan order so provenance concatenation
    // stays deterministic.
    let results: Vec<_> = files
        .par_iter()
        .map(|path| process_file(path, &opts))
        .collect();

    let mut builder = GraphBuilder::new();
    let mut skipped = 0usize;
    let mut scan_failure: Option<ScanError> = None;

    for result in results {
        match result {
            Ok(Some(observations)) => builder.add_file(observations),
            // A component file without an embedded script contributes nothing.
            Ok(None) => {}
            Err(FileFailure::Parse(err)) => {
                eprintln!("warning: {err}");
                skipped += 1;
            }
            Err(FileFailure::Scan(err)) => {
                eprintln!("error: {err}");
                scan_failure = Some(err);
                break;
            }
        }
    }

    let graph = builder.finish();
    let elapsed_secs = start.elapsed().as_secs_f64();
    let summary = RunSummary::collect(&graph, files.len(), skipped, elapsed_secs);

    if let Some(basename) = &cli.output {
        let (nodes_path, edges_path) =
            write_csv_reports(&graph, basename, cli.anonymous.show_in_csv())
                .with_context(|| format!("failed to write CSV artifacts for {basename}"))?;
        if !cli.json {
            println!("Wrote {} and {}", nodes_path.display(), edges_path.display());
        }
    } else if !cli.json {
        print_listing(&graph, cli.anonymous.show_in_listing());
    }

    print_summary(&summary, cli.json);

    // A scan failure aborts the remaining merge, but only after the partial
    // graph has been reported.
    if let Some(err) = scan_failure {
        return Err(anyhow::Error::new(err).context("scan aborted, reported partial graph"));
    }

    Ok(())
}

/// Read, parse, and extract one file.
///
/// Invalid UTF-8 is a parse failure (skip and continue); any other read
/// failure is a scan failure (abort).
fn process_file(path: &Path, opts: &ExtractOptions) -> Result<Option<FileObservations>, FileFailure> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == ErrorKind::InvalidData {
            FileFailure::Parse(ParseError {
                file: file_basename(path),
                message: "file is not valid UTF-8".into(),
            })
        } else {
            FileFailure::Scan(ScanError::Read {
                path: path.to_path_buf(),
                source: err,
            })
        }
    })?;

    let dialect = match dialect_hint(path) {
        Some(d) => d,
        // The walker only yields recognised extensions; anything else is
        // silently irrelevant.
        None => return Ok(None),
    };

    let file = file_basename(path);
    let parsed = match parse_source(path, &text, dialect)? {
        Some(p) => p,
        None => return Ok(None),
    };

    Ok(Some(extract_file(&parsed, &file, opts)))
}
