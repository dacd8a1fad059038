//! Generate command implementation

use crate::check::load_config;
use anyhow::{Context, Result};
use astbridge_codegen::{Artifact, Bootstrap, FileSink, MemorySink, WriteSummary, write_all};
use astbridge_core::DeclGraph;
use std::path::Path;
use tracing::info;

/// Read and validate a declaration graph from a JSON file.
pub fn load_graph(path: &str) -> Result<DeclGraph> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read declaration graph: {path}"))?;
    DeclGraph::from_json(&json)
        .with_context(|| format!("Failed to parse declaration graph: {path}"))
}

/// Run a bootstrap pass and write (or list) its artifacts.
pub fn run(graph_path: &str, config_path: Option<String>, output: &str, dry_run: bool) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let graph = load_graph(graph_path)?;

    let artifacts = Bootstrap::new(&config)
        .run(graph)
        .context("Failed to generate bindings")?;

    if dry_run {
        let mut sink = MemorySink::new();
        write_all(&mut sink, &artifacts)?;
        for line in describe(sink.artifacts()) {
            println!("{line}");
        }
        return Ok(());
    }

    let summary = write_into(Path::new(output), &artifacts)?;
    info!(
        written = summary.written,
        unchanged = summary.unchanged,
        "Bindings generated"
    );
    println!(
        "✓ Generated {} file(s) in {} ({} unchanged)",
        summary.written, output, summary.unchanged
    );
    Ok(())
}

fn write_into(output: &Path, artifacts: &[Artifact]) -> Result<WriteSummary> {
    let mut sink = FileSink::new(output);
    write_all(&mut sink, artifacts)
        .with_context(|| format!("Failed to write bindings to {}", output.display()))
}

/// Dry-run listing: one line per artifact with its path and size.
pub fn describe(artifacts: &[Artifact]) -> Vec<String> {
    artifacts
        .iter()
        .map(|artifact| {
            format!(
                "{} [{}] {} ({} bytes)",
                artifact.relative_path.display(),
                artifact.family,
                artifact.kind,
                artifact.contents.len()
            )
        })
        .collect()
}
