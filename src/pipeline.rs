//! End-to-end stages used by the `coexnet` binary.

use anyhow::{Context, Result};
use coexnet_core::{
    annotate, extract_dir, AnnotationSummary, CoexpressionGraph, CollectorConfig, ExtractionReport,
    ExtractorConfig, GraphBuilder, SeedGeneCollector, SeedGeneTable,
};
use coexnet_storage::{seed_table_path, write_graph, write_seed_table, GraphFileDescription, GraphMetadata};
use std::path::{Path, PathBuf};
use tracing::info;

/// Graph built from a similarity directory, plus what extraction skipped
pub struct BuiltNetwork {
    pub graph: CoexpressionGraph,
    pub report: ExtractionReport,
}

/// Files written by an annotation run
#[derive(Debug)]
pub struct AnnotatedOutput {
    pub graph_file: GraphFileDescription,
    pub seed_table: PathBuf,
    pub summary: AnnotationSummary,
}

/// Extract candidate edges from `coex_dir` and fold them into a graph.
pub fn build_network(coex_dir: &Path, config: &ExtractorConfig) -> Result<BuiltNetwork> {
    let mut report = extract_dir(coex_dir, config)
        .with_context(|| format!("Failed to scan co-expression directory {:?}", coex_dir))?;
    let graph = GraphBuilder::build_parallel(&report.records);
    report.records.clear();
    Ok(BuiltNetwork { graph, report })
}

pub fn build_metadata(config: &ExtractorConfig, annotated: bool) -> GraphMetadata {
    GraphMetadata {
        k: Some(config.k),
        min_score: Some(config.min_score),
        annotated,
        created_at: None,
    }
}

/// Collect seed genes. Errors here abort the run before anything is written.
pub fn collect_seeds(config: CollectorConfig) -> Result<SeedGeneTable> {
    let policy = config.policy;
    SeedGeneCollector::new(config)
        .collect()
        .with_context(|| format!("Seed-gene collection failed (policy {})", policy))
}

/// Annotate `graph` in place and write it together with the seed table.
pub fn annotate_and_save(
    mut graph: CoexpressionGraph,
    seeds: &SeedGeneTable,
    mut metadata: GraphMetadata,
    output: &Path,
) -> Result<AnnotatedOutput> {
    let summary = annotate(&mut graph, seeds);
    metadata.annotated = true;

    let graph_file = write_graph(output, &graph, metadata)?;
    let seed_table = seed_table_path(output);
    write_seed_table(&seed_table, seeds)?;

    Ok(AnnotatedOutput {
        graph_file,
        seed_table,
        summary,
    })
}

/// Build and collect concurrently, then annotate once both are ready.
pub fn run(
    coex_dir: &Path,
    extractor: &ExtractorConfig,
    collector: CollectorConfig,
    output: &Path,
) -> Result<AnnotatedOutput> {
    // Fail fast on an unusable policy before scanning anything.
    collector.policy.ensure_implemented()?;

    let (built, seeds) = rayon::join(
        || build_network(coex_dir, extractor),
        || collect_seeds(collector),
    );
    let seeds = seeds?;
    let built = built?;
    info!(
        "Joining graph ({} nodes) with {} seed genes",
        built.graph.node_count(),
        seeds.len()
    );

    annotate_and_save(built.graph, &seeds, build_metadata(extractor, true), output)
}
