//! # coexnet
//!
//! Builds a gene co-expression network from per-gene similarity tables and
//! labels its nodes with pathway categories taken from seed-gene evidence.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! coexnet build -c data/reference/sbi_coex -k 10 -z 4
//! coexnet annotate -g results/gene_network/sbi_G-z4.0_k10.json -p map00020 map00660
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use coexnet::prelude::*;
//! use std::path::Path;
//!
//! let config = ExtractorConfig::new(10, 4.0).unwrap();
//! let report = extract_dir(Path::new("data/reference/sbi_coex"), &config).unwrap();
//! let mut graph = GraphBuilder::build_parallel(&report.records);
//!
//! let collector = SeedGeneCollector::new(CollectorConfig::new(
//!     "results/hmm_homology",
//!     CategoryFilter::from_values(["map00020", "map00660"]),
//!     SelectionPolicy::BestOnly,
//! ));
//! let seeds = collector.collect().unwrap();
//! let summary = annotate(&mut graph, &seeds);
//! println!("{} / {} nodes annotated", summary.annotated, summary.total);
//! ```
//!
//! ## Crate Structure
//!
//! - `coexnet-core` - extraction, graph building, seed collection, annotation
//! - `coexnet-storage` - graph files, seed-table export, output naming

pub mod pipeline;

// Re-export core types
pub use coexnet_core::{
    annotate, category_labels, extract_dir, extract_table,
    AnnotationSummary, CategoryFilter, CoexpressionGraph, CollectorConfig, EdgeKey,
    ExtractionReport, ExtractorConfig, GraphBuilder, NodeAttributes, SeedGene,
    SeedGeneCollector, SeedGeneTable, SelectionPolicy, SimilarityRecord,
    Error, Result, BACKGROUND_LABEL,
};

// Re-export storage
pub use coexnet_storage::{load_graph, write_graph, write_seed_table, GraphMetadata, GraphParams};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        annotate, extract_dir,
        CategoryFilter, CoexpressionGraph, CollectorConfig, ExtractorConfig,
        GraphBuilder, SeedGeneCollector, SeedGeneTable, SelectionPolicy,
        SimilarityRecord, Error, Result,
        load_graph, write_graph,
    };
}
