//! # coexnet Core
//!
//! Core library for the coexnet gene co-expression pipeline.
//!
//! This crate provides the four stages of the pipeline:
//!
//! - [`extractor`] - per-gene similarity tables to candidate edges (top-K, then threshold)
//! - [`GraphBuilder`] - folds candidate edges into one undirected [`CoexpressionGraph`]
//! - [`SeedGeneCollector`] - seed genes per pathway category from homology evidence
//! - [`annotate()`] - overlays category labels onto graph nodes
//!
//! ## Example
//!
//! ```rust
//! use coexnet_core::{annotate, GraphBuilder, SeedGene, SeedGeneTable, SimilarityRecord};
//!
//! let records = vec![
//!     SimilarityRecord::new("g1", "g2", 10.0),
//!     SimilarityRecord::new("g2", "g1", 6.0),
//!     SimilarityRecord::new("g3", "g4", 5.0),
//! ];
//! let mut graph = GraphBuilder::build(&records);
//! assert_eq!(graph.weight("g2", "g1"), Some(10.0));
//!
//! let seeds = SeedGeneTable::from_genes(vec![
//!     SeedGene::new("g1", 1e-40, "map001-K00001", "map001"),
//! ]);
//! let summary = annotate(&mut graph, &seeds);
//! assert_eq!(summary.annotated, 1);
//! assert_eq!(graph.label("g2"), Some("background"));
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod seeds;
pub mod annotate;

pub use config::{
    CategoryFilter, CollectorConfig, ExtractorConfig, SelectionPolicy,
    DEFAULT_HIT_FILE_SUFFIX, DEFAULT_MIN_SCORE, DEFAULT_TOP_K,
};
pub use error::{Error, Result};
pub use extractor::{extract_dir, extract_table, ExtractionFailure, ExtractionReport, SimilarityRecord};
pub use graph::{CoexpressionGraph, EdgeKey, GraphBuilder, NodeAttributes, BACKGROUND_LABEL};
pub use seeds::{SeedGene, SeedGeneCollector, SeedGeneTable};
pub use annotate::{annotate, category_labels, AnnotationSummary, LABEL_SEPARATOR};
