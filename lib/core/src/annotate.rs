// Category label overlay for graph nodes
use crate::{CoexpressionGraph, SeedGeneTable, BACKGROUND_LABEL};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Separator between categories in a multi-category label
pub const LABEL_SEPARATOR: &str = ",";

/// Outcome of an annotation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationSummary {
    /// Graph nodes that received a category label
    pub annotated: usize,
    /// Total graph nodes
    pub total: usize,
    /// Seed genes that are not nodes of the graph
    pub absent_seed_genes: usize,
}

/// Reduce seed genes by id into their rendered label.
///
/// Categories are de-duplicated and sorted before joining, so the label
/// does not depend on the order of the seed table.
pub fn category_labels(seeds: &SeedGeneTable) -> BTreeMap<String, String> {
    let mut grouped: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for seed in seeds.iter() {
        grouped
            .entry(seed.gene_id.as_str())
            .or_default()
            .insert(seed.category.as_str());
    }

    grouped
        .into_iter()
        .map(|(gene, categories)| {
            let label = categories.into_iter().collect::<Vec<_>>().join(LABEL_SEPARATOR);
            (gene.to_string(), label)
        })
        .collect()
}

/// Populate every node's `category_label` from `seeds`.
///
/// Labels are reset to background first, which makes repeated calls with
/// the same table idempotent.
pub fn annotate(graph: &mut CoexpressionGraph, seeds: &SeedGeneTable) -> AnnotationSummary {
    graph.reset_labels();

    let mut annotated = 0;
    let mut absent = 0;
    for (gene, label) in category_labels(seeds) {
        if graph.set_label(&gene, label) {
            annotated += 1;
        } else {
            absent += 1;
        }
    }

    let summary = AnnotationSummary {
        annotated,
        total: graph.node_count(),
        absent_seed_genes: absent,
    };
    info!(
        "Annotated {} / {} nodes as seed genes ({} seed genes absent from graph)",
        summary.annotated, summary.total, summary.absent_seed_genes
    );
    summary
}

/// True if `label` is the default background label
#[inline]
pub fn is_background(label: &str) -> bool {
    label == BACKGROUND_LABEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphBuilder, SeedGene, SimilarityRecord};

    fn graph() -> CoexpressionGraph {
        GraphBuilder::build(&[
            SimilarityRecord::new("g1", "g2", 10.0),
            SimilarityRecord::new("g3", "g4", 5.0),
        ])
    }

    fn seed(gene: &str, category: &str) -> SeedGene {
        SeedGene::new(gene, 1e-30, format!("{}-K00001", category), category)
    }

    #[test]
    fn test_labels_sorted_regardless_of_order() {
        let forward = SeedGeneTable::from_genes(vec![seed("g1", "B"), seed("g1", "A")]);
        let backward = SeedGeneTable::from_genes(vec![seed("g1", "A"), seed("g1", "B")]);
        assert_eq!(category_labels(&forward)["g1"], "A,B");
        assert_eq!(category_labels(&backward)["g1"], "A,B");
    }

    #[test]
    fn test_duplicate_categories_collapse() {
        let seeds = SeedGeneTable::from_genes(vec![seed("g1", "map00020"), seed("g1", "map00020")]);
        assert_eq!(category_labels(&seeds)["g1"], "map00020");
    }

    #[test]
    fn test_annotate_overlays_and_ignores_absent() {
        let mut g = graph();
        let seeds = SeedGeneTable::from_genes(vec![
            seed("g1", "map00660"),
            seed("g1", "map00020"),
            seed("g3", "map00020"),
            seed("not_in_graph", "map00020"),
        ]);
        let summary = annotate(&mut g, &seeds);

        assert_eq!(
            summary,
            AnnotationSummary {
                annotated: 2,
                total: 4,
                absent_seed_genes: 1
            }
        );
        assert_eq!(g.label("g1"), Some("map00020,map00660"));
        assert_eq!(g.label("g2"), Some(BACKGROUND_LABEL));
        assert_eq!(g.label("g3"), Some("map00020"));
        assert!(g.label("not_in_graph").is_none());
        assert_eq!(g.node_count(), 4);
    }

    #[test]
    fn test_annotate_is_idempotent() {
        let seeds = SeedGeneTable::from_genes(vec![seed("g2", "X"), seed("g4", "Y")]);
        let mut once = graph();
        annotate(&mut once, &seeds);
        let mut twice = once.clone();
        annotate(&mut twice, &seeds);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reannotation_clears_stale_labels() {
        let mut g = graph();
        annotate(&mut g, &SeedGeneTable::from_genes(vec![seed("g1", "A")]));
        annotate(&mut g, &SeedGeneTable::from_genes(vec![seed("g2", "B")]));
        assert!(is_background(g.label("g1").unwrap()));
        assert_eq!(g.label("g2"), Some("B"));
    }
}
