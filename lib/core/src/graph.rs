// Undirected weighted co-expression graph
use crate::SimilarityRecord;
use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Label carried by nodes without seed-gene evidence
pub const BACKGROUND_LABEL: &str = "background";

/// Unordered node pair. The smaller identifier is always stored first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    a: String,
    b: String,
}

impl EdgeKey {
    /// Returns `None` for a self-loop.
    pub fn new(u: &str, v: &str) -> Option<Self> {
        match u.cmp(v) {
            std::cmp::Ordering::Less => Some(Self { a: u.to_string(), b: v.to_string() }),
            std::cmp::Ordering::Greater => Some(Self { a: v.to_string(), b: u.to_string() }),
            std::cmp::Ordering::Equal => None,
        }
    }

    #[inline]
    pub fn first(&self) -> &str {
        &self.a
    }

    #[inline]
    pub fn second(&self) -> &str {
        &self.b
    }

    #[inline]
    pub fn contains(&self, node: &str) -> bool {
        self.a == node || self.b == node
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub category_label: String,
}

impl Default for NodeAttributes {
    fn default() -> Self {
        Self {
            category_label: BACKGROUND_LABEL.to_string(),
        }
    }
}

/// Gene co-expression network: one weight per unordered gene pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoexpressionGraph {
    edges: AHashMap<EdgeKey, f64>,
    nodes: AHashMap<String, NodeAttributes>,
}

impl CoexpressionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.contains_key(node)
    }

    /// Weight of `{u, v}`, in either order
    pub fn weight(&self, u: &str, v: &str) -> Option<f64> {
        EdgeKey::new(u, v).and_then(|key| self.edges.get(&key).copied())
    }

    pub fn label(&self, node: &str) -> Option<&str> {
        self.nodes.get(node).map(|attrs| attrs.category_label.as_str())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeAttributes)> {
        self.nodes.iter().map(|(id, attrs)| (id.as_str(), attrs))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, f64)> {
        self.edges.iter().map(|(key, w)| (key, *w))
    }

    pub fn sorted_nodes(&self) -> Vec<(&str, &NodeAttributes)> {
        let mut nodes: Vec<_> = self.nodes().collect();
        nodes.sort_by(|a, b| a.0.cmp(b.0));
        nodes
    }

    pub fn sorted_edges(&self) -> Vec<(&EdgeKey, f64)> {
        let mut edges: Vec<_> = self.edges().collect();
        edges.sort_by(|a, b| a.0.cmp(b.0));
        edges
    }

    /// Neighbours of `node` with edge weights, sorted by id
    pub fn neighbors(&self, node: &str) -> Vec<(&str, f64)> {
        let mut out: Vec<(&str, f64)> = self
            .edges
            .iter()
            .filter_map(|(key, w)| {
                if key.first() == node {
                    Some((key.second(), *w))
                } else if key.second() == node {
                    Some((key.first(), *w))
                } else {
                    None
                }
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// Fold one weighted pair into the graph, keeping the maximum weight.
    ///
    /// Returns `false` if the pair was rejected as a self-loop.
    pub fn add_edge(&mut self, u: &str, v: &str, weight: f64) -> bool {
        let Some(key) = EdgeKey::new(u, v) else {
            debug!("Ignoring self-loop on {}", u);
            return false;
        };

        self.edges
            .entry(key)
            .and_modify(|w| {
                if weight > *w {
                    *w = weight;
                }
            })
            .or_insert(weight);

        for node in [u, v] {
            if !self.nodes.contains_key(node) {
                self.nodes.insert(node.to_string(), NodeAttributes::default());
            }
        }
        true
    }

    #[inline]
    pub fn add_similarity(&mut self, record: &SimilarityRecord) -> bool {
        self.add_edge(&record.source, &record.target, record.score)
    }

    /// Insert a node without edges (used when restoring persisted graphs).
    pub fn insert_node(&mut self, node: impl Into<String>, attrs: NodeAttributes) {
        self.nodes.insert(node.into(), attrs);
    }

    pub fn set_label(&mut self, node: &str, label: impl Into<String>) -> bool {
        match self.nodes.get_mut(node) {
            Some(attrs) => {
                attrs.category_label = label.into();
                true
            }
            None => false,
        }
    }

    /// Reset every node label to [`BACKGROUND_LABEL`]
    pub fn reset_labels(&mut self) {
        for attrs in self.nodes.values_mut() {
            attrs.category_label = BACKGROUND_LABEL.to_string();
        }
    }

    /// Combine two partial graphs. Shared pairs keep the larger weight.
    ///
    /// Merge is commutative and associative on edges, so chunked builds
    /// produce the same graph as a single sequential pass.
    #[must_use]
    pub fn merge(self, other: CoexpressionGraph) -> Self {
        let (mut big, small) = if self.edges.len() >= other.edges.len() {
            (self, other)
        } else {
            (other, self)
        };

        for (key, weight) in small.edges {
            big.edges
                .entry(key)
                .and_modify(|w| {
                    if weight > *w {
                        *w = weight;
                    }
                })
                .or_insert(weight);
        }
        for (node, attrs) in small.nodes {
            big.nodes.entry(node).or_insert(attrs);
        }
        big
    }
}

/// Folds similarity records into a [`CoexpressionGraph`]
pub struct GraphBuilder;

impl GraphBuilder {
    /// Sequential streaming fold
    pub fn build<'a, I>(records: I) -> CoexpressionGraph
    where
        I: IntoIterator<Item = &'a SimilarityRecord>,
    {
        let mut graph = CoexpressionGraph::new();
        let mut rejected = 0usize;
        for record in records {
            if !graph.add_similarity(record) {
                rejected += 1;
            }
        }
        Self::log_built(&graph, rejected);
        graph
    }

    /// Parallel fold-then-merge. Yields the same graph as [`GraphBuilder::build`].
    pub fn build_parallel(records: &[SimilarityRecord]) -> CoexpressionGraph {
        let graph = records
            .par_iter()
            .fold(CoexpressionGraph::new, |mut graph, record| {
                graph.add_similarity(record);
                graph
            })
            .reduce(CoexpressionGraph::new, CoexpressionGraph::merge);
        let rejected = records.iter().filter(|r| r.is_self_loop()).count();
        Self::log_built(&graph, rejected);
        graph
    }

    fn log_built(graph: &CoexpressionGraph, rejected: usize) {
        info!(
            "Built graph: {} nodes, {} edges ({} self-loops dropped)",
            graph.node_count(),
            graph.edge_count(),
            rejected
        );
    }
}
