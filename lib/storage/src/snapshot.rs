// Graph files in node-link JSON layout, optionally gzip-compressed
use anyhow::{anyhow, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use coexnet_core::{CoexpressionGraph, NodeAttributes};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Description of a written graph file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphFileDescription {
    pub path: PathBuf,
    pub size: u64,
    pub checksum: String,
    pub creation_time: String,
}

/// Graph-level attributes stored alongside nodes and links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub annotated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// On-disk document; field names follow the node-link convention
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeLinkData {
    pub directed: bool,
    pub multigraph: bool,
    pub graph: GraphMetadata,
    pub nodes: Vec<NodeData>,
    pub links: Vec<LinkData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    pub category_label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkData {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

impl NodeLinkData {
    /// Nodes and links are emitted in sorted order so identical graphs give identical files.
    pub fn from_graph(graph: &CoexpressionGraph, metadata: GraphMetadata) -> Self {
        let nodes = graph
            .sorted_nodes()
            .into_iter()
            .map(|(id, attrs)| NodeData {
                id: id.to_string(),
                category_label: attrs.category_label.clone(),
            })
            .collect();
        let links = graph
            .sorted_edges()
            .into_iter()
            .map(|(key, weight)| LinkData {
                source: key.first().to_string(),
                target: key.second().to_string(),
                weight,
            })
            .collect();

        Self {
            directed: false,
            multigraph: false,
            graph: metadata,
            nodes,
            links,
        }
    }

    pub fn into_graph(self) -> Result<(CoexpressionGraph, GraphMetadata)> {
        if self.directed || self.multigraph {
            return Err(anyhow!("Only simple undirected graphs are supported"));
        }

        let mut graph = CoexpressionGraph::new();
        for node in self.nodes {
            graph.insert_node(
                node.id,
                NodeAttributes {
                    category_label: node.category_label,
                },
            );
        }
        for link in self.links {
            if !graph.add_edge(&link.source, &link.target, link.weight) {
                return Err(anyhow!("Self-loop on '{}' in graph file", link.source));
            }
        }
        Ok((graph, self.graph))
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

/// Serialize `graph` to `path`. A `.gz` extension compresses the payload.
pub fn write_graph(path: &Path, graph: &CoexpressionGraph, mut metadata: GraphMetadata) -> Result<GraphFileDescription> {
    let now: DateTime<Utc> = Utc::now();
    let creation_time = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    metadata.created_at = Some(creation_time.clone());

    let data = NodeLinkData::from_graph(graph, metadata);
    let json_data = serde_json::to_vec_pretty(&data)?;

    let bytes = if is_gzip(path) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json_data)?;
        encoder.finish()?
    } else {
        json_data
    };

    write_atomic(path, &bytes)?;

    let description = GraphFileDescription {
        path: path.to_path_buf(),
        size: bytes.len() as u64,
        checksum: format!("{:x}", Sha256::digest(&bytes)),
        creation_time,
    };
    info!(
        "Graph saved to {:?} ({} nodes, {} edges, {} bytes, sha256 {})",
        description.path,
        graph.node_count(),
        graph.edge_count(),
        description.size,
        description.checksum
    );
    Ok(description)
}

/// Load a graph written by [`write_graph`].
pub fn load_graph(path: &Path) -> Result<(CoexpressionGraph, GraphMetadata)> {
    let raw = fs::read(path).with_context(|| format!("Failed to read graph file {:?}", path))?;

    let json_data = if is_gzip(path) {
        let mut decoder = GzDecoder::new(raw.as_slice());
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .with_context(|| format!("Failed to decompress graph file {:?}", path))?;
        out
    } else {
        raw
    };

    let data: NodeLinkData = serde_json::from_slice(&json_data)
        .with_context(|| format!("Invalid graph file {:?}", path))?;
    let (graph, metadata) = data.into_graph()?;
    info!(
        "Loaded graph from {:?}: {} nodes, {} edges",
        path,
        graph.node_count(),
        graph.edge_count()
    );
    Ok((graph, metadata))
}

/// Atomic replace of `path`, creating parent directories as needed.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(bytes))
        .map_err(|e| anyhow!("Failed to write {:?}: {}", path, e))
}
