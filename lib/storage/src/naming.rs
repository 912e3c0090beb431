// Output file naming shared by the build and annotate stages
use std::path::{Path, PathBuf};

/// Stem of a freshly built graph file
pub const GRAPH_PREFIX: &str = "sbi_G";

/// Stem of an annotated graph file
pub const ANNOTATED_PREFIX: &str = "sbi_G_annotated";

/// Default graph file extension
pub const GRAPH_EXTENSION: &str = "json";

/// Suffix of the seed-gene side table written next to an annotated graph
pub const SEED_TABLE_SUFFIX: &str = "seed_genes.tsv";

/// Build parameters encoded in graph file names (`..-z{min_score}_k{K}`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphParams {
    pub min_score: f64,
    pub k: usize,
}

impl GraphParams {
    pub fn new(min_score: f64, k: usize) -> Self {
        Self { min_score, k }
    }

    fn tag(&self) -> String {
        format!("z{:?}_k{}", self.min_score, self.k)
    }
}

/// `sbi_G-z4.0_k10.json`
pub fn graph_file_name(params: GraphParams) -> String {
    format!("{}-{}.{}", GRAPH_PREFIX, params.tag(), GRAPH_EXTENSION)
}

/// `sbi_G_annotated-z4.0_k10.json`
pub fn annotated_file_name(params: GraphParams) -> String {
    format!("{}-{}.{}", ANNOTATED_PREFIX, params.tag(), GRAPH_EXTENSION)
}

/// File name without the `.json` / `.json.gz` extension
pub fn graph_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let name = name.strip_suffix(".gz").unwrap_or(name);
    Some(name.strip_suffix(".json").unwrap_or(name))
}

/// Recover build parameters from a graph file name such as `sbi_G-z4.0_k10.json`.
pub fn parse_graph_file_name(path: &Path) -> Option<GraphParams> {
    let stem = graph_stem(path)?;
    let (_, tag) = stem.split_once('-')?;
    let (z, k) = tag.split_once('_')?;
    let min_score = z.strip_prefix('z')?.parse().ok()?;
    let k = k.strip_prefix('k')?.parse().ok()?;
    Some(GraphParams { min_score, k })
}

/// Default annotated output, next to the input graph
pub fn default_annotated_path(graph_path: &Path) -> Option<PathBuf> {
    let params = parse_graph_file_name(graph_path)?;
    let parent = graph_path.parent().unwrap_or_else(|| Path::new(""));
    Some(parent.join(annotated_file_name(params)))
}

/// `<dir>/<stem>.seed_genes.tsv` for a graph written at `graph_path`
pub fn seed_table_path(graph_path: &Path) -> PathBuf {
    let stem = graph_stem(graph_path).unwrap_or("graph");
    graph_path.with_file_name(format!("{}.{}", stem, SEED_TABLE_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_file_name_keeps_decimal() {
        assert_eq!(graph_file_name(GraphParams::new(4.0, 10)), "sbi_G-z4.0_k10.json");
        assert_eq!(annotated_file_name(GraphParams::new(5.5, 3)), "sbi_G_annotated-z5.5_k3.json");
    }

    #[test]
    fn test_parse_graph_file_name() {
        let params = parse_graph_file_name(Path::new("results/gene_network/sbi_G-z4.0_k10.json")).unwrap();
        assert_eq!(params, GraphParams::new(4.0, 10));
        let params = parse_graph_file_name(Path::new("sbi_G-z6.5_k20.json.gz")).unwrap();
        assert_eq!(params, GraphParams::new(6.5, 20));
        assert!(parse_graph_file_name(Path::new("network.json")).is_none());
    }

    #[test]
    fn test_default_annotated_path() {
        let path = default_annotated_path(Path::new("out/sbi_G-z4.0_k10.json")).unwrap();
        assert_eq!(path, PathBuf::from("out/sbi_G_annotated-z4.0_k10.json"));
    }

    #[test]
    fn test_seed_table_path() {
        assert_eq!(
            seed_table_path(Path::new("out/sbi_G_annotated-z4.0_k10.json")),
            PathBuf::from("out/sbi_G_annotated-z4.0_k10.seed_genes.tsv")
        );
        assert_eq!(
            seed_table_path(Path::new("g.json.gz")),
            PathBuf::from("g.seed_genes.tsv")
        );
    }
}
