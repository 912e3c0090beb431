// Seed-gene collection from per-group homology evidence
use crate::{CollectorConfig, Error, Result, SelectionPolicy};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column holding the gene identifier in evidence tables
pub const GENE_ID_COLUMN: &str = "gene_id";

/// Preferred evidence score column, with the legacy e-value header as fallback
pub const SCORE_COLUMNS: [&str; 2] = ["evidence_score", "evalue"];

/// Columns derived during collection; never taken from the input
const DERIVED_COLUMNS: [&str; 2] = ["source", "category"];

/// A gene with evidence of belonging to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedGene {
    pub gene_id: String,
    /// Lower is stronger (e-value semantics)
    pub evidence_score: f64,
    /// Evidence group the row came from
    pub source: String,
    /// Category tag derived from the group name
    pub category: String,
    /// Pass-through columns, in the input table's header order
    #[serde(default)]
    pub extra: Vec<(String, String)>,
}

impl SeedGene {
    pub fn new(
        gene_id: impl Into<String>,
        evidence_score: f64,
        source: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            gene_id: gene_id.into(),
            evidence_score,
            source: source.into(),
            category: category.into(),
            extra: Vec::new(),
        }
    }

    pub fn extra_value(&self, column: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// Seed genes concatenated across all retained groups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedGeneTable {
    genes: Vec<SeedGene>,
    extra_columns: Vec<String>,
}

impl SeedGeneTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_genes(genes: Vec<SeedGene>) -> Self {
        let mut table = Self::new();
        for gene in genes {
            table.push(gene);
        }
        table
    }

    pub fn push(&mut self, gene: SeedGene) {
        for (name, _) in &gene.extra {
            if !self.extra_columns.iter().any(|c| c == name) {
                self.extra_columns.push(name.clone());
            }
        }
        self.genes.push(gene);
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn genes(&self) -> &[SeedGene] {
        &self.genes
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeedGene> {
        self.genes.iter()
    }

    /// Union of pass-through column names, first-seen order
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.genes.iter().map(|g| g.category.as_str()).collect()
    }
}

/// Category tag: the group name up to its first `-`.
pub fn category_of(group_name: &str) -> &str {
    group_name.split('-').next().unwrap_or(group_name)
}

/// Evidence source: the group name without its `_kegg` suffix.
pub fn source_of(group_name: &str) -> &str {
    group_name.strip_suffix("_kegg").unwrap_or(group_name)
}

struct EvidenceRow {
    gene_id: String,
    score: f64,
    extra: Vec<(String, String)>,
}

/// Gathers seed genes from a directory of evidence groups
pub struct SeedGeneCollector {
    config: CollectorConfig,
}

impl SeedGeneCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Run collection. Any failure here is terminal for the run.
    pub fn collect(&self) -> Result<SeedGeneTable> {
        // Policy check happens before touching the filesystem.
        self.config.policy.ensure_implemented()?;

        let groups = self.matching_groups()?;
        if groups.is_empty() {
            return Err(self.no_evidence());
        }

        let per_group: Vec<Vec<SeedGene>> = groups
            .par_iter()
            .map(|group| self.collect_group(group))
            .collect::<Result<_>>()?;

        let table = SeedGeneTable::from_genes(per_group.into_iter().flatten().collect());
        if table.is_empty() {
            return Err(self.no_evidence());
        }

        info!(
            "Seed genes collected: {} rows from {} groups across categories [{}]",
            table.len(),
            groups.len(),
            self.config.categories
        );
        Ok(table)
    }

    /// Sub-directories of the root whose names pass the category filter, sorted.
    pub fn matching_groups(&self) -> Result<Vec<PathBuf>> {
        let root = &self.config.root;
        let mut groups = Vec::new();
        for entry in fs::read_dir(root).map_err(|e| Error::io(root, e))? {
            let entry = entry.map_err(|e| Error::io(root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|name| self.config.categories.matches(name))
                .unwrap_or(false);
            if matches {
                groups.push(path);
            }
        }
        groups.sort();
        Ok(groups)
    }

    fn collect_group(&self, group: &Path) -> Result<Vec<SeedGene>> {
        let name = group
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::EmptyEvidenceGroup {
                group: group.to_path_buf(),
            })?;

        let hit_file = find_hit_file(group, &self.config.hit_file_suffix)?.ok_or_else(|| {
            Error::EmptyEvidenceGroup {
                group: group.to_path_buf(),
            }
        })?;

        let rows = read_evidence_table(&hit_file)?;
        if rows.is_empty() {
            return Err(Error::EmptyEvidenceGroup {
                group: group.to_path_buf(),
            });
        }
        debug!("{}: {} evidence rows in {:?}", name, rows.len(), hit_file);

        let category = category_of(name);
        let source = source_of(name);
        let selected = apply_policy(self.config.policy, rows)?;

        Ok(selected
            .into_iter()
            .map(|row| SeedGene {
                gene_id: row.gene_id,
                evidence_score: row.score,
                source: source.to_string(),
                category: category.to_string(),
                extra: row.extra,
            })
            .collect())
    }

    fn no_evidence(&self) -> Error {
        Error::NoEvidenceFound {
            root: self.config.root.clone(),
            categories: self.config.categories.to_string(),
        }
    }
}

/// First file (by name) in `group` ending with `suffix`.
fn find_hit_file(group: &Path, suffix: &str) -> Result<Option<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(group).map_err(|e| Error::io(group, e))? {
        let entry = entry.map_err(|e| Error::io(group, e))?;
        let path = entry.path();
        let is_hit = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(suffix))
            .unwrap_or(false);
        if is_hit && path.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}

fn apply_policy(policy: SelectionPolicy, rows: Vec<EvidenceRow>) -> Result<Vec<EvidenceRow>> {
    match policy {
        SelectionPolicy::BestOnly => {
            // Strict `<` keeps the first row among equal scores.
            let mut best: Option<EvidenceRow> = None;
            for row in rows {
                if best.as_ref().map_or(true, |current| row.score < current.score) {
                    best = Some(row);
                }
            }
            Ok(best.into_iter().collect())
        }
        SelectionPolicy::AllSignificant => Err(Error::PolicyNotImplemented(policy.to_string())),
    }
}

fn read_evidence_table(path: &Path) -> Result<Vec<EvidenceRow>> {
    let malformed = |reason: String| Error::MalformedEvidence {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(io) => Error::io(path, io),
            other => malformed(format!("{:?}", other)),
        })?;

    let headers = reader
        .headers()
        .map_err(|e| malformed(e.to_string()))?
        .clone();
    let gene_idx = headers
        .iter()
        .position(|h| h == GENE_ID_COLUMN)
        .ok_or_else(|| malformed(format!("missing '{}' column", GENE_ID_COLUMN)))?;
    let score_idx = SCORE_COLUMNS
        .iter()
        .find_map(|col| headers.iter().position(|h| h == *col))
        .ok_or_else(|| malformed(format!("missing '{}' column", SCORE_COLUMNS[0])))?;
    let extra_idx: Vec<usize> = (0..headers.len())
        .filter(|&i| i != gene_idx && i != score_idx && !DERIVED_COLUMNS.contains(&&headers[i]))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let gene_id = record.get(gene_idx).map(str::trim).unwrap_or_default();
        if gene_id.is_empty() {
            return Err(malformed(format!("line {}: empty gene_id", line)));
        }
        let raw_score = record.get(score_idx).map(str::trim).unwrap_or_default();
        let score: f64 = raw_score
            .parse()
            .ok()
            .filter(|s: &f64| !s.is_nan())
            .ok_or_else(|| malformed(format!("line {}: invalid evidence score '{}'", line, raw_score)))?;

        let extra = extra_idx
            .iter()
            .map(|&i| {
                (
                    headers[i].to_string(),
                    record.get(i).unwrap_or_default().to_string(),
                )
            })
            .collect();

        rows.push(EvidenceRow {
            gene_id: gene_id.to_string(),
            score,
            extra,
        });
    }

    Ok(rows)
}
