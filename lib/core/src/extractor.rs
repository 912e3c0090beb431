// Per-gene similarity tables -> candidate edges
use crate::{Error, ExtractorConfig, Result};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One directed similarity observation: `source` scored `target` with `score`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    pub source: String,
    pub target: String,
    pub score: f64,
}

impl SimilarityRecord {
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, score: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            score,
        }
    }

    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A table that could not be used, with the reason
#[derive(Debug)]
pub struct ExtractionFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Result of scanning a whole similarity directory
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub records: Vec<SimilarityRecord>,
    pub tables_read: usize,
    pub failures: Vec<ExtractionFailure>,
}

/// Keep the top `k` rows by score, then drop rows below `min_score`.
///
/// The threshold only sees rows that survived the top-K cut. Sorting is
/// stable, so ties at the K-th rank keep the earlier row.
pub fn select_top_k(
    mut rows: Vec<(String, f64)>,
    k: usize,
    min_score: f64,
) -> Vec<(String, f64)> {
    rows.sort_by_key(|(_, score)| Reverse(OrderedFloat(*score)));
    rows.truncate(k);
    rows.retain(|(_, score)| *score >= min_score);
    rows
}

/// Parse a headerless `target<TAB>score` table.
pub fn read_similarity_table(path: &Path) -> Result<Vec<(String, f64)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let target = match record.get(0).map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                return Err(malformed(path, line, "missing target gene column"));
            }
        };
        let raw_score = record
            .get(1)
            .map(str::trim)
            .ok_or_else(|| malformed(path, line, "missing score column"))?;
        let score: f64 = raw_score
            .parse()
            .map_err(|_| malformed(path, line, &format!("non-numeric score '{}'", raw_score)))?;
        if !score.is_finite() {
            return Err(malformed(path, line, &format!("non-finite score '{}'", raw_score)));
        }

        rows.push((target, score));
    }

    Ok(rows)
}

/// Extract filtered similarity records from one source gene's table.
pub fn extract_table(source: &str, path: &Path, config: &ExtractorConfig) -> Result<Vec<SimilarityRecord>> {
    let rows = read_similarity_table(path)?;
    let total = rows.len();

    let mut records = Vec::new();
    for (target, score) in select_top_k(rows, config.k, config.min_score) {
        if target == source {
            warn!("Dropping self-loop {} -> {} in {:?}", source, target, path);
            continue;
        }
        records.push(SimilarityRecord::new(source, target, score));
    }

    debug!("{}: kept {} of {} rows", source, records.len(), total);
    Ok(records)
}

/// Source gene identity is the file's base name without its extension.
pub fn source_gene_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// List similarity tables in `dir`, sorted, hidden files skipped.
pub fn list_tables(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false);
        if path.is_file() && !hidden {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Extract candidate edges from every table in `dir`.
///
/// Tables are processed in parallel. A bad table is logged and reported
/// in [`ExtractionReport::failures`]; the rest of the directory still runs.
pub fn extract_dir(dir: &Path, config: &ExtractorConfig) -> Result<ExtractionReport> {
    config.validate()?;
    let paths = list_tables(dir)?;

    let outcomes: Vec<(PathBuf, Result<Vec<SimilarityRecord>>)> = paths
        .into_par_iter()
        .map(|path| {
            let outcome = match source_gene_name(&path) {
                Some(source) => extract_table(&source, &path, config),
                None => Err(malformed(&path, 0, "file name is not a valid gene identifier")),
            };
            (path, outcome)
        })
        .collect();

    let mut report = ExtractionReport::default();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(records) => {
                report.tables_read += 1;
                report.records.extend(records);
            }
            Err(error) => {
                warn!("Skipping similarity table {:?}: {}", path, error);
                report.failures.push(ExtractionFailure { path, error });
            }
        }
    }

    info!(
        "Extracted {} candidate edges from {} tables ({} skipped, K={}, min score={})",
        report.records.len(),
        report.tables_read,
        report.failures.len(),
        config.k,
        config.min_score
    );

    Ok(report)
}

fn malformed(path: &Path, line: u64, reason: &str) -> Error {
    Error::MalformedTable {
        path: path.to_path_buf(),
        line,
        reason: reason.to_string(),
    }
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(io) => Error::io(path, io),
        other => malformed(path, line, &format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rows(values: &[(&str, f64)]) -> Vec<(String, f64)> {
        values.iter().map(|(g, s)| (g.to_string(), *s)).collect()
    }

    fn write_table(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_top_k_applied_before_threshold() {
        let input = rows(&[("g4", 7.0), ("g1", 10.0), ("g3", 8.0), ("g2", 9.0)]);
        let kept = select_top_k(input, 3, 8.0);
        assert_eq!(kept, rows(&[("g1", 10.0), ("g2", 9.0), ("g3", 8.0)]));
    }

    #[test]
    fn test_row_outside_top_k_is_excluded_even_above_threshold() {
        let input: Vec<(String, f64)> = (0..11)
            .map(|i| (format!("g{}", i), 20.0 - i as f64))
            .collect();
        let kept = select_top_k(input, 10, 4.0);
        assert_eq!(kept.len(), 10);
        assert!(kept.iter().all(|(g, _)| g != "g10"));
    }

    #[test]
    fn test_fewer_rows_than_k() {
        let kept = select_top_k(rows(&[("a", 5.0), ("b", 3.0)]), 10, 4.0);
        assert_eq!(kept, rows(&[("a", 5.0)]));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let kept = select_top_k(rows(&[("a", 4.0), ("b", 3.999)]), 10, 4.0);
        assert_eq!(kept, rows(&[("a", 4.0)]));
    }

    #[test]
    fn test_ties_at_cut_are_deterministic() {
        let input = rows(&[("a", 5.0), ("b", 5.0), ("c", 5.0)]);
        let first = select_top_k(input.clone(), 2, 0.0);
        let second = select_top_k(input, 2, 0.0);
        assert_eq!(first, second);
        assert_eq!(first, rows(&[("a", 5.0), ("b", 5.0)]));
    }

    #[test]
    fn test_bounds_hold_for_every_table() {
        for n in 0..20usize {
            let input: Vec<(String, f64)> = (0..n)
                .map(|i| (format!("g{}", i), ((i * 7) % 13) as f64))
                .collect();
            let kept = select_top_k(input, 5, 6.0);
            assert!(kept.len() <= 5);
            assert!(kept.iter().all(|(_, s)| *s >= 6.0));
        }
    }

    #[test]
    fn test_extract_table_tags_source_and_drops_self_loop() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(dir.path(), "AT1G01010.txt", "AT1G01010\t99.0\nAT1G02020\t12.5\nAT1G03030\t3.0\n");
        let config = ExtractorConfig::default();
        let records = extract_table("AT1G01010", &path, &config).unwrap();
        assert_eq!(records, vec![SimilarityRecord::new("AT1G01010", "AT1G02020", 12.5)]);
    }

    #[test]
    fn test_non_numeric_score_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(dir.path(), "g1", "g2\t5.0\ng3\tabc\n");
        let err = read_similarity_table(&path).unwrap_err();
        match err {
            Error::MalformedTable { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_score_column_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(dir.path(), "g1", "g2\n");
        assert!(matches!(
            read_similarity_table(&path),
            Err(Error::MalformedTable { .. })
        ));
    }

    #[test]
    fn test_extract_dir_continues_past_bad_table() {
        let dir = tempfile::tempdir().unwrap();
        write_table(dir.path(), "g1", "g2\t10\ng3\t6\n");
        write_table(dir.path(), "g2", "g1\tnot-a-number\n");
        write_table(dir.path(), ".hidden", "junk\n");

        let report = extract_dir(dir.path(), &ExtractorConfig::new(10, 5.0).unwrap()).unwrap();
        assert_eq!(report.tables_read, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("g2"));
        assert_eq!(
            report.records,
            vec![
                SimilarityRecord::new("g1", "g2", 10.0),
                SimilarityRecord::new("g1", "g3", 6.0),
            ]
        );
    }

    #[test]
    fn test_extract_dir_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            extract_dir(&missing, &ExtractorConfig::default()),
            Err(Error::Io { .. })
        ));
    }
}
