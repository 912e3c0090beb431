// Seed-gene table export (TSV with header)
use crate::snapshot::write_atomic;
use anyhow::{Context, Result};
use coexnet_core::SeedGeneTable;
use std::path::Path;
use tracing::info;

/// Header of an exported seed table: fixed columns around the pass-through ones
pub fn seed_table_header(table: &SeedGeneTable) -> Vec<String> {
    let mut header = vec!["gene_id".to_string(), "evidence_score".to_string()];
    header.extend(table.extra_columns().iter().cloned());
    header.push("source".to_string());
    header.push("category".to_string());
    header
}

/// Render `table` as tab-separated text.
pub fn seed_table_to_tsv(table: &SeedGeneTable) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());

    writer.write_record(seed_table_header(table))?;
    for gene in table.iter() {
        let mut row = vec![gene.gene_id.clone(), format!("{:?}", gene.evidence_score)];
        for column in table.extra_columns() {
            row.push(gene.extra_value(column).unwrap_or_default().to_string());
        }
        row.push(gene.source.clone());
        row.push(gene.category.clone());
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush seed table: {}", e))
}

/// Write `table` to `path` for inspection.
pub fn write_seed_table(path: &Path, table: &SeedGeneTable) -> Result<()> {
    let bytes = seed_table_to_tsv(table)?;
    write_atomic(path, &bytes).with_context(|| format!("Failed to save seed table {:?}", path))?;
    info!("Seed genes table saved to: {:?} ({} rows)", path, table.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coexnet_core::SeedGene;

    #[test]
    fn test_export_columns_and_rows() {
        let mut with_extra = SeedGene::new("AT2G01", 1e-50, "map00020-K00025", "map00020");
        with_extra.extra.push(("protein".to_string(), "P12345".to_string()));
        let plain = SeedGene::new("AT3G02", 0.5, "map00660-K01958", "map00660");
        let table = SeedGeneTable::from_genes(vec![with_extra, plain]);

        let text = String::from_utf8(seed_table_to_tsv(&table).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "gene_id\tevidence_score\tprotein\tsource\tcategory");
        assert_eq!(lines[1], "AT2G01\t1e-50\tP12345\tmap00020-K00025\tmap00020");
        assert_eq!(lines[2], "AT3G02\t0.5\t\tmap00660-K01958\tmap00660");
    }

    #[test]
    fn test_write_seed_table_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/seeds.tsv");
        let table = SeedGeneTable::from_genes(vec![SeedGene::new("g1", 0.1, "A-1", "A")]);
        write_seed_table(&path, &table).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("gene_id\tevidence_score\tsource\tcategory\n"));
        assert!(text.contains("g1\t0.1\tA-1\tA"));
    }
}
