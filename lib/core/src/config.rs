use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default number of candidate partners kept per source gene
pub const DEFAULT_TOP_K: usize = 10;

/// Default inclusive lower bound on the similarity score
pub const DEFAULT_MIN_SCORE: f64 = 4.0;

/// Suffix of the per-group evidence table produced by the homology stage
pub const DEFAULT_HIT_FILE_SUFFIX: &str = "-07-homologous_geneID.txt";

/// Configuration for edge extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorConfig {
    /// Max candidates kept per source gene
    pub k: usize,
    /// Inclusive threshold, applied after the top-K cut
    pub min_score: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl ExtractorConfig {
    pub fn new(k: usize, min_score: f64) -> Result<Self> {
        let config = Self { k, min_score };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidConfig("K must be a positive integer".to_string()));
        }
        if !self.min_score.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "minimum score must be finite, got {}",
                self.min_score
            )));
        }
        Ok(())
    }
}

/// Which evidence groups take part in seed collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Prefixes(Vec<String>),
}

impl CategoryFilter {
    /// Build a filter from raw CLI-style values; a literal `all` anywhere selects everything.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = values.into_iter().map(Into::into).collect();
        if prefixes.iter().any(|p| p == "all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Prefixes(prefixes)
        }
    }

    #[inline]
    pub fn matches(&self, group_name: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Prefixes(prefixes) => {
                prefixes.iter().any(|p| group_name.starts_with(p.as_str()))
            }
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Prefixes(prefixes) => write!(f, "{}", prefixes.join(", ")),
        }
    }
}

/// How many evidence rows survive per group.
///
/// New policies are added as variants; `SeedGeneCollector` dispatches on
/// the variant and refuses any it cannot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SelectionPolicy {
    /// Single row with the lowest evidence score
    #[value(name = "best-only", aliases = ["best_only", "top_only"])]
    BestOnly,
    /// Every hit passing a significance cutoff
    #[value(name = "all-significant", aliases = ["all_significant", "low_evalues"])]
    AllSignificant,
}

impl SelectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::BestOnly => "best-only",
            SelectionPolicy::AllSignificant => "all-significant",
        }
    }

    /// Fails for variants that have no selection routine yet.
    pub fn ensure_implemented(&self) -> Result<()> {
        match self {
            SelectionPolicy::BestOnly => Ok(()),
            SelectionPolicy::AllSignificant => {
                Err(Error::PolicyNotImplemented(self.as_str().to_string()))
            }
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "best-only" | "best_only" | "top_only" => Ok(SelectionPolicy::BestOnly),
            "all-significant" | "all_significant" | "low_evalues" => {
                Ok(SelectionPolicy::AllSignificant)
            }
            other => Err(Error::InvalidConfig(format!(
                "unknown selection policy '{}' (available: best-only, all-significant)",
                other
            ))),
        }
    }
}

/// Configuration for seed-gene collection
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Directory holding one sub-directory per evidence group
    pub root: PathBuf,
    pub categories: CategoryFilter,
    pub policy: SelectionPolicy,
    /// File-name suffix identifying the evidence table inside a group
    pub hit_file_suffix: String,
}

impl CollectorConfig {
    pub fn new<P: Into<PathBuf>>(root: P, categories: CategoryFilter, policy: SelectionPolicy) -> Self {
        Self {
            root: root.into(),
            categories,
            policy,
            hit_file_suffix: DEFAULT_HIT_FILE_SUFFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_hit_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.hit_file_suffix = suffix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_config_rejects_zero_k() {
        assert!(matches!(
            ExtractorConfig::new(0, 4.0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(ExtractorConfig::new(1, 4.0).is_ok());
        assert!(ExtractorConfig::new(10, f64::NAN).is_err());
    }

    #[test]
    fn test_category_filter_all_sentinel() {
        let filter = CategoryFilter::from_values(["map00020", "all"]);
        assert_eq!(filter, CategoryFilter::All);
        assert!(filter.matches("anything"));
    }

    #[test]
    fn test_category_filter_prefix_match() {
        let filter = CategoryFilter::from_values(["map00020", "map00660"]);
        assert!(filter.matches("map00020-K00025_kegg"));
        assert!(filter.matches("map00660-K01958_kegg"));
        assert!(!filter.matches("map00010-K00844_kegg"));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("top_only".parse::<SelectionPolicy>().unwrap(), SelectionPolicy::BestOnly);
        assert_eq!(
            "low_evalues".parse::<SelectionPolicy>().unwrap(),
            SelectionPolicy::AllSignificant
        );
        assert!("everything".parse::<SelectionPolicy>().is_err());
    }

    #[test]
    fn test_unimplemented_policy_fails_fast() {
        assert!(SelectionPolicy::BestOnly.ensure_implemented().is_ok());
        assert!(matches!(
            SelectionPolicy::AllSignificant.ensure_implemented(),
            Err(Error::PolicyNotImplemented(_))
        ));
    }
}
