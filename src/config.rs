//! Conversion configuration.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::rule::RuleMode;
use crate::{Error, Result};

/// Default number of benchmark repetitions.
pub const DEFAULT_REPEAT: u32 = 8;
/// Default HiCuts leaf threshold (binth) for fixed-mode corpora.
pub const DEFAULT_LEAF_THRESHOLD: u32 = 16;
/// Generalized HiCuts leaf threshold per prefix dimension.
pub const PREFIX_LEAF_THRESHOLD_PER_DIMENSION: u32 = 10;
/// Default HiCuts space/time trade-off weight.
pub const DEFAULT_SPACE_FACTOR: f64 = 3.0;
/// Default declared rule capacity of every algorithm.
pub const DEFAULT_CAPACITY: u32 = 10000;
/// Tuple-space hash buckets for fixed-mode corpora.
pub const FIXED_TUPLE_BUCKETS: u32 = 107;
/// Tuple-space hash buckets for generalized corpora.
pub const PREFIX_TUPLE_BUCKETS: u32 = 97;

/// Classification algorithms known to the benchmark runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    LinearSearch,
    Bitvector,
    TupleSpace,
    #[serde(rename = "hicuts")]
    #[value(name = "hicuts")]
    HiCuts,
}

impl AlgorithmKind {
    /// All algorithms, in emission order.
    pub const ALL: [AlgorithmKind; 4] = [
        AlgorithmKind::LinearSearch,
        AlgorithmKind::Bitvector,
        AlgorithmKind::TupleSpace,
        AlgorithmKind::HiCuts,
    ];

    /// Script variable holding the algorithm handle.
    pub fn var_name(&self) -> &'static str {
        match self {
            AlgorithmKind::LinearSearch => "algLinSearch",
            AlgorithmKind::Bitvector => "algBitvector",
            AlgorithmKind::TupleSpace => "algTuples",
            AlgorithmKind::HiCuts => "algHiCuts",
        }
    }

    /// Stem of the implementation library name.
    pub fn library_stem(&self) -> &'static str {
        match self {
            AlgorithmKind::LinearSearch => "LinearSearch",
            AlgorithmKind::Bitvector => "Bitvector",
            AlgorithmKind::TupleSpace => "TupleSpace",
            AlgorithmKind::HiCuts => "HiCuts",
        }
    }

    /// Implementation identifier for a corpus of the given dimensionality.
    pub fn implementation(&self, dimensions: usize) -> String {
        format!("{}{}tpl.so", self.library_stem(), dimensions)
    }

    /// Human readable name, used as a benchmark label.
    pub fn display_name(&self) -> &'static str {
        match self {
            AlgorithmKind::LinearSearch => "Linear Search",
            AlgorithmKind::Bitvector => "Bitvector",
            AlgorithmKind::TupleSpace => "Tuple Space Search",
            AlgorithmKind::HiCuts => "HiCuts",
        }
    }
}

/// Options of one conversion run.
///
/// Every field has a named default; unset optional fields resolve per
/// [`RuleMode`] through the accessor methods.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Benchmark repetitions
    pub repeat: u32,
    /// Benchmark label; generalized corpora fall back to algorithm names
    pub label: String,
    /// HiCuts leaf threshold
    pub leaf_threshold: Option<u32>,
    /// HiCuts space/time trade-off weight
    pub space_factor: f64,
    /// Declared rule capacity passed to every algorithm
    pub capacity: u32,
    /// Tuple-space hash buckets
    pub tuple_buckets: Option<u32>,
    /// Generalized-mode dimensionality; inferred from the rules when unset
    pub dimensions: Option<usize>,
    /// Algorithms to declare and benchmark
    pub algorithms: Vec<AlgorithmKind>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            repeat: DEFAULT_REPEAT,
            label: String::new(),
            leaf_threshold: None,
            space_factor: DEFAULT_SPACE_FACTOR,
            capacity: DEFAULT_CAPACITY,
            tuple_buckets: None,
            dimensions: None,
            algorithms: AlgorithmKind::ALL.to_vec(),
        }
    }
}

impl ConvertConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Check every option once, before any input is read.
    pub fn validate(&self) -> Result<()> {
        if self.repeat == 0 {
            return Err(Error::Config("repeat must be positive".into()));
        }
        if self.capacity == 0 {
            return Err(Error::Config("capacity must be positive".into()));
        }
        if self.leaf_threshold == Some(0) {
            return Err(Error::Config("leaf threshold must be positive".into()));
        }
        if self.tuple_buckets == Some(0) {
            return Err(Error::Config("tuple buckets must be positive".into()));
        }
        if !(self.space_factor.is_finite() && self.space_factor > 0.0) {
            return Err(Error::Config(format!(
                "space factor must be a positive number, got {}",
                self.space_factor
            )));
        }
        if self.dimensions == Some(0) {
            return Err(Error::Config("dimensions must be positive".into()));
        }
        if let Some(n) = self.dimensions {
            self.leaf_threshold_for(RuleMode::Prefix(n))?;
        }
        if self.algorithms.is_empty() {
            return Err(Error::Config("at least one algorithm is required".into()));
        }
        Ok(())
    }

    /// Leaf threshold for the given mode.
    ///
    /// The generalized default of ten per dimension must fit in a `u32`.
    pub fn leaf_threshold_for(&self, mode: RuleMode) -> Result<u32> {
        if let Some(threshold) = self.leaf_threshold {
            return Ok(threshold);
        }
        match mode {
            RuleMode::Fixed => Ok(DEFAULT_LEAF_THRESHOLD),
            RuleMode::Prefix(n) => u32::try_from(n)
                .ok()
                .and_then(|n| n.checked_mul(PREFIX_LEAF_THRESHOLD_PER_DIMENSION))
                .ok_or_else(|| Error::Config(format!("{} dimensions overflow the HiCuts leaf threshold", n))),
        }
    }

    /// Tuple-space buckets for the given mode.
    pub fn tuple_buckets_for(&self, mode: RuleMode) -> u32 {
        self.tuple_buckets.unwrap_or(match mode {
            RuleMode::Fixed => FIXED_TUPLE_BUCKETS,
            RuleMode::Prefix(_) => PREFIX_TUPLE_BUCKETS,
        })
    }

    /// Benchmark label for an algorithm in the given mode.
    pub fn label_for(&self, mode: RuleMode, algorithm: AlgorithmKind) -> String {
        match mode {
            RuleMode::Prefix(_) if self.label.is_empty() => algorithm.display_name().to_string(),
            _ => self.label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.repeat, 8);
        assert_eq!(config.label, "");
        assert_eq!(config.leaf_threshold_for(RuleMode::Fixed).unwrap(), 16);
        assert_eq!(config.leaf_threshold_for(RuleMode::Prefix(4)).unwrap(), 40);
        assert_eq!(config.tuple_buckets_for(RuleMode::Fixed), 107);
        assert_eq!(config.tuple_buckets_for(RuleMode::Prefix(2)), 97);
        assert_eq!(config.algorithms, AlgorithmKind::ALL.to_vec());
    }

    #[test]
    fn test_yaml_partial() {
        let config = ConvertConfig::from_yaml_str(
            "repeat: 3\nlabel: acl1\nleaf_threshold: 8\nalgorithms: [linear-search, hicuts]\n",
        )
        .unwrap();
        assert_eq!(config.repeat, 3);
        assert_eq!(config.label, "acl1");
        assert_eq!(config.leaf_threshold_for(RuleMode::Prefix(4)).unwrap(), 8);
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(
            config.algorithms,
            vec![AlgorithmKind::LinearSearch, AlgorithmKind::HiCuts]
        );
    }

    #[test]
    fn test_yaml_unknown_field() {
        assert!(matches!(
            ConvertConfig::from_yaml_str("repeats: 3\n"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_validate_rejects() {
        let bad = [
            ConvertConfig {
                repeat: 0,
                ..Default::default()
            },
            ConvertConfig {
                leaf_threshold: Some(0),
                ..Default::default()
            },
            ConvertConfig {
                space_factor: f64::NAN,
                ..Default::default()
            },
            ConvertConfig {
                dimensions: Some(0),
                ..Default::default()
            },
            ConvertConfig {
                algorithms: Vec::new(),
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_labels() {
        let config = ConvertConfig::default();
        assert_eq!(config.label_for(RuleMode::Fixed, AlgorithmKind::HiCuts), "");
        assert_eq!(
            config.label_for(RuleMode::Prefix(2), AlgorithmKind::TupleSpace),
            "Tuple Space Search"
        );

        let config = ConvertConfig {
            label: "run1".into(),
            ..Default::default()
        };
        assert_eq!(config.label_for(RuleMode::Prefix(2), AlgorithmKind::TupleSpace), "run1");
    }

    #[test]
    fn test_implementation_names() {
        assert_eq!(AlgorithmKind::HiCuts.implementation(5), "HiCuts5tpl.so");
        assert_eq!(AlgorithmKind::TupleSpace.implementation(10), "TupleSpace10tpl.so");
    }

    #[test]
    fn test_dimensions_overflowing_leaf_threshold() {
        let config = ConvertConfig {
            dimensions: Some(500_000_000),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert!(ConvertConfig::default()
            .leaf_threshold_for(RuleMode::Prefix(usize::MAX))
            .is_err());

        let config = ConvertConfig {
            dimensions: Some(500_000_000),
            leaf_threshold: Some(12),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.leaf_threshold_for(RuleMode::Prefix(500_000_000)).unwrap(), 12);
    }
}
