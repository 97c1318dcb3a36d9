//! Tuple-space dimensionality of a rule corpus.
//!
//! Prefix lengths are read from the raw rule text rather than from
//! classified atoms: a `/32` subnet is folded into an exact atom and no
//! longer carries its length.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::parser::{parse_subnet, split_fields, RULE_MARKER};
use crate::{Error, Result};

/// (source prefix length, destination prefix length) of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleKey {
    pub src_len: u8,
    pub dst_len: u8,
}

impl TupleKey {
    pub fn new(src_len: u8, dst_len: u8) -> Self {
        Self { src_len, dst_len }
    }

    /// Extract the key from the first two fields of a rule line.
    ///
    /// A leading rule marker on the first field is ignored.
    pub fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line);
        if fields.len() < 2 {
            return Err(Error::FieldCountMismatch {
                expected: 2,
                actual: fields.len(),
                shape: "source and destination subnets",
            });
        }
        let src = fields[0].strip_prefix(RULE_MARKER).unwrap_or(fields[0]);
        let src = parse_subnet(src, 1)?;
        let dst = parse_subnet(fields[1], 2)?;
        Ok(Self::new(src.prefix_len(), dst.prefix_len()))
    }
}

impl fmt::Display for TupleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.src_len, self.dst_len)
    }
}

/// Distinct tuples observed in a corpus, in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TupleReport {
    tuples: BTreeSet<TupleKey>,
}

impl TupleReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count tuples over a whole rule file; blank lines are skipped.
    pub fn from_text(text: &str, source: &Path) -> Result<Self> {
        let mut report = Self::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let key = TupleKey::from_line(line).map_err(|e| e.at_line(source, idx + 1))?;
            report.insert(key);
        }
        log::info!("Counted {} tuples in {:?}", report.count(), source);
        Ok(report)
    }

    pub fn insert(&mut self, key: TupleKey) -> bool {
        self.tuples.insert(key)
    }

    pub fn count(&self) -> usize {
        self.tuples.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TupleKey> {
        self.tuples.iter()
    }

    /// Render as JSON: `{"tuples": [...], "count": N}`.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "tuples": self.tuples.iter().map(|t| [t.src_len, t.dst_len]).collect::<Vec<_>>(),
            "count": self.count(),
        })
        .to_string()
    }
}

impl fmt::Display for TupleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.tuples {
            writeln!(f, "{}", key)?;
        }
        writeln!(f, "The rule set has {} tuples!", self.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tuples() {
        let text = "10.0.0.0/8 0.0.0.0/0\n10.0.0.0/16 0.0.0.0/0\n10.0.0.0/8 1.1.1.1/32\n";
        let report = TupleReport::from_text(text, Path::new("rules")).unwrap();
        assert_eq!(report.count(), 3);
        let keys: Vec<_> = report.iter().copied().collect();
        assert_eq!(
            keys,
            vec![TupleKey::new(8, 0), TupleKey::new(8, 32), TupleKey::new(16, 0)]
        );
    }

    #[test]
    fn test_full_prefix_not_lost() {
        let key = TupleKey::from_line("@1.2.3.4/32 5.6.7.8/32 0 : 65535 0 : 65535 0x06/0xFF").unwrap();
        assert_eq!(key, TupleKey::new(32, 32));
    }

    #[test]
    fn test_duplicate_rules_count_once() {
        let text = "@10.0.0.0/8 0.0.0.0/0 0 : 1 0 : 1 0x06/0xFF\n@11.0.0.0/8 1.0.0.0/0 2 : 3 4 : 5 0x11/0xFF\n";
        let report = TupleReport::from_text(text, Path::new("rules")).unwrap();
        assert_eq!(report.count(), 1);
    }

    #[test]
    fn test_display_and_json() {
        let mut report = TupleReport::new();
        report.insert(TupleKey::new(16, 0));
        report.insert(TupleKey::new(8, 32));
        assert_eq!(report.to_string(), "(8, 32)\n(16, 0)\nThe rule set has 2 tuples!\n");
        assert_eq!(report.to_json(), r#"{"count":2,"tuples":[[8,32],[16,0]]}"#);
    }

    #[test]
    fn test_malformed_line() {
        let err = TupleReport::from_text("10.0.0.0/8\n", Path::new("rules")).unwrap_err();
        assert!(matches!(err.root(), Error::FieldCountMismatch { .. }));
    }
}
