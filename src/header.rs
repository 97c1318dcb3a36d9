//! Header trace records.

use std::path::Path;

use crate::parser::{parse_number, split_fields};
use crate::rule::RuleMode;
use crate::{Error, Result};

/// Number of fields emitted per fixed-mode trace line.
pub const FIXED_HEADER_FIELDS: usize = 5;

/// One traffic sample, optionally keyed by the rule it was generated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Rule index, present for generalized traces
    pub key: Option<u64>,
    /// Field values in canonical decimal form
    pub fields: Vec<String>,
}

impl HeaderRecord {
    /// Parse a fixed-mode trace line; only the first five fields are kept.
    pub fn parse_fixed(line: &str) -> Result<Self> {
        let fields = split_fields(line);
        if fields.len() < FIXED_HEADER_FIELDS {
            return Err(Error::FieldCountMismatch {
                expected: FIXED_HEADER_FIELDS,
                actual: fields.len(),
                shape: "five numeric header fields",
            });
        }
        let fields = numeric_fields(&fields[..FIXED_HEADER_FIELDS], 1)?;
        Ok(Self { key: None, fields })
    }

    /// Parse a generalized trace line: a rule index followed by `dimensions` values.
    pub fn parse_keyed(line: &str, dimensions: usize) -> Result<Self> {
        let fields = split_fields(line);
        let expected = dimensions + 1;
        if fields.len() < expected {
            return Err(Error::FieldCountMismatch {
                expected,
                actual: fields.len(),
                shape: "rule index followed by one value per dimension",
            });
        }
        let key = parse_number(fields[0], 1)?;
        let values = numeric_fields(&fields[1..], 2)?;
        Ok(Self {
            key: Some(key),
            fields: values,
        })
    }
}

fn numeric_fields(fields: &[&str], first_position: usize) -> Result<Vec<String>> {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| parse_number(f, first_position + i).map(|value| value.to_string()))
        .collect()
}

/// A header trace in input order.
#[derive(Debug, Clone, Default)]
pub struct HeaderCorpus {
    headers: Vec<HeaderRecord>,
}

impl HeaderCorpus {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole trace for the given rule mode; blank lines are skipped.
    pub fn parse(text: &str, mode: RuleMode, source: &Path) -> Result<Self> {
        let mut corpus = Self::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = match mode {
                RuleMode::Fixed => HeaderRecord::parse_fixed(line),
                RuleMode::Prefix(n) => HeaderRecord::parse_keyed(line, n),
            }
            .map_err(|e| e.at_line(source, idx + 1))?;
            corpus.push(record);
        }
        log::info!("Loaded {} headers from {:?}", corpus.len(), source);
        Ok(corpus)
    }

    pub fn push(&mut self, record: HeaderRecord) {
        self.headers.push(record);
    }

    pub fn headers(&self) -> &[HeaderRecord] {
        &self.headers
    }

    pub fn into_headers(self) -> Vec<HeaderRecord> {
        self.headers
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_header_keeps_first_five() {
        let record = HeaderRecord::parse_fixed("167772161\t3232235521\t1024\t80\t6\t0\t12").unwrap();
        assert_eq!(record.key, None);
        assert_eq!(record.fields, vec!["167772161", "3232235521", "1024", "80", "6"]);
    }

    #[test]
    fn test_fixed_header_too_short() {
        assert!(matches!(
            HeaderRecord::parse_fixed("1 2 3 4"),
            Err(Error::FieldCountMismatch {
                expected: 5,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_header_rejects_non_numeric() {
        let err = HeaderRecord::parse_fixed("1 2 x 4 5").unwrap_err();
        assert!(matches!(err, Error::MalformedField { ref token, position: 3, .. } if token == "x"));
    }

    #[test]
    fn test_keyed_header() {
        let record = HeaderRecord::parse_keyed("17 10 20 30", 3).unwrap();
        assert_eq!(record.key, Some(17));
        assert_eq!(record.fields, vec!["10", "20", "30"]);

        assert!(HeaderRecord::parse_keyed("17 10", 3).is_err());
    }

    #[test]
    fn test_corpus_line_context() {
        let text = "1 2 3 4 5\n1 2 3\n";
        let err = HeaderCorpus::parse(text, RuleMode::Fixed, Path::new("trace")).unwrap_err();
        assert!(matches!(err, Error::AtLine { line: 2, .. }));
    }

    #[test]
    fn test_header_fields_are_canonical() {
        let record = HeaderRecord::parse_fixed("+1 2 007 4 5").unwrap();
        assert_eq!(record.fields, vec!["1", "2", "7", "4", "5"]);

        let record = HeaderRecord::parse_keyed("3 +10 20", 2).unwrap();
        assert_eq!(record.fields, vec!["10", "20"]);
    }
}
