//! Rule lines and rule corpora.

use std::path::Path;

use crate::atom::{classify_port, classify_protocol, classify_subnet, FieldKind, RuleAtom};
use crate::parser::{parse_subnet, port_range_bounds, split_fields, RULE_MARKER};
use crate::{Error, Result};

/// Number of whitespace-separated fields in a fixed-mode ClassBench rule.
pub const FIXED_RULE_FIELDS: usize = 9;

/// How rule lines are grouped into dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleMode {
    /// `@src dst sp : sp dp : dp proto/mask`
    Fixed,
    /// N whitespace-separated subnets, no ports or protocol
    Prefix(usize),
}

impl RuleMode {
    /// Get the internal name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            RuleMode::Fixed => "fixed",
            RuleMode::Prefix(_) => "prefix",
        }
    }

    /// Number of atoms per rule.
    pub fn dimensions(&self) -> usize {
        match self {
            RuleMode::Fixed => 5,
            RuleMode::Prefix(n) => *n,
        }
    }

    /// Semantic kind of each rule dimension, in order.
    pub fn field_kinds(&self) -> Vec<FieldKind> {
        match self {
            RuleMode::Fixed => vec![
                FieldKind::Address,
                FieldKind::Address,
                FieldKind::Port,
                FieldKind::Port,
                FieldKind::Protocol,
            ],
            RuleMode::Prefix(n) => vec![FieldKind::Address; *n],
        }
    }

    /// Parse one rule line according to this mode.
    pub fn parse_rule(&self, line: &str) -> Result<Rule> {
        match self {
            RuleMode::Fixed => parse_fixed_rule(line),
            RuleMode::Prefix(n) => parse_prefix_rule(line, *n),
        }
    }
}

/// An ordered, fixed-arity sequence of atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub atoms: Vec<RuleAtom>,
}

impl Rule {
    /// Create a rule from its atoms.
    pub fn new(atoms: Vec<RuleAtom>) -> Self {
        Self { atoms }
    }
}

/// Parse a fixed-mode 5-tuple rule line.
pub fn parse_fixed_rule(line: &str) -> Result<Rule> {
    let fields = split_fields(line);
    if fields.len() < FIXED_RULE_FIELDS {
        return Err(Error::FieldCountMismatch {
            expected: FIXED_RULE_FIELDS,
            actual: fields.len(),
            shape: "@src dst sport : sport dport : dport proto/mask",
        });
    }

    let src = fields[0]
        .strip_prefix(RULE_MARKER)
        .ok_or_else(|| Error::malformed(fields[0], 1, "source subnet prefixed by '@'"))?;
    let src = parse_subnet(src, 1)?;
    let dst = parse_subnet(fields[1], 2)?;

    let (lo, hi) = port_range_bounds(&fields, 2)?;
    let sport = classify_port(lo, hi, 3)?;
    let (lo, hi) = port_range_bounds(&fields, 5)?;
    let dport = classify_port(lo, hi, 6)?;
    let proto = classify_protocol(fields[8], 9)?;

    Ok(Rule::new(vec![
        classify_subnet(&src),
        classify_subnet(&dst),
        sport,
        dport,
        proto,
    ]))
}

/// Parse a generalized rule line of `dimensions` subnets.
///
/// Surplus fields beyond `dimensions` are dropped.
pub fn parse_prefix_rule(line: &str, dimensions: usize) -> Result<Rule> {
    let fields = split_fields(line);
    if fields.len() < dimensions {
        return Err(Error::FieldCountMismatch {
            expected: dimensions,
            actual: fields.len(),
            shape: "one subnet per dimension",
        });
    }
    if fields.len() > dimensions {
        log::debug!(
            "Dropping {} surplus fields from rule line",
            fields.len() - dimensions
        );
    }

    let atoms = fields
        .iter()
        .take(dimensions)
        .enumerate()
        .map(|(i, token)| parse_subnet(token, i + 1).map(|net| classify_subnet(&net)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Rule::new(atoms))
}

/// Field count of the first non-empty line, used to infer dimensionality.
pub fn infer_dimensions(text: &str) -> Option<usize> {
    text.lines()
        .map(split_fields)
        .find(|fields| !fields.is_empty())
        .map(|fields| fields.len())
}

/// A rule corpus in input order; a rule's index is its position.
#[derive(Debug, Clone)]
pub struct RuleCorpus {
    mode: RuleMode,
    rules: Vec<Rule>,
}

impl RuleCorpus {
    /// Create an empty corpus.
    pub fn new(mode: RuleMode) -> Self {
        Self {
            mode,
            rules: Vec::new(),
        }
    }

    /// Parse a whole corpus; blank lines are skipped.
    ///
    /// `source` only names the input in error messages.
    pub fn parse(text: &str, mode: RuleMode, source: &Path) -> Result<Self> {
        let mut corpus = Self::new(mode);
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let rule = mode.parse_rule(line).map_err(|e| e.at_line(source, idx + 1))?;
            corpus.push(rule)?;
        }
        log::info!(
            "Loaded {} {} rules from {:?}",
            corpus.len(),
            mode.name(),
            source
        );
        Ok(corpus)
    }

    /// Append a rule, checking its arity against the mode.
    pub fn push(&mut self, rule: Rule) -> Result<()> {
        let expected = self.mode.dimensions();
        if rule.atoms.len() != expected {
            return Err(Error::AtomCountMismatch {
                expected,
                actual: rule.atoms.len(),
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn mode(&self) -> RuleMode {
        self.mode
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
