//! Parser for emitted benchmark descriptors.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv4Addr;
use std::path::Path;

use super::format::*;
use crate::atom::{FieldKind, RuleAtom};
use crate::header::HeaderRecord;
use crate::rule::Rule;
use crate::{Error, Result};

static ALGORITHM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\w+)\s*=\s*createAlgorithm\("([^"]*)",\s*\{([^}]*)\}\)$"#).expect("valid regex")
});
static STRUCTURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)\s*=\s*\{([\d,\s]*)\}$").expect("valid regex"));
static CREATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+\s*=\s*create(Ruleset|Headerset)\(\)$").expect("valid regex"));
static ADD_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^addRuleToRuleset\(\w+,\s*\{(.*)\}\)$").expect("valid regex"));
static ADD_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^addHeaderToHeaderset\(\w+,\s*\{(.*)\}\)$").expect("valid regex"));
static BENCHMARK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^registerBenchmark\("((?:[^"\\]|\\.)*)",\s*(\w+),\s*\w+,\s*\w+,\s*\w+,\s*(\d+)\)$"#)
        .expect("valid regex")
});

static EXACT_ADDR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^ruleAtomExact\(ipv4Toi\("([^"]*)"\)\)$"#).expect("valid regex"));
static PREFIX_ADDR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^ruleAtomPrefix\(ipv4Toi\("([^"]*)"\),\s*maskToi\((\d+)\)\)$"#).expect("valid regex")
});
static PREFIX_NUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ruleAtomPrefix\((\d+),\s*maskToi\((\d+)\)\)$").expect("valid regex"));
static EXACT_NUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ruleAtomExact\((\d+)\)$").expect("valid regex"));
static RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ruleAtomRange\((\d+),\s*(\d+)\)$").expect("valid regex"));

const ATOM_FORM: &str = "ruleAtomExact/ruleAtomPrefix/ruleAtomRange expression";

/// Parse a single rendered atom.
pub fn parse_atom(text: &str, position: usize) -> Result<RuleAtom> {
    let text = text.trim();
    let bad = || Error::malformed(text, position, ATOM_FORM);
    let addr = |s: &str| {
        s.parse::<Ipv4Addr>()
            .map(u32::from)
            .map_err(|_| Error::malformed(s, position, "dotted-quad IPv4 address"))
    };
    let num = |s: &str| s.parse::<u32>().map_err(|_| bad());
    let bits = |s: &str| match s.parse::<u8>() {
        Ok(b) if b <= 32 => Ok(b),
        _ => Err(Error::malformed(s, position, "prefix length in [0,32]")),
    };

    if let Some(c) = EXACT_ADDR.captures(text) {
        return Ok(RuleAtom::Exact(addr(&c[1])?));
    }
    if let Some(c) = PREFIX_ADDR.captures(text) {
        return Ok(RuleAtom::prefix(addr(&c[1])?, bits(&c[2])?));
    }
    if let Some(c) = PREFIX_NUM.captures(text) {
        return Ok(RuleAtom::prefix(num(&c[1])?, bits(&c[2])?));
    }
    if let Some(c) = EXACT_NUM.captures(text) {
        return Ok(RuleAtom::Exact(num(&c[1])?));
    }
    if let Some(c) = RANGE.captures(text) {
        let (low, high) = (num(&c[1])?, num(&c[2])?);
        if low > high {
            return Err(bad());
        }
        return Ok(RuleAtom::range(low, high));
    }
    Err(bad())
}

/// Parse the comma-separated atom list inside `{...}`.
pub fn parse_atom_list(text: &str) -> Result<Vec<RuleAtom>> {
    split_top_level(text)
        .into_iter()
        .enumerate()
        .map(|(i, atom)| parse_atom(atom, i + 1))
        .collect()
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

fn parse_params(text: &str) -> Result<Vec<Param>> {
    split_top_level(text)
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            if let Ok(v) = p.parse::<u64>() {
                Ok(Param::Int(v))
            } else {
                p.parse::<f64>()
                    .map(Param::Float)
                    .map_err(|_| Error::malformed(p, i + 1, "numeric algorithm parameter"))
            }
        })
        .collect()
}

fn kind_for_width(width: &str, position: usize) -> Result<FieldKind> {
    match width {
        "32" => Ok(FieldKind::Address),
        "16" => Ok(FieldKind::Port),
        "8" => Ok(FieldKind::Protocol),
        _ => Err(Error::malformed(width, position, "dimension width of 32, 16 or 8")),
    }
}

/// Reader for descriptor scripts.
pub struct DescriptorReader;

impl DescriptorReader {
    /// Parse a whole descriptor; blank lines are skipped.
    ///
    /// Header keys are not part of the script, so parsed headers carry none.
    pub fn parse(text: &str, source: &Path) -> Result<BenchmarkDescriptor> {
        let mut algorithms = Vec::new();
        let mut structure = None;
        let mut rules = Vec::new();
        let mut headers = Vec::new();
        let mut benchmarks = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            Self::parse_statement(
                line,
                &mut algorithms,
                &mut structure,
                &mut rules,
                &mut headers,
                &mut benchmarks,
            )
            .map_err(|e| e.at_line(source, idx + 1))?;
        }

        let structure =
            structure.ok_or_else(|| Error::Config(format!("{:?} declares no structure", source)))?;
        Ok(BenchmarkDescriptor {
            algorithms,
            structure,
            rules,
            headers,
            benchmarks,
        })
    }

    fn parse_statement(
        line: &str,
        algorithms: &mut Vec<AlgorithmDecl>,
        structure: &mut Option<StructureDecl>,
        rules: &mut Vec<Rule>,
        headers: &mut Vec<HeaderRecord>,
        benchmarks: &mut Vec<BenchmarkDecl>,
    ) -> Result<()> {
        if let Some(c) = ADD_RULE.captures(line) {
            rules.push(Rule::new(parse_atom_list(&c[1])?));
        } else if let Some(c) = ADD_HEADER.captures(line) {
            let fields = split_top_level(&c[1]).into_iter().map(str::to_string).collect();
            headers.push(HeaderRecord { key: None, fields });
        } else if let Some(c) = ALGORITHM.captures(line) {
            algorithms.push(AlgorithmDecl {
                var: c[1].to_string(),
                implementation: c[2].to_string(),
                params: parse_params(&c[3])?,
            });
        } else if let Some(c) = STRUCTURE.captures(line) {
            let kinds = split_top_level(&c[2])
                .into_iter()
                .enumerate()
                .map(|(i, w)| kind_for_width(w, i + 1))
                .collect::<Result<Vec<_>>>()?;
            *structure = Some(StructureDecl {
                var: c[1].to_string(),
                kinds,
            });
        } else if let Some(c) = BENCHMARK.captures(line) {
            let repeat = c[3]
                .parse::<u32>()
                .map_err(|_| Error::malformed(&c[3], 6, "repeat count"))?;
            benchmarks.push(BenchmarkDecl {
                label: unescape_label(&c[1]),
                algorithm: c[2].to_string(),
                repeat,
            });
        } else if !CREATE.is_match(line) {
            return Err(Error::malformed(line, 1, "descriptor statement"));
        }
        Ok(())
    }
}
