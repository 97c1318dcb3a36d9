//! Descriptor structures and their script rendering.

use std::fmt;

use crate::atom::FieldKind;
use crate::header::HeaderRecord;
use crate::rule::Rule;

/// Script variable holding the rule corpus.
pub const RULESET_VAR: &str = "rs";
/// Script variable holding the header trace.
pub const HEADERSET_VAR: &str = "headers";
/// Structure variable for the fixed 5-tuple layout.
pub const FIXED_STRUCTURE_VAR: &str = "structureIPv4";
/// Structure variable for generalized layouts.
pub const PREFIX_STRUCTURE_VAR: &str = "structure";

/// A sizing or tuning parameter of an algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param {
    Int(u64),
    Float(f64),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Int(v) => write!(f, "{}", v),
            // Debug keeps the decimal point on whole numbers.
            Param::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// `var = createAlgorithm("implementation", {params})`
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmDecl {
    pub var: String,
    pub implementation: String,
    /// First element is the rule capacity
    pub params: Vec<Param>,
}

/// `var = {bits, ...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureDecl {
    pub var: String,
    pub kinds: Vec<FieldKind>,
}

impl StructureDecl {
    /// Bit width of each dimension.
    pub fn widths(&self) -> Vec<u8> {
        self.kinds.iter().map(FieldKind::bits).collect()
    }
}

/// `registerBenchmark("label", algorithm, structure, rs, headers, repeat)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkDecl {
    pub label: String,
    pub algorithm: String,
    pub repeat: u32,
}

/// A complete benchmark description.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkDescriptor {
    pub algorithms: Vec<AlgorithmDecl>,
    pub structure: StructureDecl,
    pub rules: Vec<Rule>,
    pub headers: Vec<HeaderRecord>,
    pub benchmarks: Vec<BenchmarkDecl>,
}

impl BenchmarkDescriptor {
    /// Serialize the whole descriptor.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BenchmarkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for alg in &self.algorithms {
            write!(f, "{} = createAlgorithm(\"{}\", {{", alg.var, alg.implementation)?;
            write_list(f, &alg.params)?;
            f.write_str("})\n")?;
        }
        f.write_str("\n")?;

        write!(f, "{} = {{", self.structure.var)?;
        write_list(f, &self.structure.widths())?;
        f.write_str("}\n\n")?;

        writeln!(f, "{} = createRuleset()", RULESET_VAR)?;
        for rule in &self.rules {
            write!(f, "addRuleToRuleset({}, {{", RULESET_VAR)?;
            let rendered = rule
                .atoms
                .iter()
                .zip(&self.structure.kinds)
                .map(|(atom, kind)| atom.render(*kind));
            write_list(f, rendered)?;
            f.write_str("})\n")?;
        }
        f.write_str("\n")?;

        writeln!(f, "{} = createHeaderset()", HEADERSET_VAR)?;
        for header in &self.headers {
            write!(f, "addHeaderToHeaderset({}, {{", HEADERSET_VAR)?;
            write_list(f, &header.fields)?;
            f.write_str("})\n")?;
        }
        f.write_str("\n")?;

        for bench in &self.benchmarks {
            writeln!(
                f,
                "registerBenchmark(\"{}\", {}, {}, {}, {}, {})",
                escape_label(&bench.label),
                bench.algorithm,
                self.structure.var,
                RULESET_VAR,
                HEADERSET_VAR,
                bench.repeat
            )?;
        }
        Ok(())
    }
}

fn write_list<I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator,
    I::Item: fmt::Display,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Escape a label for a double-quoted script string.
pub fn escape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_label`].
pub fn unescape_label(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
