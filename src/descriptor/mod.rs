//! Benchmark descriptor: the script consumed by the benchmark runner.
//!
//! # Statement Order
//!
//! ```text
//! algX = createAlgorithm("Impl.so", {capacity, ...})   one per algorithm
//! structure = {bits, ...}                              one per descriptor
//! rs = createRuleset()
//! addRuleToRuleset(rs, {atom, ...})                    one per rule
//! headers = createHeaderset()
//! addHeaderToHeaderset(headers, {field, ...})          one per header
//! registerBenchmark("label", algX, structure, rs, headers, repeat)
//! ```
//!
//! Descriptors are assembled in memory by [`DescriptorBuilder`] and
//! serialized in one step; [`DescriptorReader`] parses the same syntax back.

mod builder;
mod format;
mod reader;

#[cfg(test)]
mod tests;

pub use builder::DescriptorBuilder;
pub use format::*;
pub use reader::{parse_atom, parse_atom_list, DescriptorReader};
