//! cbconv - ClassBench corpus tooling for packet-classification benchmarks.
//!
//! This crate turns ClassBench rule sets and header traces into the
//! declarative benchmark descriptions consumed by a separate
//! classification benchmark runner.
//!
//! # Features
//!
//! - **Atom classification**: every rule field becomes an exact, prefix or
//!   range atom, with `/32` prefixes and single-port ranges folded to exact
//! - **Two layouts**: fixed 5-tuple IPv4 rules and generalized N-field
//!   prefix-only rules
//! - **Tuple counting**: distinct (source, destination) prefix-length pairs
//! - **Merge-join**: combine two index-sorted annotation files in one pass
//! - **Rule generation**: seeded synthetic 5-tuple corpora
//!
//! # Quick Start
//!
//! ```ignore
//! use cbconv::{convert_files, ConvertConfig, Layout};
//! use std::path::Path;
//!
//! let config = ConvertConfig { repeat: 4, ..Default::default() };
//! let descriptor = convert_files(
//!     Path::new("acl1_1k"),
//!     Path::new("acl1_1k_trace"),
//!     Layout::Fixed,
//!     &config,
//! )?;
//! std::fs::write("acl1.lua", descriptor.render())?;
//! ```
//!
//! # Merging
//!
//! ```
//! use cbconv::merge::merge_join;
//!
//! let joined = merge_join(
//!     vec![(1, 'a'), (2, 'b'), (5, 'c')],
//!     vec![(2, 'x'), (5, 'y'), (7, 'z')],
//!     |l, r| (l, r),
//! );
//! assert_eq!(joined, vec![(2, ('b', 'x')), (5, ('c', 'y'))]);
//! ```

mod error;

pub mod atom;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod generator;
pub mod header;
pub mod input;
pub mod merge;
pub mod parser;
pub mod rule;
pub mod tuples;

// Re-export core types
pub use error::{Error, Result};
pub use atom::{classify_address, classify_port, classify_protocol, FieldKind, RuleAtom};
pub use config::{AlgorithmKind, ConvertConfig};
pub use convert::{convert_files, convert_text, Layout};
pub use descriptor::{BenchmarkDescriptor, DescriptorBuilder, DescriptorReader};
pub use header::{HeaderCorpus, HeaderRecord};
pub use merge::{merge_headers, merge_join, merge_rules, MergeOptions, MergeSource};
pub use rule::{Rule, RuleCorpus, RuleMode};
pub use tuples::{TupleKey, TupleReport};
