//! End-to-end conversion of a rule corpus and trace into a descriptor.

use std::path::Path;

use crate::config::ConvertConfig;
use crate::descriptor::{BenchmarkDescriptor, DescriptorBuilder};
use crate::header::HeaderCorpus;
use crate::input::read_input;
use crate::rule::{infer_dimensions, RuleCorpus, RuleMode};
use crate::{Error, Result};

/// Rule file layout selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Fixed 5-tuple ClassBench rules
    Fixed,
    /// Generalized prefix-only rules
    Prefix,
}

/// Resolve the concrete rule mode for a layout.
///
/// Generalized dimensionality comes from the config, or from the first
/// rule line when unset.
pub fn resolve_mode(layout: Layout, config: &ConvertConfig, rules_text: &str) -> Result<RuleMode> {
    match layout {
        Layout::Fixed => Ok(RuleMode::Fixed),
        Layout::Prefix => {
            let dimensions = match config.dimensions {
                Some(n) => n,
                None => {
                    let n = infer_dimensions(rules_text)
                        .ok_or_else(|| Error::Config("cannot infer dimensions from an empty rule file".into()))?;
                    log::info!("Inferred {} dimensions from the first rule", n);
                    n
                }
            };
            Ok(RuleMode::Prefix(dimensions))
        }
    }
}

/// Convert already loaded rule and trace text.
pub fn convert_text(
    rules_text: &str,
    rules_path: &Path,
    trace_text: &str,
    trace_path: &Path,
    layout: Layout,
    config: &ConvertConfig,
) -> Result<BenchmarkDescriptor> {
    config.validate()?;
    let mode = resolve_mode(layout, config, rules_text)?;
    let rules = RuleCorpus::parse(rules_text, mode, rules_path)?;
    let headers = HeaderCorpus::parse(trace_text, mode, trace_path)?;
    DescriptorBuilder::new(mode, config)
        .rules(rules)
        .headers(headers)
        .build()
}

/// Read a rule file and a trace file and convert them.
pub fn convert_files(
    rules_path: &Path,
    trace_path: &Path,
    layout: Layout,
    config: &ConvertConfig,
) -> Result<BenchmarkDescriptor> {
    config.validate()?;
    let rules_text = read_input(rules_path)?;
    let trace_text = read_input(trace_path)?;
    convert_text(&rules_text, rules_path, &trace_text, trace_path, layout, config)
}
