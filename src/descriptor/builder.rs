//! Assembles a [`BenchmarkDescriptor`] from parsed corpora.

use super::format::*;
use crate::config::{AlgorithmKind, ConvertConfig};
use crate::header::HeaderCorpus;
use crate::rule::{RuleCorpus, RuleMode};
use crate::{Error, Result};

/// Builder for benchmark descriptors.
pub struct DescriptorBuilder<'a> {
    mode: RuleMode,
    config: &'a ConvertConfig,
    rules: Option<RuleCorpus>,
    headers: HeaderCorpus,
}

impl<'a> DescriptorBuilder<'a> {
    /// Create a builder for corpora of the given mode.
    pub fn new(mode: RuleMode, config: &'a ConvertConfig) -> Self {
        Self {
            mode,
            config,
            rules: None,
            headers: HeaderCorpus::new(),
        }
    }

    /// Set the rule corpus.
    pub fn rules(mut self, rules: RuleCorpus) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Set the header trace.
    pub fn headers(mut self, headers: HeaderCorpus) -> Self {
        self.headers = headers;
        self
    }

    /// Declaration of one algorithm under this builder's mode.
    pub fn algorithm(&self, kind: AlgorithmKind) -> Result<AlgorithmDecl> {
        let capacity = Param::Int(self.config.capacity.into());
        let params = match kind {
            AlgorithmKind::LinearSearch | AlgorithmKind::Bitvector => vec![capacity],
            AlgorithmKind::TupleSpace => vec![
                capacity,
                Param::Int(self.config.tuple_buckets_for(self.mode).into()),
            ],
            AlgorithmKind::HiCuts => vec![
                capacity,
                Param::Int(self.config.leaf_threshold_for(self.mode)?.into()),
                Param::Float(self.config.space_factor),
            ],
        };
        Ok(AlgorithmDecl {
            var: kind.var_name().to_string(),
            implementation: kind.implementation(self.mode.dimensions()),
            params,
        })
    }

    /// Structure declaration for this builder's mode.
    pub fn structure(&self) -> StructureDecl {
        let var = match self.mode {
            RuleMode::Fixed => FIXED_STRUCTURE_VAR,
            RuleMode::Prefix(_) => PREFIX_STRUCTURE_VAR,
        };
        StructureDecl {
            var: var.to_string(),
            kinds: self.mode.field_kinds(),
        }
    }

    /// Validate the inputs and assemble the descriptor.
    pub fn build(self) -> Result<BenchmarkDescriptor> {
        self.config.validate()?;
        let Some(corpus) = self.rules.as_ref() else {
            return Err(Error::Config("no rule corpus given".into()));
        };
        if corpus.mode() != self.mode {
            return Err(Error::Config(format!(
                "rule corpus mode {:?} does not match descriptor mode {:?}",
                corpus.mode(),
                self.mode
            )));
        }
        if corpus.len() > self.config.capacity as usize {
            log::warn!(
                "Rule corpus has {} rules, above the declared capacity of {}",
                corpus.len(),
                self.config.capacity
            );
        }

        let algorithms = self
            .config
            .algorithms
            .iter()
            .map(|kind| self.algorithm(*kind))
            .collect::<Result<Vec<_>>>()?;
        let benchmarks = self
            .config
            .algorithms
            .iter()
            .map(|kind| BenchmarkDecl {
                label: self.config.label_for(self.mode, *kind),
                algorithm: kind.var_name().to_string(),
                repeat: self.config.repeat,
            })
            .collect();
        let structure = self.structure();

        log::info!(
            "Built {} descriptor: {} algorithms, {} rules, {} headers",
            self.mode.name(),
            self.config.algorithms.len(),
            corpus.len(),
            self.headers.len()
        );

        let DescriptorBuilder { rules, headers, .. } = self;
        Ok(BenchmarkDescriptor {
            algorithms,
            structure,
            rules: rules.map(RuleCorpus::into_rules).unwrap_or_default(),
            headers: headers.into_headers(),
            benchmarks,
        })
    }
}
