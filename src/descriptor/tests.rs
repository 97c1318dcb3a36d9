//! Descriptor build, render and re-parse tests.

use std::path::Path;

use super::*;
use crate::atom::{FieldKind, RuleAtom};
use crate::config::{AlgorithmKind, ConvertConfig};
use crate::header::HeaderCorpus;
use crate::rule::{RuleCorpus, RuleMode};

const FIXED_RULES: &str = "\
@10.0.0.0/24\t192.168.0.0/16\t1024 : 2048\t80 : 80\t0x06/0xFF
@1.2.3.4/32\t0.0.0.0/0\t0 : 65535\t53 : 53\t0x11/0xFF
";

const FIXED_TRACE: &str = "\
167772161\t3232235521\t1500\t80\t6\t0
16909060\t134744072\t4000\t53\t17\t1
";

fn fixed_descriptor(config: &ConvertConfig) -> BenchmarkDescriptor {
    let rules = RuleCorpus::parse(FIXED_RULES, RuleMode::Fixed, Path::new("rules")).unwrap();
    let headers = HeaderCorpus::parse(FIXED_TRACE, RuleMode::Fixed, Path::new("trace")).unwrap();
    DescriptorBuilder::new(RuleMode::Fixed, config)
        .rules(rules)
        .headers(headers)
        .build()
        .unwrap()
}

// ============================================================================
// Builder Tests
// ============================================================================

#[test]
fn test_fixed_render_exact_text() {
    let config = ConvertConfig {
        label: "acl".into(),
        ..Default::default()
    };
    let text = fixed_descriptor(&config).render();
    let expected = r#"algLinSearch = createAlgorithm("LinearSearch5tpl.so", {10000})
algBitvector = createAlgorithm("Bitvector5tpl.so", {10000})
algTuples = createAlgorithm("TupleSpace5tpl.so", {10000, 107})
algHiCuts = createAlgorithm("HiCuts5tpl.so", {10000, 16, 3.0})

structureIPv4 = {32, 32, 16, 16, 8}

rs = createRuleset()
addRuleToRuleset(rs, {ruleAtomPrefix(ipv4Toi("10.0.0.0"), maskToi(24)), ruleAtomPrefix(ipv4Toi("192.168.0.0"), maskToi(16)), ruleAtomRange(1024, 2048), ruleAtomExact(80), ruleAtomExact(6)})
addRuleToRuleset(rs, {ruleAtomExact(ipv4Toi("1.2.3.4")), ruleAtomPrefix(ipv4Toi("0.0.0.0"), maskToi(0)), ruleAtomRange(0, 65535), ruleAtomExact(53), ruleAtomExact(17)})

headers = createHeaderset()
addHeaderToHeaderset(headers, {167772161, 3232235521, 1500, 80, 6})
addHeaderToHeaderset(headers, {16909060, 134744072, 4000, 53, 17})

registerBenchmark("acl", algLinSearch, structureIPv4, rs, headers, 8)
registerBenchmark("acl", algBitvector, structureIPv4, rs, headers, 8)
registerBenchmark("acl", algTuples, structureIPv4, rs, headers, 8)
registerBenchmark("acl", algHiCuts, structureIPv4, rs, headers, 8)
"#;
    assert_eq!(text, expected);
}

#[test]
fn test_prefix_mode_declarations() {
    let rules = RuleCorpus::parse(
        "10.0.0.0/8 1.1.1.1/32 0.0.0.0/0\n",
        RuleMode::Prefix(3),
        Path::new("rules"),
    )
    .unwrap();
    let headers = HeaderCorpus::parse("0 167772161 16843009 7\n", RuleMode::Prefix(3), Path::new("trace")).unwrap();
    let config = ConvertConfig {
        repeat: 2,
        ..Default::default()
    };
    let desc = DescriptorBuilder::new(RuleMode::Prefix(3), &config)
        .rules(rules)
        .headers(headers)
        .build()
        .unwrap();

    assert_eq!(desc.structure.var, "structure");
    assert_eq!(desc.structure.widths(), vec![32, 32, 32]);
    assert_eq!(desc.algorithms[0].implementation, "LinearSearch3tpl.so");
    assert_eq!(
        desc.algorithms[2].params,
        vec![Param::Int(10000), Param::Int(97)]
    );
    assert_eq!(
        desc.algorithms[3].params,
        vec![Param::Int(10000), Param::Int(30), Param::Float(3.0)]
    );
    let labels: Vec<_> = desc.benchmarks.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["Linear Search", "Bitvector", "Tuple Space Search", "HiCuts"]);

    let text = desc.render();
    assert!(text.contains("structure = {32, 32, 32}\n"));
    assert!(text.contains("addHeaderToHeaderset(headers, {167772161, 16843009, 7})\n"));
    assert!(text.contains("registerBenchmark(\"HiCuts\", algHiCuts, structure, rs, headers, 2)\n"));
    assert!(desc
        .rules
        .iter()
        .flat_map(|r| &r.atoms)
        .all(|a| !matches!(a, RuleAtom::Range { .. })));
}

#[test]
fn test_algorithm_selection_and_tuning() {
    let config = ConvertConfig {
        leaf_threshold: Some(8),
        space_factor: 1.5,
        capacity: 500,
        algorithms: vec![AlgorithmKind::HiCuts],
        ..Default::default()
    };
    let desc = fixed_descriptor(&config);
    assert_eq!(desc.algorithms.len(), 1);
    assert_eq!(desc.benchmarks.len(), 1);
    assert!(desc
        .render()
        .starts_with("algHiCuts = createAlgorithm(\"HiCuts5tpl.so\", {500, 8, 1.5})\n"));
}

#[test]
fn test_builder_rejects_mode_mismatch() {
    let config = ConvertConfig::default();
    let rules = RuleCorpus::parse("10.0.0.0/8 1.0.0.0/8\n", RuleMode::Prefix(2), Path::new("r")).unwrap();
    let result = DescriptorBuilder::new(RuleMode::Fixed, &config).rules(rules).build();
    assert!(matches!(result, Err(crate::Error::Config(_))));
}

#[test]
fn test_builder_requires_rules() {
    let config = ConvertConfig::default();
    assert!(DescriptorBuilder::new(RuleMode::Fixed, &config).build().is_err());
}

#[test]
fn test_builder_validates_config() {
    let config = ConvertConfig {
        repeat: 0,
        ..Default::default()
    };
    let rules = RuleCorpus::parse(FIXED_RULES, RuleMode::Fixed, Path::new("rules")).unwrap();
    let result = DescriptorBuilder::new(RuleMode::Fixed, &config).rules(rules).build();
    assert!(matches!(result, Err(crate::Error::Config(_))));
}

#[test]
fn test_builder_rejects_oversized_leaf_threshold() {
    let config = ConvertConfig::default();
    let mode = RuleMode::Prefix(500_000_000);
    let result = DescriptorBuilder::new(mode, &config)
        .rules(RuleCorpus::new(mode))
        .build();
    assert!(matches!(result, Err(crate::Error::Config(_))));
}

// ============================================================================
// Reader Tests
// ============================================================================

#[test]
fn test_reparse_recovers_atoms() {
    let desc = fixed_descriptor(&ConvertConfig::default());
    let parsed = DescriptorReader::parse(&desc.render(), Path::new("out.lua")).unwrap();
    assert_eq!(parsed, desc);
}

#[test]
fn test_reparse_prefix_mode_rerenders_identically() {
    let text = "10.0.0.0/8 1.1.1.1/32\n192.168.1.0/24 10.1.0.0/16\n";
    let rules = RuleCorpus::parse(text, RuleMode::Prefix(2), Path::new("rules")).unwrap();
    let headers = HeaderCorpus::parse("0 1 2\n1 3 4\n", RuleMode::Prefix(2), Path::new("trace")).unwrap();
    let config = ConvertConfig::default();
    let desc = DescriptorBuilder::new(RuleMode::Prefix(2), &config)
        .rules(rules)
        .headers(headers)
        .build()
        .unwrap();

    let rendered = desc.render();
    let parsed = DescriptorReader::parse(&rendered, Path::new("out.lua")).unwrap();
    assert_eq!(parsed.rules, desc.rules);
    assert_eq!(parsed.structure.kinds, vec![FieldKind::Address; 2]);
    assert_eq!(parsed.render(), rendered);
}

#[test]
fn test_label_escaping_roundtrip() {
    let config = ConvertConfig {
        label: "say \"hi\" \\ bye".into(),
        ..Default::default()
    };
    let desc = fixed_descriptor(&config);
    let rendered = desc.render();
    assert!(rendered.contains(r#"registerBenchmark("say \"hi\" \\ bye", algLinSearch"#));
    let parsed = DescriptorReader::parse(&rendered, Path::new("out.lua")).unwrap();
    assert_eq!(parsed.benchmarks[0].label, config.label);
}

#[test]
fn test_reader_requires_structure() {
    let err = DescriptorReader::parse("rs = createRuleset()\n", Path::new("d")).unwrap_err();
    assert!(matches!(err, crate::Error::Config(_)));
}
