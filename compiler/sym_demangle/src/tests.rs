#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use sym_tree::Kind;

use super::*;

// === Dispatch ===

#[test]
fn test_current_prefix_uses_current_grammar() {
    let node = demangle("$s4main3fooyyF").unwrap();
    assert_eq!(node.child_kind(0), Some(Kind::Function));
}

#[test]
fn test_bare_t_uses_legacy_grammar() {
    let node = demangle("_TF4main3fooFT_T_").unwrap();
    assert_eq!(node.child_kind(0), Some(Kind::Function));
}

#[test]
fn test_bridged_names_agree_across_dialects() {
    let scalars: Vec<char> = "_TtC4main3Foo".chars().collect();
    let config = DemangleConfig::default();
    let legacy = LegacyDemangler::new(&scalars, &config).demangle_symbol().unwrap();
    assert_eq!(demangle("_TtC4main3Foo").unwrap(), legacy);
}

#[test]
fn test_unprefixed_symbol_fails_at_start() {
    assert_eq!(
        demangle("main3foo"),
        Err(DemangleError::Malformed { position: 0 })
    );
}

// === Limits ===

#[test]
fn test_too_long_is_checked_before_parsing() {
    let config = DemangleConfig::default().with_max_input_len(4);
    assert_eq!(
        demangle_symbol("$s4main3fooyyF", &NoResolver, &config),
        Err(DemangleError::TooLong { length: 14, limit: 4 })
    );
    assert_eq!(
        demangle_type("SiSgSg", &NoResolver, &config),
        Err(DemangleError::TooLong { length: 6, limit: 4 })
    );
}

#[test]
fn test_limit_counts_scalars_not_bytes() {
    let config = DemangleConfig::default().with_max_input_len(22);
    let node = demangle_symbol("_TtC4mainX10Mnchen_Dya", &NoResolver, &config);
    assert!(node.is_ok());
}

// === Types ===

#[test]
fn test_demangle_type_without_prefix() {
    let node = demangle_type("Si", &NoResolver, &DemangleConfig::default()).unwrap();
    assert_eq!(node.kind(), Kind::Type);
    assert_eq!(node.child_kind(0), Some(Kind::Structure));
}

#[test]
fn test_demangle_type_without_productions_is_suffix() {
    let node = demangle_type("", &NoResolver, &DemangleConfig::default()).unwrap();
    assert_eq!(node.kind(), Kind::Suffix);
}

// === Batch ===

#[test]
fn test_batch_keeps_order_and_failures() {
    let symbols = ["$sSiD", "garbage", "_TtSi"];
    let results = demangle_batch(&symbols, &DemangleConfig::default());
    assert_eq!(results.len(), 3);
    assert!(results[0].is_some());
    assert!(results[1].is_none());
    assert!(results[2].is_some());
}

#[test]
fn test_batch_shares_equal_subtrees() {
    let symbols = vec!["$sSiD".to_string(), "$sSiD".to_string()];
    let results = demangle_batch(&symbols, &DemangleConfig::default());
    let first = results[0].as_ref().unwrap();
    let second = results[1].as_ref().unwrap();
    assert!(first.ptr_eq(second));
}

#[test]
fn test_batch_survives_tall_symbols() {
    let tall = format!("$sSi{}D", "Sg".repeat(4000));
    let nested = format!("$sSi{}D", "Sg".repeat(100));
    let symbols = [tall, nested.clone(), nested];
    let results = demangle_batch(&symbols, &DemangleConfig::default());
    assert!(results[0].is_none());
    let first = results[1].as_ref().unwrap();
    let second = results[2].as_ref().unwrap();
    assert!(first.ptr_eq(second));
    assert_eq!(first.height(), 305);
}
