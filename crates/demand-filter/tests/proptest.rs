//! Property-based tests for demand-filter using proptest.

use demand_filter::{
    normalize, resolve, DemandCompiler, Op, Predicate, PredicateBuilder, Scalar, TableAliases,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ============================================================================
// Strategies
// ============================================================================

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}"
}

fn tag() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["EQ", "GT", "GTE", "LT", "LTE"])
}

fn op_for(tag: &str) -> Op {
    match tag {
        "EQ" => Op::Eq,
        "GT" => Op::Gt,
        "GTE" => Op::Gte,
        "LT" => Op::Lt,
        _ => Op::Lte,
    }
}

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        any::<i64>().prop_map(|n| json!(n.to_string())),
        "[a-z ]{0,8}".prop_map(|s| json!(s)),
        Just(json!(null)),
        Just(json!("0")),
    ]
}

fn demand() -> impl Strategy<Value = Value> {
    prop::collection::vec((ident(), ident(), tag(), leaf_value()), 0..6).prop_map(|leaves| {
        let mut map = Map::new();
        for (table, field, tag, value) in leaves {
            map.insert(
                format!("{table}-{field}"),
                json!({"operator": tag, "value": value}),
            );
        }
        Value::Object(map)
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Resolving a well-formed alias yields its field segment.
    #[test]
    fn resolve_yields_field(table in ident(), field in ident()) {
        prop_assert_eq!(resolve(&format!("{table}-{field}")).unwrap(), field);
    }

    /// Integer strings become the integer they spell.
    #[test]
    fn numeric_strings_become_integers(n in any::<i64>()) {
        prop_assume!(n != 0);
        let out = normalize(json!({"t-f": {"operator": "EQ", "value": n.to_string()}}));
        prop_assert_eq!(&out["t-f"]["value"], &json!(n));
    }

    /// Strings without digits are never touched.
    #[test]
    fn non_numeric_strings_unchanged(s in "[a-z]{1,12}") {
        let input = json!({"t-f": {"operator": "EQ", "value": s}});
        prop_assert_eq!(normalize(input.clone()), input);
    }

    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_idempotent(d in demand()) {
        let once = normalize(d);
        prop_assert_eq!(normalize(once.clone()), once);
    }

    /// A single comparison compiles to exactly that comparison.
    #[test]
    fn single_leaf_compiles_to_comparison(
        field in ident(),
        op_tag in tag(),
        n in any::<i64>(),
    ) {
        let demand = json!({format!("t-{field}"): {"operator": op_tag, "value": n}});
        let p = DemandCompiler::new()
            .compile(demand.as_object().unwrap(), &TableAliases::new(), &PredicateBuilder)
            .unwrap();
        prop_assert_eq!(p, Predicate::compare(field, op_for(op_tag), n));
    }

    /// Range predicates hold exactly for values inside the bounds.
    #[test]
    fn range_matches_inclusive_bounds(
        low in -1000i64..1000,
        span in 0i64..1000,
        x in -3000i64..3000,
    ) {
        let high = low + span;
        let demand = json!({"t-f": {"operator": "-", "value": [low, high]}});
        let p = DemandCompiler::new()
            .compile(demand.as_object().unwrap(), &TableAliases::new(), &PredicateBuilder)
            .unwrap();

        let row = json!({"f": x});
        let matched = p.matches(row.as_object().unwrap()).unwrap();
        prop_assert_eq!(matched, low <= x && x <= high);
    }

    /// Top-level entries compile to one predicate each, in input order.
    #[test]
    fn top_level_entries_are_anded(d in demand()) {
        let map = d.as_object().unwrap();
        let p = DemandCompiler::new()
            .compile(map, &TableAliases::new(), &PredicateBuilder)
            .unwrap();

        let fields: Vec<String> = map
            .keys()
            .map(|k| k.split('-').nth(1).unwrap().to_string())
            .collect();
        prop_assert_eq!(p.fields(), fields.iter().map(String::as_str).collect::<Vec<_>>());

        let shape_ok = match map.len() {
            1 => matches!(p, Predicate::Compare { .. }),
            n => matches!(p, Predicate::And(ref parts) if parts.len() == n),
        };
        prop_assert!(shape_ok, "unexpected shape for {} entries: {:?}", map.len(), p);
    }

    /// OR groups match when any member matches.
    #[test]
    fn or_group_is_any(values in prop::collection::vec(-50i64..50, 1..6), x in -50i64..50) {
        let restrictions: Vec<Value> = values
            .iter()
            .map(|v| json!({"operator": "EQ", "value": v}))
            .collect();
        let demand = json!({"or-1": {"t-f": restrictions}});
        let p = DemandCompiler::new()
            .compile(demand.as_object().unwrap(), &TableAliases::new(), &PredicateBuilder)
            .unwrap();

        let mut row = std::collections::HashMap::new();
        row.insert("f".to_string(), Scalar::Int(x));
        prop_assert_eq!(p.matches(&row).unwrap(), values.contains(&x));
    }
}
