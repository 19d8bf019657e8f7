//! Typed demand tree.
//!
//! Raw demands are JSON mappings. [`Demand::parse`] decides once, at this
//! boundary, whether each entry is a field restriction or an `or`/`and`
//! group, so the compiler only has to match on [`DemandNode`].
//!
//! ```text
//! {
//!   "product-price": {"operator": "-", "value": [10, 50]},     // leaf
//!   "or-1": {                                                  // group
//!     "product-color": [{"operator": "EQ", "value": "red"},
//!                       {"operator": "EQ", "value": "blue"}]
//!   }
//! }
//! ```

use serde_json::Value as Json;

use crate::alias::{self, FieldAlias};
use crate::error::{FilterError, Result};
use crate::op::{Op, OperatorTag};
use crate::value::Scalar;

/// Raw demand as handed over by providers: an ordered JSON mapping.
pub type RawDemand = serde_json::Map<String, Json>;

/// Key holding a restriction's operator tag.
pub const OPERATOR_KEY: &str = "operator";

/// Key holding a restriction's operand.
pub const VALUE_KEY: &str = "value";

/// Operand of a restriction.
#[derive(Debug, Clone, PartialEq)]
pub enum RestrictionValue {
    /// Single operand.
    Scalar(Scalar),
    /// List operand; ranges expect exactly `[low, high]`.
    List(Vec<Scalar>),
}

impl RestrictionValue {
    /// Returns the single operand, if this is not a list.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            RestrictionValue::Scalar(s) => Some(s),
            RestrictionValue::List(_) => None,
        }
    }

    /// Returns the `(low, high)` bounds of a two-element list.
    pub fn as_pair(&self) -> Option<(&Scalar, &Scalar)> {
        match self {
            RestrictionValue::List(items) => match items.as_slice() {
                [low, high] => Some((low, high)),
                _ => None,
            },
            RestrictionValue::Scalar(_) => None,
        }
    }

    fn from_json(path: &str, value: &Json) -> Result<RestrictionValue> {
        if let Some(scalar) = Scalar::from_json(value) {
            return Ok(RestrictionValue::Scalar(scalar));
        }
        match value {
            Json::Array(items) => items
                .iter()
                .map(|item| {
                    Scalar::from_json(item).ok_or_else(|| FilterError::MalformedDemand {
                        path: path.to_string(),
                        message: "list operands must be scalars".to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(RestrictionValue::List),
            _ => Err(FilterError::MalformedDemand {
                path: path.to_string(),
                message: "value must be a scalar or a list".to_string(),
            }),
        }
    }
}

impl From<Scalar> for RestrictionValue {
    fn from(value: Scalar) -> Self {
        RestrictionValue::Scalar(value)
    }
}

impl From<Vec<Scalar>> for RestrictionValue {
    fn from(items: Vec<Scalar>) -> Self {
        RestrictionValue::List(items)
    }
}

/// A single operator and operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Restriction {
    /// Operator tag.
    pub operator: OperatorTag,
    /// Operand.
    pub value: RestrictionValue,
}

impl Restriction {
    /// Creates a restriction.
    pub fn new(operator: impl Into<OperatorTag>, value: impl Into<RestrictionValue>) -> Self {
        Restriction {
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Creates a comparison restriction.
    pub fn compare(op: Op, value: impl Into<Scalar>) -> Self {
        Restriction::new(op, RestrictionValue::Scalar(value.into()))
    }

    /// Creates an inclusive range restriction.
    pub fn range(low: impl Into<Scalar>, high: impl Into<Scalar>) -> Self {
        Restriction {
            operator: OperatorTag::Range,
            value: RestrictionValue::List(vec![low.into(), high.into()]),
        }
    }

    /// Parses a `{operator, value}` mapping.
    pub fn parse(path: &str, node: &serde_json::Map<String, Json>) -> Result<Restriction> {
        let operator = match node.get(OPERATOR_KEY) {
            Some(Json::String(tag)) => OperatorTag::parse(tag),
            Some(other) => OperatorTag::Unknown(other.to_string()),
            None => {
                return Err(FilterError::MissingKey {
                    path: path.to_string(),
                    key: OPERATOR_KEY,
                })
            }
        };
        let value = node.get(VALUE_KEY).ok_or_else(|| FilterError::MissingKey {
            path: path.to_string(),
            key: VALUE_KEY,
        })?;

        Ok(Restriction {
            operator,
            value: RestrictionValue::from_json(path, value)?,
        })
    }

    /// Parses one restriction mapping or a list of them.
    pub(crate) fn parse_many(path: &str, node: &Json) -> Result<Vec<Restriction>> {
        match node {
            Json::Object(map) => Ok(vec![Restriction::parse(path, map)?]),
            Json::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let path = format!("{path}[{i}]");
                    let map = expect_mapping(&path, item)?;
                    Restriction::parse(&path, map)
                })
                .collect(),
            _ => Err(FilterError::MalformedDemand {
                path: path.to_string(),
                message: "expected a restriction or a list of restrictions".to_string(),
            }),
        }
    }
}

/// A restriction on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRestriction {
    /// Resolved field alias.
    pub alias: FieldAlias,
    /// The restriction.
    pub restriction: Restriction,
}

/// One field inside a group, with all of its restrictions.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    /// Resolved field alias.
    pub alias: FieldAlias,
    /// Restrictions on that field, in input order.
    pub restrictions: Vec<Restriction>,
}

/// Members of an `or`/`and` group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Grouping key as written, e.g. `"or-1"`.
    pub key: String,
    /// Members in input order.
    pub members: Vec<GroupMember>,
}

impl Group {
    /// Iterates over every `(alias, restriction)` pair of the group.
    pub fn restrictions(&self) -> impl Iterator<Item = (&FieldAlias, &Restriction)> {
        self.members
            .iter()
            .flat_map(|m| m.restrictions.iter().map(move |r| (&m.alias, r)))
    }
}

/// A parsed demand entry.
#[derive(Debug, Clone, PartialEq)]
pub enum DemandNode {
    /// Single field restriction.
    Leaf(FieldRestriction),
    /// Any member restriction may match.
    Or(Group),
    /// Every member restriction must match.
    And(Group),
}

impl DemandNode {
    /// Parses the node stored under `key`.
    ///
    /// A mapping with an `operator` key is a leaf; anything else is a group.
    pub fn parse(key: &str, node: &Json) -> Result<DemandNode> {
        let map = expect_mapping(key, node)?;
        if map.contains_key(OPERATOR_KEY) {
            return Ok(DemandNode::Leaf(FieldRestriction {
                alias: FieldAlias::parse(key)?,
                restriction: Restriction::parse(key, map)?,
            }));
        }
        alias::resolve_group(key, map)
    }
}

/// A top-level demand entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandEntry {
    /// Key as written in the raw demand.
    pub key: String,
    /// Parsed node.
    pub node: DemandNode,
}

/// A parsed demand: top-level entries in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Demand {
    entries: Vec<DemandEntry>,
}

impl Demand {
    /// Parses a raw demand mapping.
    pub fn parse(raw: &RawDemand) -> Result<Demand> {
        let entries = raw
            .iter()
            .map(|(key, node)| {
                Ok(DemandEntry {
                    key: key.clone(),
                    node: DemandNode::parse(key, node)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Demand { entries })
    }

    /// Parses a raw demand given as any JSON value; it must be a mapping.
    pub fn from_json(raw: &Json) -> Result<Demand> {
        Demand::parse(expect_mapping("$", raw)?)
    }

    /// Returns the entries in input order.
    pub fn entries(&self) -> &[DemandEntry] {
        &self.entries
    }

    /// Returns the number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the demand has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn expect_mapping<'a>(path: &str, node: &'a Json) -> Result<&'a serde_json::Map<String, Json>> {
    node.as_object().ok_or_else(|| FilterError::MalformedDemand {
        path: path.to_string(),
        message: format!("expected a mapping, got {}", json_kind(node)),
    })
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "a list",
        Json::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Json) -> Result<Demand> {
        Demand::from_json(&value)
    }

    #[test]
    fn parses_leaf() {
        let demand = parse(json!({"t-f": {"operator": "EQ", "value": 5}})).unwrap();
        assert_eq!(demand.len(), 1);
        assert_eq!(
            demand.entries()[0].node,
            DemandNode::Leaf(FieldRestriction {
                alias: FieldAlias::new("t", "f"),
                restriction: Restriction::compare(Op::Eq, 5),
            })
        );
    }

    #[test]
    fn parses_range_leaf() {
        let demand = parse(json!({"t-f": {"operator": "-", "value": [1, 10]}})).unwrap();
        match &demand.entries()[0].node {
            DemandNode::Leaf(leaf) => {
                assert_eq!(leaf.restriction, Restriction::range(1, 10));
                assert_eq!(
                    leaf.restriction.value.as_pair(),
                    Some((&Scalar::Int(1), &Scalar::Int(10)))
                );
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn parses_groups() {
        let demand = parse(json!({
            "or-1": {"t-f": [{"operator": "EQ", "value": "a"}]},
            "and-1": {"t-g": {"operator": "GT", "value": 2}},
        }))
        .unwrap();
        assert!(matches!(demand.entries()[0].node, DemandNode::Or(_)));
        assert!(matches!(demand.entries()[1].node, DemandNode::And(_)));
    }

    #[test]
    fn keeps_entry_order() {
        let demand = parse(json!({
            "t-z": {"operator": "EQ", "value": 1},
            "t-a": {"operator": "EQ", "value": 2},
            "t-m": {"operator": "EQ", "value": 3},
        }))
        .unwrap();
        let keys: Vec<_> = demand.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["t-z", "t-a", "t-m"]);
    }

    #[test]
    fn unknown_operator_is_kept() {
        let demand = parse(json!({"t-f": {"operator": "LIKE", "value": "x"}})).unwrap();
        match &demand.entries()[0].node {
            DemandNode::Leaf(leaf) => {
                assert_eq!(leaf.restriction.operator, OperatorTag::Unknown("LIKE".into()))
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn missing_value_is_an_error() {
        let err = parse(json!({"t-f": {"operator": "EQ"}})).unwrap_err();
        assert!(matches!(err, FilterError::MissingKey { key: "value", .. }));
    }

    #[test]
    fn leaf_key_without_operator_is_a_missing_group() {
        let err = parse(json!({"t-f": {"value": 1}})).unwrap_err();
        assert!(matches!(err, FilterError::MissingGroupKey { .. }));
    }

    #[test]
    fn non_mapping_nodes_are_malformed() {
        assert!(matches!(
            parse(json!({"t-f": 5})).unwrap_err(),
            FilterError::MalformedDemand { .. }
        ));
        assert!(matches!(
            parse(json!({"or-1": {"t-f": "EQ"}})).unwrap_err(),
            FilterError::MalformedDemand { .. }
        ));
        assert!(matches!(
            parse(json!([1, 2])).unwrap_err(),
            FilterError::MalformedDemand { .. }
        ));
        assert!(matches!(
            parse(json!({"t-f": {"operator": "EQ", "value": {"x": 1}}})).unwrap_err(),
            FilterError::MalformedDemand { .. }
        ));
    }

    #[test]
    fn group_restrictions_iterates_in_order() {
        let demand = parse(json!({
            "or-1": {
                "t-a": [{"operator": "EQ", "value": 1}, {"operator": "EQ", "value": 2}],
                "t-b": {"operator": "EQ", "value": 3},
            }
        }))
        .unwrap();
        let DemandNode::Or(group) = &demand.entries()[0].node else {
            panic!("expected or group");
        };
        let fields: Vec<_> = group.restrictions().map(|(a, _)| a.field.as_str()).collect();
        assert_eq!(fields, ["a", "a", "b"]);
    }
}
