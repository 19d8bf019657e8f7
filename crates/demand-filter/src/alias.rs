//! Alias resolution.
//!
//! Demand keys come in two shapes:
//!
//! - `"<table>-<field>"` names a field restriction, e.g. `"product-price"`.
//! - `"or-<n>"` / `"and-<n>"` names a group; the suffix only keeps keys unique.
//!
//! Only the first two `-` separated segments of an alias are read. Field
//! names containing `-` therefore come out truncated.

use serde_json::Value as Json;

use crate::config::TableAliases;
use crate::demand::{DemandNode, Group, GroupMember, Restriction};
use crate::error::{FilterError, Result};

/// Separator between alias segments.
pub const SEPARATOR: char = '-';

/// A resolved `table-field` alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldAlias {
    /// Table segment of the alias.
    pub table: String,
    /// Bare field name.
    pub field: String,
}

impl FieldAlias {
    /// Creates an alias from its parts.
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        FieldAlias {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Parses a `"<table>-<field>"` key.
    ///
    /// # Example
    ///
    /// ```
    /// use demand_filter::FieldAlias;
    ///
    /// let alias = FieldAlias::parse("tablename-fieldname").unwrap();
    /// assert_eq!(alias.table, "tablename");
    /// assert_eq!(alias.field, "fieldname");
    /// ```
    pub fn parse(alias: &str) -> Result<FieldAlias> {
        let mut segments = alias.split(SEPARATOR);
        let table = segments.next().unwrap_or_default();
        let field = segments
            .next()
            .ok_or_else(|| malformed(alias, "expected '<table>-<field>'"))?;

        if table.is_empty() {
            return Err(malformed(alias, "empty table segment"));
        }
        if field.is_empty() {
            return Err(malformed(alias, "empty field segment"));
        }
        if segments.next().is_some() {
            tracing::warn!(alias, field, "alias has extra segments, ignoring them");
        }

        Ok(FieldAlias::new(table, field))
    }

    /// Returns the field reference to emit, qualified with the query alias
    /// of the table when one is configured.
    pub fn qualified(&self, aliases: &TableAliases) -> String {
        match aliases.get(&self.table) {
            Some(query_alias) => format!("{query_alias}.{}", self.field),
            None => self.field.clone(),
        }
    }
}

impl std::fmt::Display for FieldAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.table, SEPARATOR, self.field)
    }
}

/// Resolves a leaf alias to its bare field name.
pub fn resolve(alias: &str) -> Result<String> {
    FieldAlias::parse(alias).map(|alias| alias.field)
}

/// Logical connective of a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    /// Any member may match.
    Or,
    /// Every member must match.
    And,
}

impl Connective {
    /// Reads the connective from a grouping key such as `"or-1"`.
    ///
    /// Anything that is not an `or` group is dispatched as an `and` group;
    /// keys that are neither fail with [`FilterError::MissingGroupKey`].
    pub fn from_root_key(root_key: &str) -> Result<Connective> {
        let prefix = root_key.split(SEPARATOR).next().unwrap_or_default();
        match prefix {
            "or" => Ok(Connective::Or),
            "and" => Ok(Connective::And),
            _ => Err(FilterError::MissingGroupKey {
                alias: root_key.to_string(),
                connective: Connective::And.as_str(),
            }),
        }
    }

    /// Returns the connective name.
    pub fn as_str(self) -> &'static str {
        match self {
            Connective::Or => "or",
            Connective::And => "and",
        }
    }
}

/// Expands a grouping key and its mapping into a group node.
///
/// Each entry key is resolved as a leaf alias. Its value is either one
/// restriction mapping or a list of them.
pub fn resolve_group(root_key: &str, entries: &serde_json::Map<String, Json>) -> Result<DemandNode> {
    let connective = Connective::from_root_key(root_key)?;

    let members = entries
        .iter()
        .map(|(key, value)| {
            let path = format!("{root_key}.{key}");
            Ok(GroupMember {
                alias: FieldAlias::parse(key)?,
                restrictions: Restriction::parse_many(&path, value)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let group = Group {
        key: root_key.to_string(),
        members,
    };

    Ok(match connective {
        Connective::Or => DemandNode::Or(group),
        Connective::And => DemandNode::And(group),
    })
}

fn malformed(alias: &str, reason: &'static str) -> FilterError {
    FilterError::MalformedAlias {
        alias: alias.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Op, OperatorTag};
    use crate::value::Scalar;
    use serde_json::json;

    #[test]
    fn resolve_strips_table() {
        assert_eq!(resolve("tablename-fieldname").unwrap(), "fieldname");
        assert_eq!(resolve("t-f").unwrap(), "f");
    }

    #[test]
    fn resolve_truncates_extra_segments() {
        assert_eq!(resolve("product-unit-price").unwrap(), "unit");
    }

    #[test]
    fn resolve_rejects_bad_shapes() {
        assert!(matches!(
            resolve("price"),
            Err(FilterError::MalformedAlias { .. })
        ));
        assert!(matches!(
            resolve("-price"),
            Err(FilterError::MalformedAlias { .. })
        ));
        assert!(matches!(
            resolve("product-"),
            Err(FilterError::MalformedAlias { .. })
        ));
        assert!(matches!(resolve(""), Err(FilterError::MalformedAlias { .. })));
    }

    #[test]
    fn qualified_uses_table_alias() {
        let aliases: TableAliases = [("product", "p")].into_iter().collect();
        assert_eq!(FieldAlias::new("product", "price").qualified(&aliases), "p.price");
        assert_eq!(FieldAlias::new("order", "total").qualified(&aliases), "total");
    }

    #[test]
    fn connective_from_root_key() {
        assert_eq!(Connective::from_root_key("or-1").unwrap(), Connective::Or);
        assert_eq!(Connective::from_root_key("and-2").unwrap(), Connective::And);
        assert_eq!(Connective::from_root_key("or").unwrap(), Connective::Or);

        let err = Connective::from_root_key("xor-1").unwrap_err();
        assert!(matches!(
            err,
            FilterError::MissingGroupKey { connective: "and", .. }
        ));
    }

    #[test]
    fn resolve_group_collects_members() {
        let entries = json!({
            "product-size": [
                {"operator": "EQ", "value": 40},
                {"operator": "EQ", "value": 42},
            ],
            "product-color": {"operator": "EQ", "value": "red"},
        });
        let node = resolve_group("or-1", entries.as_object().unwrap()).unwrap();

        let group = match node {
            DemandNode::Or(group) => group,
            other => panic!("expected an or group, got {other:?}"),
        };
        assert_eq!(group.key, "or-1");
        assert_eq!(group.members.len(), 2);
        assert_eq!(group.members[0].alias.field, "size");
        assert_eq!(group.members[0].restrictions.len(), 2);
        assert_eq!(group.members[1].alias.field, "color");
        assert_eq!(
            group.members[1].restrictions[0].operator,
            OperatorTag::Compare(Op::Eq)
        );
        assert_eq!(
            group.members[1].restrictions[0].value.as_scalar(),
            Some(&Scalar::from("red"))
        );
    }

    #[test]
    fn resolve_group_propagates_alias_errors() {
        let entries = json!({"size": {"operator": "EQ", "value": 1}});
        let err = resolve_group("and-1", entries.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, FilterError::MalformedAlias { .. }));
    }
}
