//! In-memory evaluation of built-in predicates.
//!
//! A compiled [`Predicate`] can be checked against any type implementing
//! [`Record`]. This is handy for tests and for filtering small collections
//! without a database.

use std::collections::{BTreeMap, HashMap};

use crate::builder::Predicate;
use crate::error::{FilterError, Result};
use crate::op::Op;
use crate::value::Scalar;

/// Field access for predicate evaluation.
///
/// Return `None` for fields the record does not have; evaluation then fails
/// with [`FilterError::InvalidFieldReference`]. A field that exists but has
/// no value should return `Some(Scalar::Null)`.
///
/// # Example
///
/// ```
/// use demand_filter::{Record, Scalar};
///
/// struct Product {
///     name: String,
///     price: i64,
/// }
///
/// impl Record for Product {
///     fn field_value(&self, field: &str) -> Option<Scalar> {
///         match field {
///             "name" => Some(Scalar::from(self.name.as_str())),
///             "price" => Some(Scalar::Int(self.price)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value of `field`, or `None` if the record has no such field.
    fn field_value(&self, field: &str) -> Option<Scalar>;
}

impl Record for HashMap<String, Scalar> {
    fn field_value(&self, field: &str) -> Option<Scalar> {
        self.get(field).cloned()
    }
}

impl Record for BTreeMap<String, Scalar> {
    fn field_value(&self, field: &str) -> Option<Scalar> {
        self.get(field).cloned()
    }
}

/// Nested values (lists, mappings) read as `Null`.
impl Record for serde_json::Map<String, serde_json::Value> {
    fn field_value(&self, field: &str) -> Option<Scalar> {
        self.get(field)
            .map(|value| Scalar::from_json(value).unwrap_or(Scalar::Null))
    }
}

impl Predicate {
    /// Evaluates this predicate against a record.
    ///
    /// Comparisons between incompatible types never match. A `Null` operand
    /// follows SQL: `= NULL` tests for a null field, ordering against `NULL`
    /// never matches.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> Result<bool> {
        match self {
            Predicate::Compare { field, op, value } => {
                let actual = lookup(record, field)?;
                if value.is_null() {
                    return Ok(*op == Op::Eq && actual.is_null());
                }
                Ok(actual
                    .compare(value)
                    .is_some_and(|ordering| op.eval_ordering(ordering)))
            }
            Predicate::Field(field) => Ok(lookup(record, field)?.is_truthy()),
            Predicate::And(parts) => {
                for part in parts {
                    if !part.matches(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Or(parts) => {
                for part in parts {
                    if part.matches(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Returns the records this predicate matches, in input order.
    pub fn filter<'a, R: Record>(&self, records: &'a [R]) -> Result<Vec<&'a R>> {
        let mut matched = Vec::new();
        for record in records {
            if self.matches(record)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }

    /// Counts the records this predicate matches.
    pub fn count<R: Record>(&self, records: &[R]) -> Result<usize> {
        self.filter(records).map(|matched| matched.len())
    }
}

fn lookup<R: Record + ?Sized>(record: &R, field: &str) -> Result<Scalar> {
    record
        .field_value(field)
        .ok_or_else(|| FilterError::InvalidFieldReference {
            field: field.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Scalar)]) -> HashMap<String, Scalar> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn comparisons() {
        let r = row(&[("price", Scalar::Int(10))]);
        assert!(Predicate::compare("price", Op::Eq, 10).matches(&r).unwrap());
        assert!(Predicate::compare("price", Op::Gt, 9).matches(&r).unwrap());
        assert!(Predicate::compare("price", Op::Gte, 10).matches(&r).unwrap());
        assert!(!Predicate::compare("price", Op::Lt, 10).matches(&r).unwrap());
        assert!(Predicate::compare("price", Op::Lte, 10.5).matches(&r).unwrap());
    }

    #[test]
    fn type_mismatch_never_matches() {
        let r = row(&[("price", Scalar::Int(10))]);
        assert!(!Predicate::compare("price", Op::Eq, "10").matches(&r).unwrap());
        assert!(!Predicate::compare("price", Op::Gte, true).matches(&r).unwrap());
    }

    #[test]
    fn null_operands() {
        let r = row(&[("deleted_at", Scalar::Null), ("price", Scalar::Int(3))]);
        assert!(Predicate::compare("deleted_at", Op::Eq, Scalar::Null).matches(&r).unwrap());
        assert!(!Predicate::compare("price", Op::Eq, Scalar::Null).matches(&r).unwrap());
        assert!(!Predicate::compare("deleted_at", Op::Gte, Scalar::Null).matches(&r).unwrap());
        assert!(!Predicate::compare("deleted_at", Op::Lte, Scalar::Null).matches(&r).unwrap());
    }

    #[test]
    fn empty_groups() {
        let r = row(&[]);
        assert!(Predicate::And(vec![]).matches(&r).unwrap());
        assert!(!Predicate::Or(vec![]).matches(&r).unwrap());
    }

    #[test]
    fn groups_short_circuit() {
        let r = row(&[("a", Scalar::Int(1))]);
        // The missing field is never reached.
        let or = Predicate::Or(vec![
            Predicate::compare("a", Op::Eq, 1),
            Predicate::compare("missing", Op::Eq, 1),
        ]);
        assert!(or.matches(&r).unwrap());

        let and = Predicate::And(vec![
            Predicate::compare("a", Op::Eq, 2),
            Predicate::compare("missing", Op::Eq, 1),
        ]);
        assert!(!and.matches(&r).unwrap());
    }

    #[test]
    fn unknown_field_is_an_error() {
        let r = row(&[("a", Scalar::Int(1))]);
        let err = Predicate::compare("b", Op::Eq, 1).matches(&r).unwrap_err();
        assert!(matches!(err, FilterError::InvalidFieldReference { ref field } if field == "b"));
    }

    #[test]
    fn bare_field_is_truthiness() {
        let r = row(&[("on", Scalar::Bool(true)), ("off", Scalar::from("0"))]);
        assert!(Predicate::Field("on".into()).matches(&r).unwrap());
        assert!(!Predicate::Field("off".into()).matches(&r).unwrap());
    }

    #[test]
    fn json_records() {
        let record = json!({"name": "shirt", "tags": ["a"], "price": 12.5});
        let record = record.as_object().unwrap();
        assert!(Predicate::compare("name", Op::Eq, "shirt").matches(record).unwrap());
        assert!(Predicate::compare("price", Op::Gt, 12).matches(record).unwrap());
        assert!(!Predicate::Field("tags".into()).matches(record).unwrap());
    }

    #[test]
    fn filter_and_count() {
        let rows = vec![
            row(&[("n", Scalar::Int(1))]),
            row(&[("n", Scalar::Int(5))]),
            row(&[("n", Scalar::Int(9))]),
        ];
        let p = Predicate::compare("n", Op::Gte, 5);
        let matched = p.filter(&rows).unwrap();
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].get("n"), Some(&Scalar::Int(5)));
        assert_eq!(p.count(&rows).unwrap(), 2);
    }
}
