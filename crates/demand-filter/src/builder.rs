//! Expression builder seam and the built-in predicate tree.
//!
//! The compiler never constructs predicates itself: it calls an
//! [`ExpressionBuilder`], so any query layer that can express comparisons and
//! AND/OR groups can receive compiled demands. [`PredicateBuilder`] is the
//! built-in implementation, producing a [`Predicate`] tree that renders as a
//! SQL-style condition and can be evaluated in memory.

use std::fmt;

use crate::op::Op;
use crate::value::Scalar;

/// Factory for the predicates of a query layer.
///
/// Mirrors the usual expression-builder surface: binary comparisons plus
/// variadic `and_x`/`or_x`.
pub trait ExpressionBuilder {
    /// Opaque predicate type produced by this builder.
    type Predicate;

    /// `field = value`.
    fn eq(&self, field: &str, value: &Scalar) -> Self::Predicate;

    /// `field > value`.
    fn gt(&self, field: &str, value: &Scalar) -> Self::Predicate;

    /// `field >= value`.
    fn gte(&self, field: &str, value: &Scalar) -> Self::Predicate;

    /// `field < value`.
    fn lt(&self, field: &str, value: &Scalar) -> Self::Predicate;

    /// `field <= value`.
    fn lte(&self, field: &str, value: &Scalar) -> Self::Predicate;

    /// Conjunction of `parts`.
    fn and_x(&self, parts: Vec<Self::Predicate>) -> Self::Predicate;

    /// Disjunction of `parts`.
    fn or_x(&self, parts: Vec<Self::Predicate>) -> Self::Predicate;

    /// Bare field reference, used as a placeholder for unsupported operators.
    fn field(&self, field: &str) -> Self::Predicate;

    /// Dispatches a comparison by operator.
    fn compare(&self, field: &str, op: Op, value: &Scalar) -> Self::Predicate {
        match op {
            Op::Eq => self.eq(field, value),
            Op::Gt => self.gt(field, value),
            Op::Gte => self.gte(field, value),
            Op::Lt => self.lt(field, value),
            Op::Lte => self.lte(field, value),
        }
    }
}

/// Built-in predicate tree.
///
/// # Example
///
/// ```
/// use demand_filter::{ExpressionBuilder, PredicateBuilder, Scalar};
///
/// let b = PredicateBuilder;
/// let p = b.and_x(vec![
///     b.gte("price", &Scalar::Int(1)),
///     b.lte("price", &Scalar::Int(10)),
/// ]);
/// assert_eq!(p.to_string(), "(price >= 1 AND price <= 10)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Binary comparison of a field against a value.
    Compare {
        /// Field reference.
        field: String,
        /// Comparison operator.
        op: Op,
        /// Operand.
        value: Scalar,
    },
    /// All parts must hold. Empty is always true and renders as `1=1`.
    And(Vec<Predicate>),
    /// At least one part must hold. Empty is always false and renders as `1=0`.
    Or(Vec<Predicate>),
    /// Bare field reference, true when the field value is truthy.
    Field(String),
}

impl Predicate {
    /// Creates a comparison predicate.
    pub fn compare(field: impl Into<String>, op: Op, value: impl Into<Scalar>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Returns `true` for an empty conjunction, which matches everything.
    pub fn is_trivial(&self) -> bool {
        matches!(self, Predicate::And(parts) if parts.is_empty())
    }

    /// Returns every field this predicate references, in order of appearance.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Compare { field, .. } | Predicate::Field(field) => out.push(field),
            Predicate::And(parts) | Predicate::Or(parts) => {
                for part in parts {
                    part.collect_fields(out);
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare {
                field,
                op: Op::Eq,
                value: Scalar::Null,
            } => write!(f, "{field} IS NULL"),
            Predicate::Compare { field, op, value } => write!(f, "{field} {op} {value}"),
            Predicate::Field(field) => write!(f, "{field}"),
            Predicate::And(parts) => write_group(f, parts, "AND", "1=1"),
            Predicate::Or(parts) => write_group(f, parts, "OR", "1=0"),
        }
    }
}

fn write_group(
    f: &mut fmt::Formatter<'_>,
    parts: &[Predicate],
    joiner: &str,
    empty: &str,
) -> fmt::Result {
    match parts {
        [] => write!(f, "{empty}"),
        [single] => write!(f, "{single}"),
        _ => {
            write!(f, "(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    write!(f, " {joiner} ")?;
                }
                write!(f, "{part}")?;
            }
            write!(f, ")")
        }
    }
}

/// [`ExpressionBuilder`] producing [`Predicate`] trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateBuilder;

impl ExpressionBuilder for PredicateBuilder {
    type Predicate = Predicate;

    fn eq(&self, field: &str, value: &Scalar) -> Predicate {
        Predicate::compare(field, Op::Eq, value.clone())
    }

    fn gt(&self, field: &str, value: &Scalar) -> Predicate {
        Predicate::compare(field, Op::Gt, value.clone())
    }

    fn gte(&self, field: &str, value: &Scalar) -> Predicate {
        Predicate::compare(field, Op::Gte, value.clone())
    }

    fn lt(&self, field: &str, value: &Scalar) -> Predicate {
        Predicate::compare(field, Op::Lt, value.clone())
    }

    fn lte(&self, field: &str, value: &Scalar) -> Predicate {
        Predicate::compare(field, Op::Lte, value.clone())
    }

    fn and_x(&self, parts: Vec<Predicate>) -> Predicate {
        Predicate::And(parts)
    }

    fn or_x(&self, parts: Vec<Predicate>) -> Predicate {
        Predicate::Or(parts)
    }

    fn field(&self, field: &str) -> Predicate {
        Predicate::Field(field.to_string())
    }
}
