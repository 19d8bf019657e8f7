//! Demand compiler.
//!
//! [`DemandCompiler`] turns a raw demand into a predicate of any
//! [`ExpressionBuilder`]:
//!
//! 1. normalize numeric strings ([`crate::normalize`]),
//! 2. parse into a typed [`Demand`],
//! 3. emit one predicate per entry and AND them together.
//!
//! Leaf emission:
//!
//! | Tag | Predicate |
//! |-----|-----------|
//! | `EQ`, `GT`, `GTE`, `LT`, `LTE` | `field <op> value` |
//! | `-` | `AND(field >= low, field <= high)` |
//! | anything else | bare `field` or an error, per [`UnknownOperatorPolicy`] |

use crate::alias::FieldAlias;
use crate::builder::ExpressionBuilder;
use crate::config::{CompilerConfig, TableAliases, UnknownOperatorPolicy};
use crate::demand::{Demand, DemandNode, Group, RawDemand, Restriction};
use crate::error::{FilterError, Result};
use crate::normalize::normalize_demand;
use crate::op::{OperatorTag, RANGE_TAG};

/// Compiles demands into predicates.
///
/// The compiler holds no state besides its configuration; one value can
/// serve any number of calls.
///
/// # Example
///
/// ```
/// use demand_filter::{DemandCompiler, PredicateBuilder, TableAliases};
/// use serde_json::json;
///
/// let demand = json!({
///     "product-price": {"operator": "-", "value": [10, 50]},
///     "or-1": {
///         "product-color": [
///             {"operator": "EQ", "value": "red"},
///             {"operator": "EQ", "value": "blue"},
///         ],
///     },
/// });
///
/// let compiler = DemandCompiler::new();
/// let predicate = compiler
///     .compile(demand.as_object().unwrap(), &TableAliases::new(), &PredicateBuilder)
///     .unwrap();
///
/// assert_eq!(
///     predicate.to_string(),
///     "((price >= 10 AND price <= 50) AND (color = 'red' OR color = 'blue'))"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DemandCompiler {
    config: CompilerConfig,
}

impl DemandCompiler {
    /// Creates a compiler with default settings.
    pub fn new() -> Self {
        DemandCompiler::default()
    }

    /// Creates a compiler with the given settings.
    pub fn with_config(config: CompilerConfig) -> Self {
        DemandCompiler { config }
    }

    /// Sets the unknown operator policy.
    pub fn unknown_operator(mut self, policy: UnknownOperatorPolicy) -> Self {
        self.config.unknown_operator = policy;
        self
    }

    /// Returns the compiler settings.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Normalizes, parses and compiles a raw demand.
    pub fn compile<B: ExpressionBuilder>(
        &self,
        raw: &RawDemand,
        aliases: &TableAliases,
        builder: &B,
    ) -> Result<B::Predicate> {
        let mut normalized = raw.clone();
        normalize_demand(&mut normalized);
        let demand = Demand::parse(&normalized)?;
        self.compile_demand(&demand, aliases, builder)
    }

    /// Compiles an already parsed demand.
    ///
    /// Top-level entries are combined with `and_x`. A single entry is
    /// returned unwrapped; an empty demand yields an empty `and_x`.
    pub fn compile_demand<B: ExpressionBuilder>(
        &self,
        demand: &Demand,
        aliases: &TableAliases,
        builder: &B,
    ) -> Result<B::Predicate> {
        let mut parts = demand
            .entries()
            .iter()
            .map(|entry| self.compile_node(&entry.node, aliases, builder))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(entries = parts.len(), "compiled demand");

        if parts.len() == 1 {
            if let Some(single) = parts.pop() {
                return Ok(single);
            }
        }
        Ok(builder.and_x(parts))
    }

    fn compile_node<B: ExpressionBuilder>(
        &self,
        node: &DemandNode,
        aliases: &TableAliases,
        builder: &B,
    ) -> Result<B::Predicate> {
        match node {
            DemandNode::Leaf(leaf) => {
                self.compile_restriction(&leaf.alias, &leaf.restriction, aliases, builder)
            }
            DemandNode::Or(group) => Ok(builder.or_x(self.compile_group(group, aliases, builder)?)),
            DemandNode::And(group) => {
                Ok(builder.and_x(self.compile_group(group, aliases, builder)?))
            }
        }
    }

    fn compile_group<B: ExpressionBuilder>(
        &self,
        group: &Group,
        aliases: &TableAliases,
        builder: &B,
    ) -> Result<Vec<B::Predicate>> {
        group
            .restrictions()
            .map(|(alias, restriction)| {
                self.compile_restriction(alias, restriction, aliases, builder)
            })
            .collect()
    }

    /// Emits the predicate of one restriction on one field.
    pub fn compile_restriction<B: ExpressionBuilder>(
        &self,
        alias: &FieldAlias,
        restriction: &Restriction,
        aliases: &TableAliases,
        builder: &B,
    ) -> Result<B::Predicate> {
        let field = alias.qualified(aliases);
        tracing::trace!(%field, operator = %restriction.operator, "emitting restriction");

        match &restriction.operator {
            OperatorTag::Compare(op) => {
                let value = restriction.value.as_scalar().ok_or_else(|| {
                    FilterError::InvalidRestrictionValue {
                        field: field.clone(),
                        operator: op.tag(),
                        message: "expected a single value, got a list".to_string(),
                    }
                })?;
                Ok(builder.compare(&field, *op, value))
            }
            OperatorTag::Range => {
                let (low, high) = restriction.value.as_pair().ok_or_else(|| {
                    FilterError::InvalidRestrictionValue {
                        field: field.clone(),
                        operator: RANGE_TAG,
                        message: "expected a [low, high] pair".to_string(),
                    }
                })?;
                Ok(builder.and_x(vec![
                    builder.gte(&field, low),
                    builder.lte(&field, high),
                ]))
            }
            OperatorTag::Unknown(tag) => match self.config.unknown_operator {
                UnknownOperatorPolicy::Placeholder => {
                    tracing::warn!(%field, operator = %tag, "unknown operator, emitting bare field");
                    Ok(builder.field(&field))
                }
                UnknownOperatorPolicy::Reject => Err(FilterError::UnknownOperator {
                    field,
                    operator: tag.clone(),
                }),
            },
        }
    }
}
