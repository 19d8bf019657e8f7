//! Demand filter - compiles declarative filter demands into predicate trees.
//!
//! A *demand* is a nested mapping describing the active filters of a listing:
//! which field, which operator, which value, and how restrictions group
//! together. This crate turns it into a boolean predicate for a query layer:
//!
//! - Numeric strings in leaf values are coerced to integers
//! - `"table-field"` aliases resolve to field names
//! - `"or-<n>"` / `"and-<n>"` keys group restrictions under OR / AND
//! - Range restrictions (`-`) expand to `field >= low AND field <= high`
//! - Predicates are emitted through the [`ExpressionBuilder`] trait, so any
//!   query layer can receive them
//!
//! # Quick Start
//!
//! ```rust
//! use demand_filter::{DemandCompiler, PredicateBuilder, Scalar, TableAliases};
//! use serde_json::json;
//!
//! let demand = json!({
//!     "product-price": {"operator": "GTE", "value": "20"},
//!     "or-1": {
//!         "product-brand": [
//!             {"operator": "EQ", "value": "acme"},
//!             {"operator": "EQ", "value": "globex"},
//!         ],
//!     },
//! });
//!
//! let predicate = DemandCompiler::new()
//!     .compile(demand.as_object().unwrap(), &TableAliases::new(), &PredicateBuilder)
//!     .unwrap();
//!
//! assert_eq!(
//!     predicate.to_string(),
//!     "(price >= 20 AND (brand = 'acme' OR brand = 'globex'))"
//! );
//!
//! // Built-in predicates can be evaluated in memory.
//! let row: std::collections::HashMap<String, Scalar> = [
//!     ("price".to_string(), Scalar::Int(25)),
//!     ("brand".to_string(), Scalar::from("globex")),
//! ]
//! .into_iter()
//! .collect();
//! assert!(predicate.matches(&row).unwrap());
//! ```
//!
//! # Demand Grammar
//!
//! ```text
//! demand      = { entry* }
//! entry       = "<table>-<field>" : restriction
//!             | "or-<n>" | "and-<n>" : { "<table>-<field>" : restriction | [restriction*] }
//! restriction = { "operator": tag, "value": scalar | [low, high] }
//! tag         = "EQ" | "GT" | "GTE" | "LT" | "LTE" | "-"
//! ```
//!
//! Top-level entries are combined with AND. Entries with an `operator` key
//! are restrictions; every other entry is a group.
//!
//! # Unknown Operators
//!
//! Tags outside the list above compile to a bare field reference by default
//! ([`UnknownOperatorPolicy::Placeholder`]). Set
//! [`UnknownOperatorPolicy::Reject`] to fail instead.
//!
//! # Collecting Demands
//!
//! Demands can come from several [`DemandProvider`]s. A [`DemandCollector`]
//! folds them per [`MergePolicy`] and a [`DemandFilter`] compiles the result.

mod alias;
mod builder;
mod compile;
mod config;
mod demand;
mod error;
mod eval;
mod filter;
mod normalize;
mod op;
mod provider;
mod value;

// Re-export public API
pub use alias::{resolve, resolve_group, Connective, FieldAlias, SEPARATOR};
pub use builder::{ExpressionBuilder, Predicate, PredicateBuilder};
pub use compile::DemandCompiler;
pub use config::{CompilerConfig, FilterConfig, MergePolicy, TableAliases, UnknownOperatorPolicy};
pub use demand::{
    Demand, DemandEntry, DemandNode, FieldRestriction, Group, GroupMember, RawDemand, Restriction,
    RestrictionValue, OPERATOR_KEY, VALUE_KEY,
};
pub use error::{FilterError, Result};
pub use eval::Record;
pub use filter::DemandFilter;
pub use normalize::{
    is_numeric_string, normalize, normalize_demand, normalize_in_place, parse_integer,
};
pub use op::{Op, OperatorTag, RANGE_TAG};
pub use provider::{
    DemandCollector, DemandProvider, FnProvider, ProviderRegistry, StaticProvider,
};
pub use value::Scalar;
