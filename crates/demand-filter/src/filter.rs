//! One-call demand filtering.
//!
//! [`DemandFilter`] wires a [`DemandCollector`] to a [`DemandCompiler`]:
//! collect the current demand, then compile it for a query layer.

use crate::builder::ExpressionBuilder;
use crate::compile::DemandCompiler;
use crate::config::{FilterConfig, TableAliases};
use crate::demand::RawDemand;
use crate::error::Result;
use crate::provider::{DemandCollector, ProviderRegistry};

/// Collects and compiles demands.
///
/// # Example
///
/// ```
/// use demand_filter::{
///     DemandCollector, DemandCompiler, DemandFilter, PredicateBuilder, StaticProvider,
/// };
///
/// let url = StaticProvider::from_json_str(
///     "url",
///     r#"{"product-price": {"operator": "LTE", "value": "100"}}"#,
/// )
/// .unwrap();
///
/// let filter = DemandFilter::new(
///     DemandCollector::new().provider(url),
///     DemandCompiler::new(),
/// );
///
/// let predicate = filter.build(&PredicateBuilder).unwrap();
/// assert_eq!(predicate.to_string(), "price <= 100");
/// ```
#[derive(Debug, Default)]
pub struct DemandFilter {
    collector: DemandCollector,
    compiler: DemandCompiler,
    aliases: TableAliases,
}

impl DemandFilter {
    /// Creates a filter with no table aliases.
    pub fn new(collector: DemandCollector, compiler: DemandCompiler) -> Self {
        DemandFilter {
            collector,
            compiler,
            aliases: TableAliases::new(),
        }
    }

    /// Builds a filter from configuration, instantiating providers through
    /// `registry`.
    pub fn from_config(config: &FilterConfig, registry: &ProviderRegistry) -> Result<Self> {
        Ok(DemandFilter {
            collector: DemandCollector::from_config(config, registry)?,
            compiler: DemandCompiler::with_config(config.compiler()),
            aliases: config.table_aliases.clone(),
        })
    }

    /// Sets the table aliases used to qualify field references.
    pub fn table_aliases(mut self, aliases: TableAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Returns the collector.
    pub fn collector(&self) -> &DemandCollector {
        &self.collector
    }

    /// Returns the compiler.
    pub fn compiler(&self) -> &DemandCompiler {
        &self.compiler
    }

    /// Returns the current combined demand, before normalization.
    pub fn demand(&self) -> Result<RawDemand> {
        self.collector.collect()
    }

    /// Collects the current demand and compiles it.
    pub fn build<B: ExpressionBuilder>(&self, builder: &B) -> Result<B::Predicate> {
        let demand = self.collector.collect()?;
        self.build_from(&demand, builder)
    }

    /// Compiles a given raw demand with this filter's compiler and aliases.
    pub fn build_from<B: ExpressionBuilder>(
        &self,
        demand: &RawDemand,
        builder: &B,
    ) -> Result<B::Predicate> {
        self.compiler.compile(demand, &self.aliases, builder)
    }
}
