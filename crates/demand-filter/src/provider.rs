//! Demand providers and collection.
//!
//! A [`DemandProvider`] produces a raw demand, typically from request state
//! (query string, session, saved search). A [`DemandCollector`] asks each of
//! its providers in order and combines the results per [`MergePolicy`].
//!
//! Providers are instantiated from configuration through a
//! [`ProviderRegistry`], which maps provider type identifiers to factories.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value as Json;

use crate::config::{FilterConfig, MergePolicy};
use crate::demand::RawDemand;
use crate::error::{FilterError, Result};

/// Source of a raw demand.
pub trait DemandProvider: Send + Sync {
    /// Identifier of this provider, as configured.
    fn id(&self) -> &str;

    /// Produces the current demand.
    fn demand(&self) -> Result<RawDemand>;
}

/// Provider returning a fixed demand.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    id: String,
    demand: RawDemand,
}

impl StaticProvider {
    /// Creates a provider from a demand mapping.
    pub fn new(id: impl Into<String>, demand: RawDemand) -> Self {
        StaticProvider {
            id: id.into(),
            demand,
        }
    }

    /// Creates an empty provider.
    pub fn empty(id: impl Into<String>) -> Self {
        StaticProvider::new(id, RawDemand::new())
    }

    /// Parses a demand from JSON text.
    pub fn from_json_str(id: impl Into<String>, json: &str) -> Result<Self> {
        let id = id.into();
        let value: Json = serde_json::from_str(json)?;
        let demand = into_mapping(&id, value)?;
        Ok(StaticProvider::new(id, demand))
    }

    /// Parses a demand from YAML text.
    pub fn from_yaml_str(id: impl Into<String>, yaml: &str) -> Result<Self> {
        let id = id.into();
        let value: Json = serde_yaml::from_str(yaml)?;
        let demand = into_mapping(&id, value)?;
        Ok(StaticProvider::new(id, demand))
    }
}

impl DemandProvider for StaticProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn demand(&self) -> Result<RawDemand> {
        Ok(self.demand.clone())
    }
}

/// Provider backed by a closure.
pub struct FnProvider<F> {
    id: String,
    f: F,
}

impl<F> FnProvider<F>
where
    F: Fn() -> Result<RawDemand> + Send + Sync,
{
    /// Creates a provider calling `f` for every demand.
    pub fn new(id: impl Into<String>, f: F) -> Self {
        FnProvider { id: id.into(), f }
    }
}

impl<F> DemandProvider for FnProvider<F>
where
    F: Fn() -> Result<RawDemand> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn demand(&self) -> Result<RawDemand> {
        (self.f)()
    }
}

impl<F> fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider").field("id", &self.id).finish()
    }
}

type ProviderFactory = Box<dyn Fn(&str) -> Result<Box<dyn DemandProvider>> + Send + Sync>;

/// Maps provider type identifiers to factories.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ProviderRegistry::default()
    }

    /// Registers a factory for `kind`. The factory receives the provider id.
    pub fn register<F>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&str) -> Result<Box<dyn DemandProvider>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
        self
    }

    /// Returns `true` if a factory is registered for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Creates one provider.
    pub fn create(&self, id: &str, kind: &str) -> Result<Box<dyn DemandProvider>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| FilterError::UnknownProviderType {
                id: id.to_string(),
                kind: kind.to_string(),
            })?;
        factory(id)
    }

    /// Creates every configured provider, in configured order.
    pub fn instantiate(&self, config: &FilterConfig) -> Result<Vec<Box<dyn DemandProvider>>> {
        config
            .providers
            .iter()
            .map(|(id, kind)| self.create(id, kind))
            .collect()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("ProviderRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

/// Collects demands from ordered providers.
#[derive(Default)]
pub struct DemandCollector {
    providers: Vec<Box<dyn DemandProvider>>,
    policy: MergePolicy,
}

impl DemandCollector {
    /// Creates a collector with no providers and the default policy.
    pub fn new() -> Self {
        DemandCollector::default()
    }

    /// Creates a collector from configuration.
    pub fn from_config(config: &FilterConfig, registry: &ProviderRegistry) -> Result<Self> {
        Ok(DemandCollector {
            providers: registry.instantiate(config)?,
            policy: config.merge,
        })
    }

    /// Sets the merge policy.
    pub fn policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Appends a provider.
    pub fn provider(mut self, provider: impl DemandProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Appends an already boxed provider.
    pub fn boxed_provider(mut self, provider: Box<dyn DemandProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Returns the provider ids in order.
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Returns the merge policy.
    pub fn merge_policy(&self) -> MergePolicy {
        self.policy
    }

    /// Asks every provider for its demand and combines them.
    ///
    /// With [`MergePolicy::Merge`] later providers override aliases of
    /// earlier ones and new aliases are appended. With
    /// [`MergePolicy::LastWins`] only the last provider's demand is kept,
    /// though every provider is still asked. No providers yields an empty
    /// demand.
    pub fn collect(&self) -> Result<RawDemand> {
        let mut combined = RawDemand::new();

        for provider in &self.providers {
            let demand = provider.demand()?;
            tracing::trace!(provider = provider.id(), entries = demand.len(), "provider demand");

            match self.policy {
                MergePolicy::Merge => combined.extend(demand),
                MergePolicy::LastWins => combined = demand,
            }
        }

        tracing::debug!(
            providers = self.providers.len(),
            entries = combined.len(),
            policy = ?self.policy,
            "collected demand"
        );
        Ok(combined)
    }
}

impl fmt::Debug for DemandCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemandCollector")
            .field("providers", &self.provider_ids())
            .field("policy", &self.policy)
            .finish()
    }
}

fn into_mapping(id: &str, value: Json) -> Result<RawDemand> {
    match value {
        Json::Object(map) => Ok(map),
        Json::Null => Ok(RawDemand::new()),
        _ => Err(FilterError::Provider {
            id: id.to_string(),
            message: "demand must be a mapping".to_string(),
        }),
    }
}
