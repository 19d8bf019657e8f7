//! Configuration for collectors and compilers.
//!
//! ```yaml
//! providers:                  # ordered: provider id -> provider type
//!   session: session_demand
//!   url: query_demand
//! merge: merge                # merge | last_wins
//! unknown_operator: placeholder   # placeholder | reject
//! table_aliases:              # demand table -> query alias
//!   product: p
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// How a collector combines the demands of several providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Fold providers in order; later providers override the same alias.
    #[default]
    Merge,
    /// Keep only the last provider's demand.
    LastWins,
}

/// What the compiler does with an operator tag it does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOperatorPolicy {
    /// Emit a bare field reference in place of the comparison.
    #[default]
    Placeholder,
    /// Fail with [`FilterError::UnknownOperator`].
    Reject,
}

/// Mapping of demand table names to query aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableAliases(IndexMap<String, String>);

impl TableAliases {
    /// Creates an empty mapping; fields are emitted unqualified.
    pub fn new() -> Self {
        TableAliases::default()
    }

    /// Adds a mapping.
    pub fn with(mut self, table: impl Into<String>, alias: impl Into<String>) -> Self {
        self.0.insert(table.into(), alias.into());
        self
    }

    /// Returns the query alias for `table`, if mapped.
    pub fn get(&self, table: &str) -> Option<&str> {
        self.0.get(table).map(String::as_str)
    }

    /// Returns `true` if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TableAliases {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TableAliases(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Settings of a [`DemandCompiler`](crate::DemandCompiler).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Handling of unrecognized operator tags.
    pub unknown_operator: UnknownOperatorPolicy,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Ordered mapping of provider id to provider type.
    pub providers: IndexMap<String, String>,
    /// How provider demands are combined.
    pub merge: MergePolicy,
    /// Handling of unrecognized operator tags.
    pub unknown_operator: UnknownOperatorPolicy,
    /// Demand table to query alias.
    pub table_aliases: TableAliases,
}

impl FilterConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration file. `.json` files are read as JSON, anything
    /// else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            FilterConfig::from_json_str(&content)
        } else {
            FilterConfig::from_yaml_str(&content)
        };

        parsed.map_err(|e| FilterError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the compiler settings.
    pub fn compiler(&self) -> CompilerConfig {
        CompilerConfig {
            unknown_operator: self.unknown_operator,
        }
    }
}
