//! Query options loaded from configuration files.
//!
//! Hosts often keep table defaults (page size, empty state copy) next to
//! the rest of their configuration. [`TableConfig`] reads them from YAML or
//! JSON and turns them into user options for
//! [`QueryDefinition::build`](crate::QueryDefinition::build). Only keys
//! present in the file are emitted, so schema defaults still apply to the
//! rest.
//!
//! ```
//! use strainer::TableConfig;
//!
//! let config = TableConfig::from_yaml("per_page: 50\nempty_state:\n  title: Nothing yet\n").unwrap();
//! assert_eq!(config.per_page, Some(50));
//!
//! let options = config.into_options();
//! assert!(options.contains_key("per_page"));
//! assert!(!options.contains_key("paginate"));
//! ```

use serde::Deserialize;
use serde_json::Value;
use strainer_options::{OptionValue, Options};

use crate::error::ConfigError;

/// Table options as written in a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub per_page: Option<u64>,
    pub page_param: Option<String>,
    pub paginate: Option<bool>,
    pub empty_state: Option<EmptyStateConfig>,
    pub filters: Option<FiltersConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyStateConfig {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    pub param_key: Option<String>,
    pub reset: Option<bool>,
}

impl TableConfig {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// The configured keys as an options tree.
    pub fn into_options(self) -> Options<Value> {
        let mut options = Options::new();
        insert(&mut options, "per_page", self.per_page);
        insert(&mut options, "page_param", self.page_param);
        insert(&mut options, "paginate", self.paginate);

        if let Some(empty_state) = self.empty_state {
            let mut nested = Options::new();
            insert(&mut nested, "title", empty_state.title);
            insert(&mut nested, "description", empty_state.description);
            options.insert("empty_state".into(), OptionValue::Nested(nested));
        }

        if let Some(filters) = self.filters {
            let mut nested = Options::new();
            insert(&mut nested, "param_key", filters.param_key);
            insert(&mut nested, "reset", filters.reset);
            options.insert("filters".into(), OptionValue::Nested(nested));
        }

        options
    }
}

fn insert<T: Into<Value>>(options: &mut Options<Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        options.insert(key.to_string(), OptionValue::Value(value.into()));
    }
}
