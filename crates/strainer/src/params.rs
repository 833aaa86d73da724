//! User-supplied request parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request parameters as decoded by the embedding application.
///
/// Values are JSON so that structured parameters (`filters[status]=open`
/// decoded into `{"filters": {"status": "open"}}`) and plain strings live
/// side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    /// Creates empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from a JSON object. Anything else yields no
    /// parameters.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map.into_iter().collect()),
            _ => Self::default(),
        }
    }

    /// Builds parameters from decoded `key=value` pairs. Later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }

    /// Adds or replaces a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// The parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if no parameters were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The raw value for filter `name`, `null` when absent.
    ///
    /// With a `param_key`, filter values are read from the object stored
    /// under that key instead of the top level.
    pub fn filter_value(&self, param_key: Option<&str>, name: &str) -> Value {
        let found = match param_key {
            Some(key) => self.get(key).and_then(|scope| scope.get(name)),
            None => self.get(name),
        };
        found.cloned().unwrap_or(Value::Null)
    }

    /// The current page, read from `page_param`.
    ///
    /// Accepts numbers and numeric strings; anything missing, malformed or
    /// below 1 is page 1.
    pub fn page(&self, page_param: &str) -> usize {
        let page = match self.get(page_param) {
            Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
            Some(Value::String(s)) => s.trim().parse::<usize>().ok(),
            _ => None,
        };
        page.filter(|p| *p >= 1).unwrap_or(1)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
