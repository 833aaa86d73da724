//! The option schema and its values.
//!
//! An [`OptionsMap`] is a schema (valid keys, required keys, nested
//! sub-schemas) and a set of values in one structure. Schemas are extended by
//! deriving copies, so a schema handed out to one owner never changes under it.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::{OptionsError, Result};

/// A tree of option values keyed by name.
pub type Options<V = Value> = BTreeMap<String, OptionValue<V>>;

/// A single option entry: either a plain value or a nested mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue<V = Value> {
    /// A plain value.
    Value(V),
    /// A mapping validated against a nested schema.
    Nested(Options<V>),
}

impl<V> OptionValue<V> {
    /// Builds a nested entry from `(name, entry)` pairs.
    pub fn nested<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, OptionValue<V>)>,
    {
        OptionValue::Nested(options(entries))
    }

    /// Returns the plain value, if this is one.
    pub fn as_value(&self) -> Option<&V> {
        match self {
            OptionValue::Value(v) => Some(v),
            OptionValue::Nested(_) => None,
        }
    }

    /// Returns the nested mapping, if this is one.
    pub fn as_nested(&self) -> Option<&Options<V>> {
        match self {
            OptionValue::Nested(map) => Some(map),
            OptionValue::Value(_) => None,
        }
    }
}

impl<V> From<V> for OptionValue<V> {
    fn from(value: V) -> Self {
        OptionValue::Value(value)
    }
}

/// Collects `(name, entry)` pairs into an [`Options`] tree.
///
/// ```
/// use serde_json::json;
/// use strainer_options::{options, OptionValue};
///
/// let opts = options([
///     ("per_page", OptionValue::Value(json!(50))),
///     ("empty_state", OptionValue::nested([("title", OptionValue::Value(json!("Nothing here")))])),
/// ]);
/// assert_eq!(opts.len(), 2);
/// ```
pub fn options<V, K, I>(entries: I) -> Options<V>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, OptionValue<V>)>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Converts a JSON document into an [`Options`] tree.
///
/// Every JSON object becomes a nested entry; everything else is a plain
/// value. Non-object input yields an empty tree. Use
/// [`OptionsMap::json_options`] when some options take objects as plain
/// values.
pub fn options_from_json(value: Value) -> Options<Value> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| {
                let entry = match value {
                    Value::Object(_) => OptionValue::Nested(options_from_json(value)),
                    other => OptionValue::Value(other),
                };
                (key, entry)
            })
            .collect(),
        _ => Options::new(),
    }
}

/// Option schema plus the values resolved against it.
///
/// Every schema-building method (`define`, `nest`, `merge`) returns a new
/// copy and leaves the receiver untouched. The owning object validates the
/// merged result and freezes it for its lifetime:
///
/// ```
/// use serde_json::json;
/// use strainer_options::{options, OptionsMap, OptionValue};
///
/// let schema = OptionsMap::new()
///     .with_default("per_page", json!(25))
///     .required("name");
///
/// let resolved = schema
///     .merge(options([("name", OptionValue::Value(json!("users")))]))
///     .validate()
///     .unwrap()
///     .freeze();
///
/// assert_eq!(resolved.get("per_page"), Some(&json!(25)));
/// assert!(resolved.is_frozen());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsMap<V = Value> {
    values: Options<V>,
    valid_keys: BTreeSet<String>,
    required_keys: BTreeSet<String>,
    nested: BTreeMap<String, OptionsMap<V>>,
    frozen: bool,
}

impl<V> Default for OptionsMap<V> {
    fn default() -> Self {
        Self {
            values: Options::new(),
            valid_keys: BTreeSet::new(),
            required_keys: BTreeSet::new(),
            nested: BTreeMap::new(),
            frozen: false,
        }
    }
}

impl<V> OptionsMap<V> {
    /// Creates an empty schema with no declared keys.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Keys that may legally appear.
    pub fn valid_keys(&self) -> &BTreeSet<String> {
        &self.valid_keys
    }

    /// Keys that must be present before use.
    pub fn required_keys(&self) -> &BTreeSet<String> {
        &self.required_keys
    }

    /// The sub-schema declared for `name`, if any.
    pub fn nested_schema(&self, name: &str) -> Option<&OptionsMap<V>> {
        self.nested.get(name)
    }

    /// All current values.
    pub fn values(&self) -> &Options<V> {
        &self.values
    }

    /// Returns the plain value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.values.get(name).and_then(OptionValue::as_value)
    }

    /// Returns the nested mapping stored under `name`.
    pub fn get_nested(&self, name: &str) -> Option<&Options<V>> {
        self.values.get(name).and_then(OptionValue::as_nested)
    }

    /// Follows a path of nested keys down to a plain value.
    ///
    /// `get_in(&["filters", "reset"])` reads `reset` inside the nested
    /// `filters` mapping.
    pub fn get_in(&self, path: &[&str]) -> Option<&V> {
        let (last, parents) = path.split_last()?;
        let mut current = &self.values;
        for key in parents {
            current = current.get(*key)?.as_nested()?;
        }
        current.get(*last)?.as_value()
    }

    /// Returns `true` if a value (or nested mapping) is present for `name`.
    pub fn contains_key(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns `true` once the owner has frozen these options.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Marks the options as write-once; later [`set`](Self::set) calls fail.
    pub fn freeze(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Sets a single declared value in place.
    ///
    /// Fails with [`OptionsError::Frozen`] once frozen and with
    /// [`OptionsError::Unknown`] for undeclared keys.
    pub fn set(&mut self, name: impl Into<String>, value: V) -> Result<()> {
        let name = name.into();
        if self.frozen {
            return Err(OptionsError::Frozen { key: name });
        }
        if !self.valid_keys.contains(&name) {
            let mut input: BTreeSet<String> = self.values.keys().cloned().collect();
            input.insert(name.clone());
            return Err(OptionsError::Unknown {
                input,
                valid: self.valid_keys.clone(),
                unknown: BTreeSet::from([name]),
            });
        }
        self.values.insert(name, OptionValue::Value(value));
        Ok(())
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Checks the schema invariants and hands the map back on success.
    ///
    /// Fails when a value is present under an undeclared key, when a required
    /// key is absent, or when a nested mapping violates its own schema. Keys
    /// reported from nested schemas are dotted paths (`filters.reset`).
    pub fn validate(self) -> Result<Self> {
        self.check()?;
        Ok(self)
    }

    /// Like [`validate`](Self::validate), but by reference.
    pub fn check(&self) -> Result<()> {
        self.check_values(&self.values, None)
    }

    fn check_values(&self, values: &Options<V>, prefix: Option<&str>) -> Result<()> {
        let input: BTreeSet<String> = values.keys().cloned().collect();

        let unknown: BTreeSet<String> = input.difference(&self.valid_keys).cloned().collect();
        if !unknown.is_empty() {
            return Err(OptionsError::Unknown {
                input: qualify(prefix, &input),
                valid: qualify(prefix, &self.valid_keys),
                unknown: qualify(prefix, &unknown),
            });
        }

        let missing: BTreeSet<String> = self.required_keys.difference(&input).cloned().collect();
        if !missing.is_empty() {
            return Err(OptionsError::Missing {
                required: qualify(prefix, &self.required_keys),
                missing: qualify(prefix, &missing),
            });
        }

        for (key, value) in values {
            let path = join_path(prefix, key);
            match (self.nested.get(key), value) {
                (Some(schema), OptionValue::Nested(inner)) => {
                    schema.check_values(inner, Some(&path))?
                }
                (Some(_), OptionValue::Value(_)) => {
                    return Err(OptionsError::NotNested { key: path })
                }
                (None, OptionValue::Nested(_)) => {
                    return Err(OptionsError::UnexpectedNested { key: path })
                }
                (None, OptionValue::Value(_)) => {}
            }
        }

        Ok(())
    }
}

impl<V: Clone> OptionsMap<V> {
    // ========================================================================
    // Schema definition
    // ========================================================================

    /// Returns a copy of this schema with `name` declared.
    ///
    /// `default: None` declares no default; `Some(v)` stores `v`, even when
    /// `v` is a null-like value. Redefining a key replaces its default,
    /// required flag and any nested schema.
    pub fn define(&self, name: impl Into<String>, default: Option<V>, required: bool) -> Self {
        let name = name.into();
        let mut copy = self.derive();

        copy.valid_keys.insert(name.clone());
        copy.nested.remove(&name);
        if required {
            copy.required_keys.insert(name.clone());
        } else {
            copy.required_keys.remove(&name);
        }
        match default {
            Some(value) => {
                copy.values.insert(name, OptionValue::Value(value));
            }
            None => {
                copy.values.remove(&name);
            }
        }
        copy
    }

    /// Declares an optional key without a default.
    pub fn optional(&self, name: impl Into<String>) -> Self {
        self.define(name, None, false)
    }

    /// Declares an optional key with a default.
    pub fn with_default(&self, name: impl Into<String>, default: V) -> Self {
        self.define(name, Some(default), false)
    }

    /// Declares a required key that callers must supply.
    pub fn required(&self, name: impl Into<String>) -> Self {
        self.define(name, None, true)
    }

    /// Declares a required key that is satisfied by its default.
    pub fn required_with_default(&self, name: impl Into<String>, default: V) -> Self {
        self.define(name, Some(default), true)
    }

    /// Returns a copy with `name` validated by `child`.
    ///
    /// The value under `name` starts as a copy of the child's defaults.
    pub fn nest(&self, name: impl Into<String>, child: &OptionsMap<V>) -> Self {
        let name = name.into();
        let mut copy = self.derive();

        copy.valid_keys.insert(name.clone());
        copy.required_keys.remove(&name);
        copy.values
            .insert(name.clone(), OptionValue::Nested(child.values.clone()));
        copy.nested.insert(name, child.derive());
        copy
    }

    /// Returns a copy with `user` values layered over the current ones.
    ///
    /// Top-level keys are replaced; keys with a nested schema are merged
    /// recursively so unspecified nested options keep their defaults.
    pub fn merge(&self, user: Options<V>) -> Self {
        let mut copy = self.derive();
        let mut values = std::mem::take(&mut copy.values);
        self.merge_into(&mut values, user);
        copy.values = values;
        copy
    }

    fn merge_into(&self, target: &mut Options<V>, incoming: Options<V>) {
        for (key, value) in incoming {
            let value = match (self.nested.get(&key), value) {
                (Some(schema), OptionValue::Nested(inner)) => {
                    if let Some(OptionValue::Nested(existing)) = target.get_mut(&key) {
                        schema.merge_into(existing, inner);
                        continue;
                    }
                    OptionValue::Nested(inner)
                }
                (_, value) => value,
            };
            target.insert(key, value);
        }
    }

    /// Derived schemas start unfrozen.
    fn derive(&self) -> Self {
        let mut copy = self.clone();
        copy.frozen = false;
        copy
    }
}

impl OptionsMap<Value> {
    /// Reads a boolean at `path`.
    pub fn bool_in(&self, path: &[&str]) -> Option<bool> {
        self.get_in(path).and_then(Value::as_bool)
    }

    /// Reads an unsigned integer at `path`.
    pub fn u64_in(&self, path: &[&str]) -> Option<u64> {
        self.get_in(path).and_then(Value::as_u64)
    }

    /// Reads a string at `path`.
    pub fn str_in(&self, path: &[&str]) -> Option<&str> {
        self.get_in(path).and_then(Value::as_str)
    }

    /// Converts a JSON document into an [`Options`] tree shaped by this
    /// schema.
    ///
    /// Objects become nested entries only under keys with a nested schema;
    /// elsewhere they stay plain `Value::Object`s.
    pub fn json_options(&self, value: Value) -> Options<Value> {
        self.conform(options_from_json(value))
    }

    /// Reshapes `user` so nested entries only appear under keys with a
    /// nested schema. Others are folded back into plain JSON objects.
    pub fn conform(&self, user: Options<Value>) -> Options<Value> {
        user.into_iter()
            .map(|(key, value)| {
                let value = match (self.nested.get(&key), value) {
                    (Some(schema), OptionValue::Nested(inner)) => {
                        OptionValue::Nested(schema.conform(inner))
                    }
                    (None, OptionValue::Nested(inner)) => OptionValue::Value(to_json(inner)),
                    (_, value) => value,
                };
                (key, value)
            })
            .collect()
    }
}

fn to_json(options: Options<Value>) -> Value {
    Value::Object(
        options
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    OptionValue::Value(v) => v,
                    OptionValue::Nested(inner) => to_json(inner),
                };
                (key, value)
            })
            .collect(),
    )
}

fn join_path(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, key),
        None => key.to_string(),
    }
}

fn qualify(prefix: Option<&str>, keys: &BTreeSet<String>) -> BTreeSet<String> {
    keys.iter().map(|k| join_path(prefix, k)).collect()
}

/// Implemented by anything that owns resolved options.
pub trait HasOptions<V = Value> {
    /// The owner's frozen options.
    fn options(&self) -> &OptionsMap<V>;

    /// Shorthand for `self.options().get(name)`.
    fn option(&self, name: &str) -> Option<&V> {
        self.options().get(name)
    }
}
