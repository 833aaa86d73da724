//! Option values for query builders.
//!
//! Query builder options mix plain data (`value`, `affects_query`) with
//! functions evaluated against the caller's context (`if`, `unless`,
//! `default`) or applied to user input (`sanitize`). [`Setting`] carries
//! either kind, and [`Settings`] is the builder used to configure an atom.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use strainer_options::{OptionValue, Options};

/// Predicate evaluated against the context.
pub type Predicate<C> = Rc<dyn Fn(&C) -> bool>;

/// Function applied to a raw user value.
pub type Sanitizer = Rc<dyn Fn(Value) -> Value>;

/// Value computed lazily from the context.
pub type Compute<C> = Rc<dyn Fn(&C) -> Value>;

/// A single query builder option value.
pub enum Setting<C> {
    /// Plain data.
    Value(Value),
    /// A boolean function of the context.
    Predicate(Predicate<C>),
    /// A value-to-value function.
    Sanitizer(Sanitizer),
    /// A value computed from the context when needed.
    Compute(Compute<C>),
}

impl<C> Setting<C> {
    /// Wraps plain data.
    pub fn value(value: impl Into<Value>) -> Self {
        Setting::Value(value.into())
    }

    /// Wraps a predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        Setting::Predicate(Rc::new(f))
    }

    /// Wraps a sanitizer.
    pub fn sanitizer<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + 'static,
    {
        Setting::Sanitizer(Rc::new(f))
    }

    /// Wraps a lazily computed value.
    pub fn compute<F>(f: F) -> Self
    where
        F: Fn(&C) -> Value + 'static,
    {
        Setting::Compute(Rc::new(f))
    }

    /// Returns the plain data, if this setting is data.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Setting::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Produces this setting's value for `ctx`.
    ///
    /// Data is cloned, computed values are evaluated, predicates yield a
    /// boolean. Sanitizers have no value of their own and yield `None`.
    pub fn evaluate(&self, ctx: &C) -> Option<Value> {
        match self {
            Setting::Value(v) => Some(v.clone()),
            Setting::Compute(f) => Some(f(ctx)),
            Setting::Predicate(f) => Some(Value::Bool(f(ctx))),
            Setting::Sanitizer(_) => None,
        }
    }

    /// Evaluates this setting as a condition.
    ///
    /// Data and computed values count as true unless they are `false` or
    /// `null`.
    pub fn test(&self, ctx: &C) -> bool {
        match self {
            Setting::Predicate(f) => f(ctx),
            Setting::Value(v) => truthy(v),
            Setting::Compute(f) => truthy(&f(ctx)),
            Setting::Sanitizer(_) => true,
        }
    }

    /// Runs `value` through this setting if it is a sanitizer.
    ///
    /// Any other kind of setting leaves the value as is.
    pub fn sanitize(&self, value: Value) -> Value {
        match self {
            Setting::Sanitizer(f) => f(value),
            _ => value,
        }
    }
}

impl<C> Clone for Setting<C> {
    fn clone(&self) -> Self {
        match self {
            Setting::Value(v) => Setting::Value(v.clone()),
            Setting::Predicate(f) => Setting::Predicate(Rc::clone(f)),
            Setting::Sanitizer(f) => Setting::Sanitizer(Rc::clone(f)),
            Setting::Compute(f) => Setting::Compute(Rc::clone(f)),
        }
    }
}

impl<C> fmt::Debug for Setting<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Setting::Predicate(_) => f.write_str("Predicate(<fn>)"),
            Setting::Sanitizer(_) => f.write_str("Sanitizer(<fn>)"),
            Setting::Compute(_) => f.write_str("Compute(<fn>)"),
        }
    }
}

impl<C> From<Value> for Setting<C> {
    fn from(value: Value) -> Self {
        Setting::Value(value)
    }
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Returns `true` for values that count as "not supplied".
///
/// `null`, empty or whitespace-only strings, empty arrays and empty objects
/// are blank. Numbers and booleans never are.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Negation of [`is_blank`].
pub fn is_present(value: &Value) -> bool {
    !is_blank(value)
}

/// Builder for the options passed to a query builder.
///
/// ```
/// use serde_json::{json, Value};
/// use strainer_builder::Settings;
///
/// struct Ctx { admin: bool }
///
/// let settings = Settings::<Ctx>::new()
///     .value(json!(" pending "))
///     .sanitize(|v| match v {
///         Value::String(s) => Value::String(s.trim().to_string()),
///         other => other,
///     })
///     .when(|ctx| ctx.admin);
/// assert_eq!(settings.len(), 3);
/// ```
pub struct Settings<C> {
    entries: Options<Setting<C>>,
}

impl<C> Settings<C> {
    /// Creates an empty set of settings.
    pub fn new() -> Self {
        Self {
            entries: Options::new(),
        }
    }

    /// Sets an arbitrary key.
    ///
    /// Keys the builder's schema does not declare are rejected when the
    /// builder is constructed.
    pub fn set(mut self, key: impl Into<String>, setting: Setting<C>) -> Self {
        self.entries.insert(key.into(), OptionValue::Value(setting));
        self
    }

    /// Only render and apply when `f` returns `true` (the `if` option).
    pub fn when<F>(self, f: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.set("if", Setting::predicate(f))
    }

    /// Never render or apply when `f` returns `true`.
    pub fn unless<F>(self, f: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.set("unless", Setting::predicate(f))
    }

    /// The raw, user-supplied filter value. Pass `Value::Null` when absent.
    pub fn value(self, value: impl Into<Value>) -> Self {
        self.set("value", Setting::value(value))
    }

    /// Cleans the filter value before use.
    pub fn sanitize<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + 'static,
    {
        self.set("sanitize", Setting::sanitizer(f))
    }

    /// Static fallback used when the sanitized value is blank.
    pub fn default(self, value: impl Into<Value>) -> Self {
        self.set("default", Setting::value(value))
    }

    /// Fallback computed from the context, only when it is needed.
    pub fn default_with<F>(self, f: F) -> Self
    where
        F: Fn(&C) -> Value + 'static,
    {
        self.set("default", Setting::compute(f))
    }

    /// Whether a column changes the scope.
    pub fn affects_query(self, affects: bool) -> Self {
        self.set("affects_query", Setting::value(affects))
    }

    /// Number of keys set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no key is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` has been set.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Consumes the builder, returning the raw option tree.
    pub fn into_options(self) -> Options<Setting<C>> {
        self.entries
    }
}

impl<C> Default for Settings<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for Settings<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<C> fmt::Debug for Settings<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Ctx {
        flag: bool,
    }

    #[test]
    fn blank_values() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!("   ")));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));

        assert!(is_present(&json!("x")));
        assert!(is_present(&json!(0)));
        assert!(is_present(&json!(false)));
        assert!(is_present(&json!([null])));
    }

    #[test]
    fn evaluate_by_kind() {
        let ctx = Ctx { flag: true };

        assert_eq!(Setting::<Ctx>::value(3).evaluate(&ctx), Some(json!(3)));
        assert_eq!(
            Setting::compute(|c: &Ctx| json!(c.flag)).evaluate(&ctx),
            Some(json!(true))
        );
        assert_eq!(
            Setting::predicate(|c: &Ctx| !c.flag).evaluate(&ctx),
            Some(json!(false))
        );
        assert_eq!(Setting::<Ctx>::sanitizer(|v| v).evaluate(&ctx), None);
    }

    #[test]
    fn test_treats_null_and_false_as_false() {
        let ctx = Ctx { flag: false };

        assert!(!Setting::<Ctx>::value(Value::Null).test(&ctx));
        assert!(!Setting::<Ctx>::value(false).test(&ctx));
        assert!(Setting::<Ctx>::value(0).test(&ctx));
        assert!(!Setting::predicate(|c: &Ctx| c.flag).test(&ctx));
    }

    #[test]
    fn sanitize_only_applies_sanitizers() {
        let upper = Setting::<Ctx>::sanitizer(|v| match v {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        });
        assert_eq!(upper.sanitize(json!("abc")), json!("ABC"));
        assert_eq!(Setting::<Ctx>::value(1).sanitize(json!("abc")), json!("abc"));
    }

    #[test]
    fn settings_builder_collects_keys() {
        let options = Settings::<Ctx>::new()
            .value(Value::Null)
            .default(1)
            .when(|c| c.flag)
            .into_options();

        let keys: Vec<&str> = options.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["default", "if", "value"]);
    }

    #[test]
    fn later_setting_replaces_earlier() {
        let settings = Settings::<Ctx>::new().default(1).default_with(|_| json!(2));
        assert_eq!(settings.len(), 1);

        let options = settings.into_options();
        let ctx = Ctx { flag: false };
        let default = options["default"].as_value().unwrap();
        assert_eq!(default.evaluate(&ctx), Some(json!(2)));
    }
}
