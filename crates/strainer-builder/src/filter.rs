//! Filters: query builders driven by a user-supplied value.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use strainer_options::{HasOptions, OptionsError, OptionsMap};
use tracing::trace;

use crate::builder::{QueryBuilder, Transform};
use crate::label::{humanize, lookup_key, Translate};
use crate::setting::{is_blank, is_present, Setting, Settings};
use crate::traits::{Conditional, Evaluatable, Named};

/// A query builder that narrows a scope by a user-supplied value.
///
/// On top of the base `if`/`unless` options a filter declares:
///
/// | Key | Required | Default | Meaning |
/// |-----|----------|---------|---------|
/// | `value` | yes | none | raw user input, `null` when absent |
/// | `sanitize` | yes | identity | cleans `value` before any use |
/// | `default` | no | none | fallback, static or computed from the context |
///
/// The transform receives the effective value: the sanitized value, or the
/// default when the sanitized value is blank. A filter only applies when the
/// effective value is present. When it ran only because of its default it
/// reports `is_applied() == false`, so callers can tell user filtering apart
/// from fallback filtering.
///
/// ```
/// use serde_json::{json, Value};
/// use strainer_builder::{Filter, Settings};
///
/// let mut filter = Filter::new(
///     "min",
///     Settings::new().value(Value::Null).default(1),
///     |_ctx: &(), scope: i64, value: &Value| scope + value.as_i64().unwrap_or(0),
/// )
/// .unwrap();
///
/// assert_eq!(filter.call(&(), 2), 3);
/// assert_eq!(filter.value(&()), json!(1));
/// assert!(!filter.is_applied());
/// ```
pub struct Filter<C, S> {
    inner: QueryBuilder<C, S>,
}

/// Namespace used for filter label lookups.
pub const FILTERS_NAMESPACE: &str = "filters";

impl<C: 'static, S: 'static> Filter<C, S> {
    /// The filter option schema, derived from [`QueryBuilder::schema`].
    pub fn schema() -> OptionsMap<Setting<C>> {
        QueryBuilder::<C, S>::schema()
            .required("value")
            .required_with_default("sanitize", Setting::sanitizer(|value| value))
            .optional("default")
    }

    /// Creates a filter. `settings` must include a `value`.
    pub fn new<F>(
        name: impl Into<String>,
        settings: Settings<C>,
        transform: F,
    ) -> Result<Self, OptionsError>
    where
        F: Fn(&C, S, &Value) -> S + 'static,
    {
        Self::with_args(name, settings, move |ctx: &C, scope: S, args: &[Value]| {
            match args.first() {
                Some(value) => transform(ctx, scope, value),
                None => transform(ctx, scope, &Value::Null),
            }
        })
    }

    /// Creates a filter whose transform receives the effective value first,
    /// followed by the arguments passed to [`call_with`](Filter::call_with).
    pub fn with_args<F>(
        name: impl Into<String>,
        settings: Settings<C>,
        transform: F,
    ) -> Result<Self, OptionsError>
    where
        F: Fn(&C, S, &[Value]) -> S + 'static,
    {
        let transform: Transform<C, S> = Rc::new(transform);
        let inner = QueryBuilder::with_schema(&Self::schema(), name, settings, transform)?;
        Ok(Self { inner })
    }
}

impl<C, S> Filter<C, S> {
    /// The filter's name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Whether the filter ran on a user-supplied (not default) value.
    pub fn is_applied(&self) -> bool {
        self.inner.is_applied()
    }

    /// The raw `value` option.
    pub fn raw_value(&self, ctx: &C) -> Value {
        self.inner.evaluate_with("value", ctx).unwrap_or(Value::Null)
    }

    /// The raw value after `sanitize`.
    pub fn sanitized_value(&self, ctx: &C) -> Value {
        let raw = self.raw_value(ctx);
        match self.inner.setting("sanitize") {
            Some(sanitize) => sanitize.sanitize(raw),
            None => raw,
        }
    }

    /// The `default` option, evaluated against `ctx` when it is computed.
    pub fn default_value(&self, ctx: &C) -> Value {
        self.inner.evaluate_with("default", ctx).unwrap_or(Value::Null)
    }

    /// The value the transform receives.
    ///
    /// The sanitized value when present, otherwise the default (`null` when
    /// there is none). The default is only evaluated in the fallback case.
    pub fn value(&self, ctx: &C) -> Value {
        resolve(self.sanitized_value(ctx), || self.default_value(ctx))
    }

    /// Passes `if`/`unless`.
    pub fn render_check(&self, ctx: &C) -> bool {
        self.inner.render_check(ctx)
    }

    /// Passes `if`/`unless` and has a present effective value.
    pub fn should_apply(&self, ctx: &C) -> bool {
        self.inner.should_apply(ctx) && is_present(&self.value(ctx))
    }

    /// Applies the filter to `scope`.
    ///
    /// When the transform only ran because of the default, `is_applied`
    /// is forced back to `false`.
    pub fn call(&mut self, ctx: &C, scope: S) -> S {
        self.call_with(ctx, scope, &[])
    }

    /// [`call`](Filter::call), handing `extra` to the transform after the
    /// effective value.
    pub fn call_with(&mut self, ctx: &C, scope: S, extra: &[Value]) -> S {
        let sanitized = self.sanitized_value(ctx);
        let user_supplied = is_present(&sanitized);
        let value = resolve(sanitized, || self.default_value(ctx));
        trace!(filter = %self.name(), %value, user_supplied, "resolved filter value");

        let apply = self.inner.should_apply(ctx) && is_present(&value);
        let mut args = Vec::with_capacity(extra.len() + 1);
        args.push(value);
        args.extend_from_slice(extra);
        let scope = self.inner.apply_if(apply, ctx, scope, &args);

        if self.inner.is_applied() && !user_supplied {
            self.inner.reset_applied();
        }
        scope
    }

    /// Lookup key for the label: `filters.<name>`.
    pub fn lookup_key(&self) -> String {
        lookup_key(FILTERS_NAMESPACE, self.name())
    }

    /// Display label, humanized name as the fallback.
    pub fn label(&self, translator: &dyn Translate) -> String {
        translator.lookup(FILTERS_NAMESPACE, self.name(), &humanize(self.name()))
    }

    /// Input placeholder, empty when the translator has none.
    pub fn placeholder(&self, translator: &dyn Translate) -> String {
        let key = format!("{}.placeholder", self.name());
        translator.lookup(FILTERS_NAMESPACE, &key, "")
    }

    /// The underlying query builder.
    pub fn builder(&self) -> &QueryBuilder<C, S> {
        &self.inner
    }
}

fn resolve(sanitized: Value, default: impl FnOnce() -> Value) -> Value {
    if is_blank(&sanitized) {
        default()
    } else {
        sanitized
    }
}

impl<C, S> Clone for Filter<C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C, S> fmt::Debug for Filter<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("inner", &self.inner).finish()
    }
}

impl<C, S> HasOptions<Setting<C>> for Filter<C, S> {
    fn options(&self) -> &OptionsMap<Setting<C>> {
        self.inner.options()
    }
}

impl<C, S> Named for Filter<C, S> {
    fn name(&self) -> &str {
        Filter::name(self)
    }

    fn is_applied(&self) -> bool {
        Filter::is_applied(self)
    }
}

impl<C, S> Conditional<C> for Filter<C, S> {
    fn render_check(&self, ctx: &C) -> bool {
        Filter::render_check(self, ctx)
    }

    fn should_apply(&self, ctx: &C) -> bool {
        Filter::should_apply(self, ctx)
    }
}

impl<C, S> Evaluatable<C, S> for Filter<C, S> {
    fn call(&mut self, ctx: &C, scope: S) -> S {
        Filter::call(self, ctx, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn plus(_: &(), scope: i64, value: &Value) -> i64 {
        scope + value.as_i64().unwrap_or(0)
    }

    fn concat(_: &(), scope: String, value: &Value) -> String {
        format!("{}{}", scope, value.as_str().unwrap_or(""))
    }

    #[test]
    fn default_fills_in_but_does_not_count_as_applied() {
        let mut filter =
            Filter::new("n", Settings::new().value(Value::Null).default(1), plus).unwrap();

        assert_eq!(filter.call(&(), 2), 3);
        assert_eq!(filter.value(&()), json!(1));
        assert!(!filter.is_applied());
    }

    #[test]
    fn extra_args_follow_the_value() {
        let mut filter = Filter::with_args(
            "range",
            Settings::new().value(3),
            |_: &(), scope: Vec<Value>, args: &[Value]| {
                let mut scope = scope;
                scope.extend_from_slice(args);
                scope
            },
        )
        .unwrap();

        assert_eq!(
            filter.call_with(&(), vec![], &[json!("asc"), json!(10)]),
            vec![json!(3), json!("asc"), json!(10)]
        );
        assert!(filter.is_applied());
        assert_eq!(filter.call(&(), vec![]), vec![json!(3)]);
    }

    #[test]
    fn user_value_counts_as_applied() {
        let mut filter = Filter::new("n", Settings::new().value(5).default(1), plus).unwrap();

        assert_eq!(filter.call(&(), 2), 7);
        assert_eq!(filter.value(&()), json!(5));
        assert!(filter.is_applied());
    }

    #[test]
    fn sanitized_to_blank_skips_application() {
        let mut filter = Filter::new(
            "s",
            Settings::new().value("x").sanitize(|value| match value {
                Value::String(mut s) => {
                    s.pop();
                    Value::String(s)
                }
                other => other,
            }),
            concat,
        )
        .unwrap();

        assert_eq!(filter.call(&(), "y".to_string()), "y");
        assert_eq!(filter.value(&()), Value::Null);
        assert!(!filter.is_applied());
    }

    #[test]
    fn blank_without_default_is_not_applied() {
        let mut filter = Filter::new("n", Settings::new().value(""), plus).unwrap();

        assert!(!filter.should_apply(&()));
        assert_eq!(filter.call(&(), 2), 2);
        assert!(!filter.is_applied());
    }

    #[test]
    fn value_option_is_required() {
        let err = Filter::new("n", Settings::new(), plus).unwrap_err();
        match err {
            OptionsError::Missing { missing, .. } => assert!(missing.contains("value")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn computed_default_is_lazy() {
        struct Ctx {
            calls: Cell<u32>,
        }

        let mut filter = Filter::new(
            "n",
            Settings::new().value(4).default_with(|ctx: &Ctx| {
                ctx.calls.set(ctx.calls.get() + 1);
                json!(10)
            }),
            |_: &Ctx, scope: i64, value: &Value| scope + value.as_i64().unwrap_or(0),
        )
        .unwrap();

        let ctx = Ctx {
            calls: Cell::new(0),
        };
        assert_eq!(filter.call(&ctx, 0), 4);
        assert_eq!(ctx.calls.get(), 0);
    }

    #[test]
    fn computed_default_reads_context() {
        struct Ctx {
            fallback: i64,
        }

        let mut filter = Filter::new(
            "n",
            Settings::new()
                .value(Value::Null)
                .default_with(|ctx: &Ctx| json!(ctx.fallback)),
            |_: &Ctx, scope: i64, value: &Value| scope + value.as_i64().unwrap_or(0),
        )
        .unwrap();

        let ctx = Ctx { fallback: 7 };
        assert_eq!(filter.value(&ctx), json!(7));
        assert_eq!(filter.call(&ctx, 1), 8);
        assert!(!filter.is_applied());
    }

    #[test]
    fn hidden_filter_never_applies() {
        let mut filter = Filter::new(
            "n",
            Settings::new().value(3).when(|_: &()| false),
            plus,
        )
        .unwrap();

        assert!(!filter.render_check(&()));
        assert_eq!(filter.call(&(), 1), 1);
        assert!(!filter.is_applied());
    }

    #[test]
    fn sanitize_runs_before_transform() {
        let mut filter = Filter::new(
            "q",
            Settings::new()
                .value("  Rust ")
                .sanitize(|value| match value {
                    Value::String(s) => Value::String(s.trim().to_lowercase()),
                    other => other,
                }),
            concat,
        )
        .unwrap();

        assert_eq!(filter.raw_value(&()), json!("  Rust "));
        assert_eq!(filter.call(&(), "lang:".to_string()), "lang:rust");
        assert!(filter.is_applied());
    }

    #[test]
    fn labels_and_keys() {
        let filter = Filter::new("created_at", Settings::new().value(Value::Null), plus).unwrap();

        assert_eq!(filter.lookup_key(), "filters.created_at");
        assert_eq!(filter.label(&crate::Humanize), "Created at");
        assert_eq!(filter.placeholder(&crate::Humanize), "");

        let translator = |_: &str, key: &str, default: &str| match key {
            "created_at.placeholder" => "YYYY-MM-DD".to_string(),
            _ => default.to_string(),
        };
        assert_eq!(filter.placeholder(&translator), "YYYY-MM-DD");
    }
}
