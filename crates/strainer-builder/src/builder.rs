//! The query builder atom.
//!
//! A [`QueryBuilder`] is one named, optionally conditional step that
//! transforms an opaque scope value. It remembers whether it ran.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use strainer_options::{HasOptions, OptionsError, OptionsMap};
use tracing::debug;

use crate::setting::{Setting, Settings};
use crate::traits::{Conditional, Evaluatable, Named};

/// The transform run by a query builder: `(context, scope, extra args) -> scope`.
pub type Transform<C, S> = Rc<dyn Fn(&C, S, &[Value]) -> S>;

/// A named, conditionally applied scope transformation.
///
/// The schema declares `if` (default: always true) and `unless` (default:
/// always false). Both are evaluated against the context passed to
/// [`render_check`](Self::render_check) and [`call`](Self::call).
///
/// # Example
///
/// ```
/// use strainer_builder::{QueryBuilder, Settings};
///
/// struct Ctx { enabled: bool }
///
/// let mut add_one = QueryBuilder::new(
///     "add_one",
///     Settings::new().when(|ctx: &Ctx| ctx.enabled),
///     |_ctx, scope: i64, _args| scope + 1,
/// )
/// .unwrap();
///
/// assert_eq!(add_one.call(&Ctx { enabled: false }, 1, &[]), 1);
/// assert!(!add_one.is_applied());
///
/// assert_eq!(add_one.call(&Ctx { enabled: true }, 1, &[]), 2);
/// assert!(add_one.is_applied());
/// ```
pub struct QueryBuilder<C, S> {
    name: String,
    transform: Transform<C, S>,
    options: OptionsMap<Setting<C>>,
    applied: bool,
}

impl<C: 'static, S: 'static> QueryBuilder<C, S> {
    /// The option schema shared by every query builder.
    pub fn schema() -> OptionsMap<Setting<C>> {
        OptionsMap::new()
            .required_with_default("if", Setting::predicate(|_: &C| true))
            .required_with_default("unless", Setting::predicate(|_: &C| false))
    }

    /// Creates a builder validated against [`schema`](Self::schema).
    pub fn new<F>(
        name: impl Into<String>,
        settings: Settings<C>,
        transform: F,
    ) -> Result<Self, OptionsError>
    where
        F: Fn(&C, S, &[Value]) -> S + 'static,
    {
        Self::with_schema(&Self::schema(), name, settings, Rc::new(transform))
    }

    /// Creates a builder validated against a derived schema.
    ///
    /// Specialized builders extend [`schema`](Self::schema) with their own
    /// keys and construct through here.
    pub fn with_schema(
        schema: &OptionsMap<Setting<C>>,
        name: impl Into<String>,
        settings: Settings<C>,
        transform: Transform<C, S>,
    ) -> Result<Self, OptionsError> {
        let name = name.into();
        let options = schema.merge(settings.into_options()).validate()?.freeze();
        Ok(Self {
            name,
            transform,
            options,
            applied: false,
        })
    }
}

impl<C, S> QueryBuilder<C, S> {
    /// The builder's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the transform has run.
    ///
    /// Stays `true` for the rest of the builder's life once set, except where
    /// a specialization resets it.
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    pub(crate) fn reset_applied(&mut self) {
        self.applied = false;
    }

    /// The option stored under `key`.
    pub fn setting(&self, key: &str) -> Option<&Setting<C>> {
        self.options.get(key)
    }

    /// Evaluates the option stored under `key` against `ctx`.
    ///
    /// This is how `if`, `unless`, `default` and other context-dependent
    /// options see the caller's state.
    pub fn evaluate_with(&self, key: &str, ctx: &C) -> Option<Value> {
        self.setting(key).and_then(|setting| setting.evaluate(ctx))
    }

    fn test(&self, key: &str, ctx: &C, fallback: bool) -> bool {
        self.setting(key)
            .map(|setting| setting.test(ctx))
            .unwrap_or(fallback)
    }

    /// `if` holds and `unless` does not.
    pub fn render_check(&self, ctx: &C) -> bool {
        self.test("if", ctx, true) && !self.test("unless", ctx, false)
    }

    /// Defaults to [`render_check`](Self::render_check).
    pub fn should_apply(&self, ctx: &C) -> bool {
        self.render_check(ctx)
    }

    /// Runs the transform when [`should_apply`](Self::should_apply) holds.
    pub fn call(&mut self, ctx: &C, scope: S, args: &[Value]) -> S {
        let apply = self.should_apply(ctx);
        self.apply_if(apply, ctx, scope, args)
    }

    /// Runs the transform when `apply` is set, marking the builder applied.
    pub(crate) fn apply_if(&mut self, apply: bool, ctx: &C, scope: S, args: &[Value]) -> S {
        if !apply {
            debug!(builder = %self.name, "skipping query builder");
            return scope;
        }
        debug!(builder = %self.name, "applying query builder");
        self.applied = true;
        (self.transform)(ctx, scope, args)
    }
}

impl<C, S> Clone for QueryBuilder<C, S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            transform: Rc::clone(&self.transform),
            options: self.options.clone(),
            applied: self.applied,
        }
    }
}

impl<C, S> fmt::Debug for QueryBuilder<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("name", &self.name)
            .field("options", &self.options.values().keys().collect::<Vec<_>>())
            .field("applied", &self.applied)
            .finish()
    }
}

impl<C, S> HasOptions<Setting<C>> for QueryBuilder<C, S> {
    fn options(&self) -> &OptionsMap<Setting<C>> {
        &self.options
    }
}

impl<C, S> Named for QueryBuilder<C, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_applied(&self) -> bool {
        self.applied
    }
}

impl<C, S> Conditional<C> for QueryBuilder<C, S> {
    fn render_check(&self, ctx: &C) -> bool {
        QueryBuilder::render_check(self, ctx)
    }
}

impl<C, S> Evaluatable<C, S> for QueryBuilder<C, S> {
    fn call(&mut self, ctx: &C, scope: S) -> S {
        QueryBuilder::call(self, ctx, scope, &[])
    }
}
