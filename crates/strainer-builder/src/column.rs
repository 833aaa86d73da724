//! Columns: query builders that can opt out of touching the scope.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use strainer_options::{HasOptions, OptionsError, OptionsMap};

use crate::builder::{QueryBuilder, Transform};
use crate::label::{humanize, lookup_key, Translate};
use crate::setting::{Setting, Settings};
use crate::traits::{Conditional, Evaluatable, Named};

/// Namespace used for column label lookups.
pub const COLUMNS_NAMESPACE: &str = "columns";

/// A query builder listed as a table column.
///
/// Columns declare `affects_query` (default `true`). A column with
/// `affects_query: false` is still enumerated and rendered but never runs
/// its transform, so it never becomes applied.
pub struct Column<C, S> {
    inner: QueryBuilder<C, S>,
}

impl<C: 'static, S: 'static> Column<C, S> {
    /// The column option schema, derived from [`QueryBuilder::schema`].
    pub fn schema() -> OptionsMap<Setting<C>> {
        QueryBuilder::<C, S>::schema().required_with_default("affects_query", Setting::value(true))
    }

    /// Creates a column whose transform adjusts the scope (selects, joins,
    /// ordering).
    pub fn new<F>(
        name: impl Into<String>,
        settings: Settings<C>,
        transform: F,
    ) -> Result<Self, OptionsError>
    where
        F: Fn(&C, S) -> S + 'static,
    {
        Self::with_args(name, settings, move |ctx: &C, scope: S, _args: &[Value]| {
            transform(ctx, scope)
        })
    }

    /// Creates a column whose transform also receives the arguments passed
    /// to [`call_with`](Column::call_with).
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

    /// Creates a presentation-only column (e.g. an actions column).
    pub fn presentational(
        name: impl Into<String>,
        settings: Settings<C>,
    ) -> Result<Self, OptionsError> {
        Self::new(name, settings.affects_query(false), |_, scope| scope)
    }
}

impl<C, S> Column<C, S> {
    /// The column's name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Whether the transform has run.
    pub fn is_applied(&self) -> bool {
        self.inner.is_applied()
    }

    /// The `affects_query` option.
    pub fn affects_query(&self) -> bool {
        self.inner
            .setting("affects_query")
            .and_then(Setting::as_value)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Passes `if`/`unless`.
    pub fn render_check(&self, ctx: &C) -> bool {
        self.inner.render_check(ctx)
    }

    /// `affects_query` and the base condition.
    pub fn should_apply(&self, ctx: &C) -> bool {
        self.affects_query() && self.inner.should_apply(ctx)
    }

    /// Applies the column's transform to `scope` when it should.
    pub fn call(&mut self, ctx: &C, scope: S) -> S {
        self.call_with(ctx, scope, &[])
    }

    /// [`call`](Column::call), handing `args` to the transform.
    pub fn call_with(&mut self, ctx: &C, scope: S, args: &[Value]) -> S {
        let apply = self.should_apply(ctx);
        self.inner.apply_if(apply, ctx, scope, args)
    }

    /// Lookup key for the header label: `columns.<name>`.
    pub fn lookup_key(&self) -> String {
        lookup_key(COLUMNS_NAMESPACE, self.name())
    }

    /// Header label, humanized name as the fallback.
    pub fn label(&self, translator: &dyn Translate) -> String {
        translator.lookup(COLUMNS_NAMESPACE, self.name(), &humanize(self.name()))
    }

    /// The underlying query builder.
    pub fn builder(&self) -> &QueryBuilder<C, S> {
        &self.inner
    }
}

impl<C, S> Clone for Column<C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C, S> fmt::Debug for Column<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("inner", &self.inner)
            .field("affects_query", &self.affects_query())
            .finish()
    }
}

impl<C, S> HasOptions<Setting<C>> for Column<C, S> {
    fn options(&self) -> &OptionsMap<Setting<C>> {
        self.inner.options()
    }
}

impl<C, S> Named for Column<C, S> {
    fn name(&self) -> &str {
        Column::name(self)
    }

    fn is_applied(&self) -> bool {
        Column::is_applied(self)
    }
}

impl<C, S> Conditional<C> for Column<C, S> {
    fn render_check(&self, ctx: &C) -> bool {
        Column::render_check(self, ctx)
    }

    fn should_apply(&self, ctx: &C) -> bool {
        Column::should_apply(self, ctx)
    }
}

impl<C, S> Evaluatable<C, S> for Column<C, S> {
    fn call(&mut self, ctx: &C, scope: S) -> S {
        Column::call(self, ctx, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(name: &'static str) -> impl Fn(&(), Vec<&'static str>) -> Vec<&'static str> {
        move |_: &(), mut scope: Vec<&'static str>| {
            scope.push(name);
            scope
        }
    }

    #[test]
    fn affecting_column_applies() {
        let mut column = Column::new("name", Settings::new(), select("name")).unwrap();

        assert!(column.affects_query());
        assert_eq!(column.call(&(), vec![]), vec!["name"]);
        assert!(column.is_applied());
    }

    #[test]
    fn column_args_reach_the_transform() {
        let mut column = Column::with_args(
            "title",
            Settings::new(),
            |_: &(), mut scope: Vec<String>, args: &[Value]| {
                let direction = args.first().and_then(Value::as_str).unwrap_or("asc");
                scope.push(format!("order title {direction}"));
                scope
            },
        )
        .unwrap();

        assert_eq!(
            column.call_with(&(), vec![], &[Value::from("desc")]),
            vec!["order title desc"]
        );
        assert_eq!(column.call(&(), vec![]), vec!["order title asc"]);
    }

    #[test]
    fn args_are_ignored_by_plain_columns() {
        let mut column = Column::new("name", Settings::new(), select("name")).unwrap();

        assert_eq!(
            column.call_with(&(), vec![], &[Value::from("ignored")]),
            vec!["name"]
        );
    }

    #[test]
    fn non_affecting_column_leaves_scope() {
        let mut column = Column::new(
            "actions",
            Settings::new().affects_query(false),
            select("actions"),
        )
        .unwrap();

        assert!(column.render_check(&()));
        assert!(!column.should_apply(&()));
        assert_eq!(column.call(&(), vec!["id"]), vec!["id"]);
        assert!(!column.is_applied());
    }

    #[test]
    fn presentational_column() {
        let mut column: Column<(), Vec<&str>> =
            Column::presentational("actions", Settings::new()).unwrap();

        assert!(!column.affects_query());
        assert_eq!(column.call(&(), vec!["id"]), vec!["id"]);
        assert!(!column.is_applied());
    }

    #[test]
    fn hidden_column_is_not_rendered() {
        let column = Column::new(
            "secret",
            Settings::new().unless(|_: &()| true),
            select("secret"),
        )
        .unwrap();

        assert!(!column.render_check(&()));
    }

    #[test]
    fn column_rejects_filter_options() {
        let err = Column::new("name", Settings::new().value(1), select("name")).unwrap_err();
        assert!(matches!(err, OptionsError::Unknown { .. }));
    }

    #[test]
    fn label_uses_columns_namespace() {
        let column = Column::new("created_at", Settings::new(), select("created_at")).unwrap();
        let translator = |namespace: &str, key: &str, default: &str| {
            if namespace == COLUMNS_NAMESPACE && key == "created_at" {
                "Created".to_string()
            } else {
                default.to_string()
            }
        };

        assert_eq!(column.lookup_key(), "columns.created_at");
        assert_eq!(column.label(&translator), "Created");
        assert_eq!(column.label(&crate::Humanize), "Created at");
    }
}
