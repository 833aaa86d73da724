//! Ordered collections of query builders.
//!
//! A [`QueryBuilderSet`] applies its builders as a left fold: each builder
//! receives the previous builder's output. Insertion order is application
//! order and is never changed.

use std::slice;

use serde_json::Value;
use strainer_options::{HasOptions, Options, OptionsError, OptionsMap};
use tracing::debug;

use crate::traits::{Conditional, Evaluatable, Named};

/// An ordered set of query builders with set-level options.
///
/// Subsets (`slice`, `except`, `renderable`, `applied`) are new sets holding
/// clones of the selected builders in their original order, along with this
/// set's options.
///
/// ```
/// use strainer_builder::{QueryBuilder, QueryBuilderSet, Settings};
///
/// let add_one = QueryBuilder::new("add_one", Settings::new(), |_: &(), s: i64, _| s + 1).unwrap();
/// let double = QueryBuilder::new("double", Settings::new(), |_: &(), s: i64, _| s * 2).unwrap();
///
/// let mut set: QueryBuilderSet<_> = vec![add_one, double].into_iter().collect();
/// assert_eq!(set.call(&(), 2), 6);
/// assert_eq!(set.applied().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilderSet<B> {
    builders: Vec<B>,
    options: OptionsMap<Value>,
}

impl<B> Default for QueryBuilderSet<B> {
    fn default() -> Self {
        Self {
            builders: Vec::new(),
            options: OptionsMap::new().freeze(),
        }
    }
}

impl<B> QueryBuilderSet<B> {
    /// Creates an empty set without options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set whose options are `user` validated against
    /// `schema`.
    pub fn with_options(
        schema: &OptionsMap<Value>,
        user: Options<Value>,
    ) -> Result<Self, OptionsError> {
        Ok(Self {
            builders: Vec::new(),
            options: schema.merge(user).validate()?.freeze(),
        })
    }

    /// Appends a builder; it will be applied after all current builders.
    pub fn push(&mut self, builder: B) {
        self.builders.push(builder);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, builder: B) -> Self {
        self.push(builder);
        self
    }

    /// Number of builders.
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Returns `true` if the set holds no builders.
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Returns `true` if any builder satisfies `f`.
    pub fn any<F>(&self, f: F) -> bool
    where
        F: FnMut(&B) -> bool,
    {
        self.builders.iter().any(f)
    }

    /// Iterates in application order.
    pub fn iter(&self) -> slice::Iter<'_, B> {
        self.builders.iter()
    }

    /// Iterates mutably in application order.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, B> {
        self.builders.iter_mut()
    }

    /// The builders as a slice, in application order.
    pub fn as_slice(&self) -> &[B] {
        &self.builders
    }

    /// Consumes the set, returning its builders in application order.
    pub fn into_vec(self) -> Vec<B> {
        self.builders
    }

    fn subset<F>(&self, keep: F) -> Self
    where
        B: Clone,
        F: Fn(&B) -> bool,
    {
        Self {
            builders: self.builders.iter().filter(|b| keep(b)).cloned().collect(),
            options: self.options.clone(),
        }
    }
}

impl<B: Named> QueryBuilderSet<B> {
    /// First builder named `name`.
    pub fn lookup(&self, name: &str) -> Option<&B> {
        self.builders.iter().find(|b| b.name() == name)
    }

    /// First builder named `name`, mutably.
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut B> {
        self.builders.iter_mut().find(|b| b.name() == name)
    }

    /// Names in application order.
    pub fn names(&self) -> Vec<&str> {
        self.builders.iter().map(Named::name).collect()
    }

    /// Returns `true` if any builder is applied.
    pub fn any_applied(&self) -> bool {
        self.builders.iter().any(Named::is_applied)
    }

    /// Builders whose name is listed, in the set's order.
    pub fn slice<I, N>(&self, names: I) -> Self
    where
        B: Clone,
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let names = collect_names(names);
        self.subset(|b| names.iter().any(|n| n == b.name()))
    }

    /// Builders whose name is not listed, in the set's order.
    pub fn except<I, N>(&self, names: I) -> Self
    where
        B: Clone,
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let names = collect_names(names);
        self.subset(|b| !names.iter().any(|n| n == b.name()))
    }

    /// Builders that ran during the last evaluation pass.
    ///
    /// Only meaningful after [`call`](Self::call).
    pub fn applied(&self) -> Self
    where
        B: Clone,
    {
        self.subset(Named::is_applied)
    }

    /// Builders whose `if`/`unless` pass for `ctx`.
    pub fn renderable<C>(&self, ctx: &C) -> Self
    where
        B: Conditional<C> + Clone,
    {
        self.subset(|b| b.render_check(ctx))
    }

    /// Folds `scope` through every builder in order.
    pub fn call<C, S>(&mut self, ctx: &C, scope: S) -> S
    where
        B: Evaluatable<C, S>,
    {
        debug!(builders = self.builders.len(), "evaluating query builder set");
        self.builders
            .iter_mut()
            .fold(scope, |scope, builder| builder.call(ctx, scope))
    }
}

fn collect_names<I, N>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    names.into_iter().map(|n| n.as_ref().to_string()).collect()
}

impl<B> HasOptions for QueryBuilderSet<B> {
    fn options(&self) -> &OptionsMap<Value> {
        &self.options
    }
}

impl<B> FromIterator<B> for QueryBuilderSet<B> {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        Self {
            builders: iter.into_iter().collect(),
            options: OptionsMap::new().freeze(),
        }
    }
}

impl<B> Extend<B> for QueryBuilderSet<B> {
    fn extend<I: IntoIterator<Item = B>>(&mut self, iter: I) {
        self.builders.extend(iter);
    }
}

impl<B> IntoIterator for QueryBuilderSet<B> {
    type Item = B;
    type IntoIter = std::vec::IntoIter<B>;

    fn into_iter(self) -> Self::IntoIter {
        self.builders.into_iter()
    }
}

impl<'a, B> IntoIterator for &'a QueryBuilderSet<B> {
    type Item = &'a B;
    type IntoIter = slice::Iter<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.builders.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Column, Filter, QueryBuilder, Settings};
    use serde_json::json;
    use strainer_options::OptionValue;

    type Builder = QueryBuilder<(), i64>;

    fn add(name: &str, by: i64) -> Builder {
        QueryBuilder::new(name, Settings::new(), move |_: &(), s: i64, _: &[Value]| s + by).unwrap()
    }

    fn double(name: &str) -> Builder {
        QueryBuilder::new(name, Settings::new(), |_: &(), s: i64, _: &[Value]| s * 2).unwrap()
    }

    fn hidden(name: &str) -> Builder {
        QueryBuilder::new(
            name,
            Settings::new().when(|_: &()| false),
            |_: &(), s: i64, _: &[Value]| s * 100,
        )
        .unwrap()
    }

    #[test]
    fn fold_order_matters() {
        let mut ab = QueryBuilderSet::new().with(add("a", 1)).with(double("b"));
        let mut ba = QueryBuilderSet::new().with(double("b")).with(add("a", 1));

        assert_eq!(ab.call(&(), 2), 6);
        assert_eq!(ba.call(&(), 2), 5);
    }

    #[test]
    fn empty_set_is_identity() {
        let mut set: QueryBuilderSet<Builder> = QueryBuilderSet::new();
        assert!(set.is_empty());
        assert_eq!(set.call(&(), 42), 42);
    }

    #[test]
    fn lookup_returns_first_match() {
        let set = QueryBuilderSet::new()
            .with(add("a", 1))
            .with(add("a", 2))
            .with(double("b"));

        let found = set.lookup("a").unwrap();
        let mut found = found.clone();
        assert_eq!(found.call(&(), 0, &[]), 1);
        assert!(set.lookup("zzz").is_none());
    }

    #[test]
    fn slice_and_except_preserve_order() {
        let set = QueryBuilderSet::new()
            .with(add("a", 1))
            .with(double("b"))
            .with(add("c", 3));

        assert_eq!(set.slice(["c", "a"]).names(), vec!["a", "c"]);
        assert_eq!(set.except(["a"]).names(), vec!["b", "c"]);
        assert!(set.slice(Vec::<String>::new()).is_empty());
        assert_eq!(set.except(Vec::<&str>::new()).len(), 3);
    }

    #[test]
    fn renderable_filters_by_predicates() {
        let set = QueryBuilderSet::new()
            .with(add("a", 1))
            .with(hidden("h"))
            .with(double("b"));

        assert_eq!(set.renderable(&()).names(), vec!["a", "b"]);
    }

    #[test]
    fn applied_subset_after_call() {
        let mut set = QueryBuilderSet::new()
            .with(add("a", 1))
            .with(hidden("h"))
            .with(double("b"));

        assert!(set.applied().is_empty());
        assert!(!set.any_applied());

        assert_eq!(set.call(&(), 1), 4);
        assert_eq!(set.applied().names(), vec!["a", "b"]);
        assert!(set.any_applied());
    }

    #[test]
    fn non_affecting_column_stays_renderable() {
        let mut set = QueryBuilderSet::new()
            .with(Column::new("name", Settings::new(), |_: &(), s: i64| s + 1).unwrap())
            .with(
                Column::new(
                    "actions",
                    Settings::new().affects_query(false),
                    |_: &(), s: i64| s * 10,
                )
                .unwrap(),
            );

        assert_eq!(set.call(&(), 1), 2);
        assert_eq!(set.renderable(&()).names(), vec!["name", "actions"]);
        assert_eq!(set.applied().names(), vec!["name"]);
    }

    #[test]
    fn filters_fold_with_their_values() {
        let plus = |_: &(), s: i64, v: &Value| s + v.as_i64().unwrap_or(0);
        let mut set = QueryBuilderSet::new()
            .with(Filter::new("a", Settings::new().value(2), plus).unwrap())
            .with(Filter::new("b", Settings::new().value(Value::Null).default(5), plus).unwrap())
            .with(Filter::new("c", Settings::new().value(Value::Null), plus).unwrap());

        assert_eq!(set.call(&(), 0), 7);
        assert_eq!(set.applied().names(), vec!["a"]);
    }

    #[test]
    fn boxed_heterogeneous_builders() {
        let mut set: QueryBuilderSet<Box<dyn Evaluatable<(), i64>>> = QueryBuilderSet::new();
        set.push(Box::new(Column::new("c", Settings::new(), |_: &(), s: i64| s + 1).unwrap()));
        set.push(Box::new(
            Filter::new("f", Settings::new().value(3), |_: &(), s: i64, v: &Value| {
                s * v.as_i64().unwrap_or(1)
            })
            .unwrap(),
        ));

        assert_eq!(set.call(&(), 1), 6);
        assert_eq!(set.names(), vec!["c", "f"]);
        assert!(set.lookup("f").unwrap().is_applied());
    }

    #[test]
    fn set_options_are_validated_and_frozen() {
        let schema = OptionsMap::new().with_default("header", json!(true));
        let set: QueryBuilderSet<Builder> =
            QueryBuilderSet::with_options(&schema, Options::new()).unwrap();
        assert_eq!(set.options().get("header"), Some(&json!(true)));
        assert!(set.options().is_frozen());

        let err = QueryBuilderSet::<Builder>::with_options(
            &schema,
            strainer_options::options([("heder", OptionValue::Value(json!(false)))]),
        )
        .unwrap_err();
        assert!(matches!(err, OptionsError::Unknown { .. }));
    }

    #[test]
    fn subsets_keep_set_options() {
        let schema = OptionsMap::new().with_default("header", json!(false));
        let mut set: QueryBuilderSet<Builder> =
            QueryBuilderSet::with_options(&schema, Options::new()).unwrap();
        set.push(add("a", 1));

        assert_eq!(set.slice(["a"]).options().get("header"), Some(&json!(false)));
    }

    #[test]
    fn iteration_and_collection() {
        let set: QueryBuilderSet<Builder> = vec![add("a", 1), double("b")].into_iter().collect();
        let names: Vec<&str> = (&set).into_iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(set.any(|b| b.name() == "b"));
        assert_eq!(set.into_vec().len(), 2);
    }
}
