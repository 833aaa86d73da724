//! Runnable queries.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use strainer_builder::{Column, Filter, QueryBuilderSet};
use strainer_options::{HasOptions, OptionsMap};
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::pagination::Pagination;
use crate::params::Params;

/// Produces the starting scope for a context.
pub type Scope<C, S> = Rc<dyn Fn(&C) -> S>;

/// A query bound to a context and request parameters.
///
/// Built by [`QueryDefinition::build`](crate::QueryDefinition::build).
/// Running it folds the scope through every column, then every filter.
/// After a run, [`is_filtered`](Self::is_filtered) and the builders'
/// `is_applied` flags describe what actually happened.
pub struct Query<C, S> {
    context: C,
    params: Params,
    options: OptionsMap<Value>,
    columns: QueryBuilderSet<Column<C, S>>,
    filters: QueryBuilderSet<Filter<C, S>>,
    default_scope: Option<Scope<C, S>>,
}

impl<C, S> Query<C, S> {
    pub(crate) fn new(
        context: C,
        params: Params,
        options: OptionsMap<Value>,
        columns: QueryBuilderSet<Column<C, S>>,
        filters: QueryBuilderSet<Filter<C, S>>,
        default_scope: Option<Scope<C, S>>,
    ) -> Self {
        Self {
            context,
            params,
            options,
            columns,
            filters,
            default_scope,
        }
    }

    /// Runs the query from the definition's default scope.
    ///
    /// Fails with [`QueryError::NotImplemented`] when the definition has no
    /// default scope.
    pub fn call(&mut self) -> Result<S> {
        let scope = self
            .default_scope
            .as_ref()
            .map(|f| f(&self.context))
            .ok_or(QueryError::NotImplemented {
                hook: "default_scope",
            })?;
        Ok(self.call_with(scope))
    }

    /// Runs the query from an explicit scope.
    pub fn call_with(&mut self, scope: S) -> S {
        let scope = self.columns.call(&self.context, scope);
        let scope = self.filters.call(&self.context, scope);
        debug!(filtered = self.is_filtered(), "ran query");
        scope
    }

    /// Whether any filter applied on a user-supplied value.
    pub fn is_filtered(&self) -> bool {
        self.filters.any_applied()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// All columns, in application order.
    pub fn columns(&self) -> &QueryBuilderSet<Column<C, S>> {
        &self.columns
    }

    /// All filters, in application order.
    pub fn filters(&self) -> &QueryBuilderSet<Filter<C, S>> {
        &self.filters
    }

    /// Columns visible for the query's context.
    pub fn renderable_columns(&self) -> QueryBuilderSet<Column<C, S>> {
        self.columns.renderable(&self.context)
    }

    /// Filters visible for the query's context.
    pub fn renderable_filters(&self) -> QueryBuilderSet<Filter<C, S>> {
        self.filters.renderable(&self.context)
    }

    /// Filters that applied on a user-supplied value.
    pub fn applied_filters(&self) -> QueryBuilderSet<Filter<C, S>> {
        self.filters.applied()
    }

    /// The effective value of every filter, keyed by name.
    pub fn filter_values(&self) -> Vec<(String, Value)> {
        self.filters
            .iter()
            .map(|f| (f.name().to_string(), f.value(&self.context)))
            .collect()
    }

    /// The current page, read from the `page_param` request parameter.
    pub fn page(&self) -> usize {
        self.params.page(self.page_param())
    }

    /// The name of the page request parameter.
    pub fn page_param(&self) -> &str {
        self.options.str_in(&["page_param"]).unwrap_or("page")
    }

    pub fn per_page(&self) -> usize {
        self.options
            .u64_in(&["per_page"])
            .map(|n| n as usize)
            .unwrap_or(25)
    }

    /// Whether results are paginated.
    pub fn paginates(&self) -> bool {
        self.options.bool_in(&["paginate"]).unwrap_or(true)
    }

    /// The page window over `total` rows, `None` when pagination is off.
    pub fn pagination(&self, total: usize) -> Option<Pagination> {
        self.paginates()
            .then(|| Pagination::new(self.page(), self.per_page(), total))
    }
}

impl<C, S> HasOptions for Query<C, S> {
    fn options(&self) -> &OptionsMap<Value> {
        &self.options
    }
}

impl<C: fmt::Debug, S> fmt::Debug for Query<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("context", &self.context)
            .field("params", &self.params)
            .field("columns", &self.columns.names())
            .field("filters", &self.filters.names())
            .field("filtered", &self.is_filtered())
            .finish()
    }
}
