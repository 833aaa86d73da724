//! Data table presentation.
//!
//! A [`DataTable`] is the serializable result of running a [`Query`]: the
//! current page of rows plus everything a view needs to draw headers,
//! filter inputs, pagination and an empty state.
//!
//! ```
//! use serde_json::Value;
//! use strainer::{data_table, Memory, Params, QueryDefinition, Settings};
//!
//! let definition = QueryDefinition::<(), Memory<String>>::new()
//!     .default_scope(|_| Memory::new(vec!["ant".into(), "bee".into(), "cat".into()]))
//!     .column("name", Settings::new(), |_, scope| scope)
//!     .filter("prefix", Settings::new(), |_, scope: Memory<String>, value: &Value| {
//!         let prefix = value.as_str().unwrap_or("").to_string();
//!         scope.filter(move |name| name.starts_with(prefix.as_str()))
//!     });
//!
//! let mut query = definition
//!     .build((), Params::new().with("prefix", "b"), Default::default())
//!     .unwrap();
//! let table = data_table().build(&mut query).unwrap();
//!
//! assert_eq!(table.rows, vec!["bee"]);
//! assert!(table.filtered);
//! assert_eq!(table.columns[0].label, "Name");
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use strainer_builder::{Humanize, Translate};
use strainer_options::HasOptions;
use tracing::debug;

use crate::error::Result;
use crate::pagination::Pagination;
use crate::query::Query;
use crate::records::Records;
use crate::render::{render_payload, RenderTarget, RenderTemplate, RewriteUrl};

/// Namespace used for empty state lookups.
pub const EMPTY_STATE_NAMESPACE: &str = "empty_state";

/// A column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    pub name: String,
    pub label: String,
}

/// A filter input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterField {
    pub name: String,
    pub label: String,
    /// Input placeholder; omitted when there is none.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
    /// The effective value, default included.
    pub value: Value,
    /// Whether the filter ran on a user-supplied value.
    pub applied: bool,
}

/// What to show when there are no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A rendered query result.
#[derive(Debug, Clone, Serialize)]
pub struct DataTable<R> {
    /// Rows of the current page.
    pub rows: Vec<R>,

    /// Visible columns, in order.
    pub columns: Vec<ColumnHeader>,

    /// Visible filters, in order.
    pub filters: Vec<FilterField>,

    /// Whether any filter applied on a user-supplied value.
    pub filtered: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,

    /// Present only when there are no rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,

    /// Link clearing every filter; present only when filtered and a URL
    /// rewriter was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_url: Option<String>,
}

impl<R> DataTable<R> {
    /// Returns `true` if the current page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows on the current page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The filter field named `name`.
    pub fn filter(&self, name: &str) -> Option<&FilterField> {
        self.filters.iter().find(|f| f.name == name)
    }
}

impl<R: Serialize> DataTable<R> {
    /// Renders the table through `target`, serialized under `"table"`
    /// alongside `extras`.
    pub fn render(
        &self,
        target: &RenderTarget,
        engine: &dyn RenderTemplate,
        extras: Map<String, Value>,
    ) -> Result<String> {
        let payload = render_payload("table", self, extras)?;
        Ok(target.render(&payload, engine))
    }
}

/// Starts a [`DataTableBuilder`] with default hooks.
pub fn data_table() -> DataTableBuilder {
    DataTableBuilder::new()
}

/// Builds a [`DataTable`] from a [`Query`].
///
/// Labels come from a [`Translate`] hook, [`Humanize`] by default. The
/// reset link is only produced when a base URL and a [`RewriteUrl`] hook
/// are configured.
pub struct DataTableBuilder {
    translator: Box<dyn Translate>,
    reset: Option<(String, Box<dyn RewriteUrl>)>,
}

impl DataTableBuilder {
    pub fn new() -> Self {
        Self {
            translator: Box::new(Humanize),
            reset: None,
        }
    }

    /// Sets the label lookup hook.
    pub fn translator(mut self, translator: impl Translate + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    /// Enables the reset link, built by rewriting `base`.
    pub fn reset_url(
        mut self,
        base: impl Into<String>,
        rewriter: impl RewriteUrl + 'static,
    ) -> Self {
        self.reset = Some((base.into(), Box::new(rewriter)));
        self
    }

    /// Runs `query` from its default scope and presents the result.
    pub fn build<C, S>(&self, query: &mut Query<C, S>) -> Result<DataTable<S::Row>>
    where
        S: Records,
    {
        let scope = query.call()?;
        Ok(self.present(query, scope))
    }

    /// Runs `query` from `scope` and presents the result.
    pub fn build_with<C, S>(&self, query: &mut Query<C, S>, scope: S) -> DataTable<S::Row>
    where
        S: Records,
    {
        let scope = query.call_with(scope);
        self.present(query, scope)
    }

    fn present<C, S>(&self, query: &Query<C, S>, scope: S) -> DataTable<S::Row>
    where
        S: Records,
    {
        let translator = self.translator.as_ref();
        let total = scope.count();
        let pagination = query.pagination(total);
        let rows = match &pagination {
            Some(page) => scope.fetch(page.offset(), Some(page.per_page)),
            None => scope.fetch(0, None),
        };

        let columns = query
            .renderable_columns()
            .iter()
            .map(|column| ColumnHeader {
                name: column.name().to_string(),
                label: column.label(translator),
            })
            .collect();

        let filters = query
            .renderable_filters()
            .iter()
            .map(|filter| FilterField {
                name: filter.name().to_string(),
                label: filter.label(translator),
                placeholder: filter.placeholder(translator),
                value: filter.value(query.context()),
                applied: filter.is_applied(),
            })
            .collect();

        let filtered = query.is_filtered();
        let empty_state = rows.is_empty().then(|| self.empty_state(query));
        let reset_url = if filtered { self.reset_link(query) } else { None };

        debug!(rows = rows.len(), total, filtered, "presented data table");

        DataTable {
            rows,
            columns,
            filters,
            filtered,
            pagination,
            empty_state,
            reset_url,
        }
    }

    fn empty_state<C, S>(&self, query: &Query<C, S>) -> EmptyState {
        let options = query.options();
        let title = options
            .str_in(&["empty_state", "title"])
            .unwrap_or("No results");
        let description = options.str_in(&["empty_state", "description"]);

        EmptyState {
            title: self.translator.lookup(EMPTY_STATE_NAMESPACE, "title", title),
            description: description
                .map(|d| self.translator.lookup(EMPTY_STATE_NAMESPACE, "description", d)),
        }
    }

    /// Removes every filter parameter (or the whole `param_key` group) and
    /// the page parameter.
    fn reset_link<C, S>(&self, query: &Query<C, S>) -> Option<String> {
        let (base, rewriter) = self.reset.as_ref()?;
        let filters = query.filters();
        if !filters.option("reset").and_then(Value::as_bool).unwrap_or(true) {
            return None;
        }

        let mut overrides: Vec<(String, Option<String>)> =
            match filters.option("param_key").and_then(Value::as_str) {
                Some(key) => vec![(key.to_string(), None)],
                None => filters
                    .iter()
                    .map(|f| (f.name().to_string(), None))
                    .collect(),
            };
        overrides.push((query.page_param().to_string(), None));

        Some(rewriter.rewrite(base, &overrides))
    }
}

impl Default for DataTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
