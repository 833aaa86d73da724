//! Declaring queries.
//!
//! A [`QueryDefinition`] is the reusable, declarative half of a query: its
//! option schema, its columns and filters, and optionally the scope it
//! starts from. [`build`](QueryDefinition::build) binds it to a context
//! and request parameters, producing a runnable [`Query`].

use std::fmt;
use std::rc::Rc;

use serde_json::{json, Value};
use strainer_builder::{Column, Filter, QueryBuilderSet, Settings};
use strainer_options::{HasOptions, Options, OptionsMap};
use tracing::{debug, trace};

use crate::config::TableConfig;
use crate::error::{QueryError, Result};
use crate::params::Params;
use crate::query::{Query, Scope};

type ColumnTransform<C, S> = Rc<dyn Fn(&C, S) -> S>;
type FilterTransform<C, S> = Rc<dyn Fn(&C, S, &Value) -> S>;

struct ColumnDef<C, S> {
    name: String,
    settings: Settings<C>,
    transform: ColumnTransform<C, S>,
}

struct FilterDef<C, S> {
    name: String,
    settings: Settings<C>,
    transform: FilterTransform<C, S>,
}

/// The declarative description of a query.
///
/// Default options:
///
/// | Key | Default |
/// |-----|---------|
/// | `per_page` | `25` (required) |
/// | `page_param` | `"page"` |
/// | `paginate` | `true` |
/// | `empty_state.title` | `"No results"` |
/// | `empty_state.description` | `null` |
/// | `filters.param_key` | `null` (filters read from the top level) |
/// | `filters.reset` | `true` |
///
/// # Example
///
/// ```
/// use serde_json::Value;
/// use strainer::{Memory, Params, QueryDefinition, Settings};
/// use strainer_options::Options;
///
/// let definition = QueryDefinition::<(), Memory<u32>>::new()
///     .default_scope(|_| Memory::new((1..=30).collect()))
///     .filter("min", Settings::new(), |_, scope: Memory<u32>, value: &Value| {
///         let min = value.as_str().and_then(|s| s.parse::<u32>().ok()).unwrap_or(0);
///         scope.filter(move |n| *n >= min)
///     });
///
/// let mut query = definition
///     .build((), Params::new().with("min", "25"), Options::new())
///     .unwrap();
///
/// let scope = query.call().unwrap();
/// assert!(query.is_filtered());
/// assert_eq!(scope.to_vec(), vec![25, 26, 27, 28, 29, 30]);
/// ```
pub struct QueryDefinition<C, S> {
    schema: OptionsMap<Value>,
    columns: Vec<ColumnDef<C, S>>,
    filters: Vec<FilterDef<C, S>>,
    default_scope: Option<Scope<C, S>>,
}

impl<C: 'static, S: 'static> QueryDefinition<C, S> {
    /// A definition with the default schema and no builders.
    pub fn new() -> Self {
        Self {
            schema: Self::base_schema(),
            columns: Vec::new(),
            filters: Vec::new(),
            default_scope: None,
        }
    }

    /// The option schema every query starts from.
    pub fn base_schema() -> OptionsMap<Value> {
        let empty_state = OptionsMap::new()
            .with_default("title", json!("No results"))
            .with_default("description", Value::Null);
        let filters = OptionsMap::new()
            .with_default("param_key", Value::Null)
            .with_default("reset", json!(true));

        OptionsMap::new()
            .required_with_default("per_page", json!(25))
            .with_default("page_param", json!("page"))
            .with_default("paginate", json!(true))
            .nest("empty_state", &empty_state)
            .nest("filters", &filters)
    }

    /// Declares an extra query option with a default.
    pub fn option(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.schema = self.schema.with_default(name, default.into());
        self
    }

    /// Declares an extra query option callers must supply.
    pub fn required_option(mut self, name: impl Into<String>) -> Self {
        self.schema = self.schema.required(name);
        self
    }

    /// Declares a nested option group validated by `schema`.
    pub fn nest(mut self, name: impl Into<String>, schema: &OptionsMap<Value>) -> Self {
        self.schema = self.schema.nest(name, schema);
        self
    }

    /// Declares a column. Columns run in declaration order, before filters.
    pub fn column<F>(
        mut self,
        name: impl Into<String>,
        settings: Settings<C>,
        transform: F,
    ) -> Self
    where
        F: Fn(&C, S) -> S + 'static,
    {
        self.columns.push(ColumnDef {
            name: name.into(),
            settings,
            transform: Rc::new(transform),
        });
        self
    }

    /// Declares a column that is rendered but never touches the scope.
    pub fn presentational_column(
        mut self,
        name: impl Into<String>,
        settings: Settings<C>,
    ) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            settings: settings.affects_query(false),
            transform: Rc::new(|_: &C, scope: S| scope),
        });
        self
    }

    /// Declares a filter. Filters run in declaration order, after columns.
    ///
    /// Unless `settings` pins a `value`, the filter's value is read from the
    /// request parameters under its name (or under `filters.param_key`).
    pub fn filter<F>(
        mut self,
        name: impl Into<String>,
        settings: Settings<C>,
        transform: F,
    ) -> Self
    where
        F: Fn(&C, S, &Value) -> S + 'static,
    {
        self.filters.push(FilterDef {
            name: name.into(),
            settings,
            transform: Rc::new(transform),
        });
        self
    }

    /// The scope [`Query::call`] starts from.
    pub fn default_scope<F>(mut self, f: F) -> Self
    where
        F: Fn(&C) -> S + 'static,
    {
        self.default_scope = Some(Rc::new(f));
        self
    }

    /// Binds the definition to a context and request parameters.
    ///
    /// `user_options` are layered over the schema defaults, validated and
    /// frozen. Mappings under keys without a nested schema are kept as plain
    /// JSON values. Built-in options must hold values of the documented type.
    /// Column and filter settings are validated here too, so a misconfigured
    /// definition fails before any scope is touched.
    pub fn build(
        &self,
        context: C,
        params: Params,
        user_options: Options<Value>,
    ) -> Result<Query<C, S>> {
        let user_options = self.schema.conform(user_options);
        let options = self.schema.merge(user_options).validate()?.freeze();
        check_builtin_options(&options)?;

        let mut columns = QueryBuilderSet::new();
        for def in &self.columns {
            let transform = Rc::clone(&def.transform);
            columns.push(Column::new(
                def.name.clone(),
                def.settings.clone(),
                move |ctx: &C, scope: S| transform(ctx, scope),
            )?);
        }

        let filter_schema = self
            .schema
            .nested_schema("filters")
            .cloned()
            .unwrap_or_default();
        let filter_options = options.get_nested("filters").cloned().unwrap_or_default();
        let mut filters = QueryBuilderSet::with_options(&filter_schema, filter_options)?;
        let param_key = filters
            .option("param_key")
            .and_then(Value::as_str)
            .map(str::to_string);

        for def in &self.filters {
            let mut settings = def.settings.clone();
            if !settings.contains("value") {
                let value = params.filter_value(param_key.as_deref(), &def.name);
                trace!(filter = %def.name, %value, "read filter value from params");
                settings = settings.value(value);
            }
            let transform = Rc::clone(&def.transform);
            filters.push(Filter::new(
                def.name.clone(),
                settings,
                move |ctx: &C, scope: S, value: &Value| transform(ctx, scope, value),
            )?);
        }

        debug!(columns = columns.len(), filters = filters.len(), "built query");

        Ok(Query::new(
            context,
            params,
            options,
            columns,
            filters,
            self.default_scope.clone(),
        ))
    }

    /// [`build`](Self::build) with user options read from a YAML table config.
    pub fn build_from_yaml(
        &self,
        context: C,
        params: Params,
        source: &str,
    ) -> Result<Query<C, S>> {
        let config = TableConfig::from_yaml(source)?;
        self.build(context, params, config.into_options())
    }

    /// [`build`](Self::build) with user options read from a JSON table config.
    pub fn build_from_json(
        &self,
        context: C,
        params: Params,
        source: &str,
    ) -> Result<Query<C, S>> {
        let config = TableConfig::from_json(source)?;
        self.build(context, params, config.into_options())
    }
}

fn check_builtin_options(options: &OptionsMap<Value>) -> Result<()> {
    let string_or_null = |v: &Value| v.is_string() || v.is_null();

    expect(options, &["per_page"], "a positive integer", |v| {
        v.as_u64().is_some_and(|n| n >= 1)
    })?;
    expect(options, &["page_param"], "a string", Value::is_string)?;
    expect(options, &["paginate"], "a boolean", Value::is_boolean)?;
    expect(options, &["empty_state", "title"], "a string or null", string_or_null)?;
    expect(options, &["empty_state", "description"], "a string or null", string_or_null)?;
    expect(options, &["filters", "param_key"], "a string or null", string_or_null)?;
    expect(options, &["filters", "reset"], "a boolean", Value::is_boolean)
}

fn expect(
    options: &OptionsMap<Value>,
    path: &[&str],
    expected: &'static str,
    valid: impl Fn(&Value) -> bool,
) -> Result<()> {
    match options.get_in(path) {
        Some(value) if !valid(value) => Err(QueryError::InvalidOption {
            key: path.join("."),
            expected,
        }),
        _ => Ok(()),
    }
}

impl<C, S> QueryDefinition<C, S> {
    /// The definition's option schema.
    pub fn schema(&self) -> &OptionsMap<Value> {
        &self.schema
    }

    /// Names of declared columns, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Names of declared filters, in order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name.as_str()).collect()
    }
}

impl<C: 'static, S: 'static> Default for QueryDefinition<C, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, S> fmt::Debug for QueryDefinition<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDefinition")
            .field("options", &self.schema.valid_keys())
            .field("columns", &self.column_names())
            .field("filters", &self.filter_names())
            .field("default_scope", &self.default_scope.is_some())
            .finish()
    }
}
