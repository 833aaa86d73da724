//! # Strainer - Declarative Filterable Queries
//!
//! Strainer turns a handful of declarations into a filterable, paginated
//! data table. You declare columns and filters once; each request binds them
//! to a context and the request parameters, folds a scope through them and
//! presents the result.
//!
//! ## Layers
//!
//! - [`strainer_options`]: schema-validated, copy-on-define option maps
//! - [`strainer_builder`]: query builders, filters, columns and ordered sets
//! - this crate: [`QueryDefinition`], [`Query`], [`DataTable`] and the hooks
//!   connecting them to the host (labels, URLs, rendering, config files)
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::Value;
//! use strainer::{data_table, Memory, Params, QueryDefinition, Settings};
//!
//! #[derive(Clone, serde::Serialize)]
//! struct Task { title: String, done: bool }
//!
//! struct User { admin: bool }
//!
//! let definition = QueryDefinition::<User, Memory<Task>>::new()
//!     .default_scope(|_| Memory::new(vec![
//!         Task { title: "write".into(), done: false },
//!         Task { title: "test".into(), done: true },
//!     ]))
//!     .column("title", Settings::new(), |_, scope: Memory<Task>| {
//!         scope.order_by(|a, b| a.title.cmp(&b.title))
//!     })
//!     .column("owner", Settings::new().when(|user: &User| user.admin), |_, scope| scope)
//!     .filter(
//!         "done",
//!         Settings::new().sanitize(|v| match v.as_str() {
//!             Some("yes") => Value::Bool(true),
//!             Some("no") => Value::Bool(false),
//!             _ => Value::Null,
//!         }),
//!         |_, scope: Memory<Task>, value: &Value| {
//!             let done = value.as_bool().unwrap_or(false);
//!             scope.filter(move |task| task.done == done)
//!         },
//!     );
//!
//! let mut query = definition
//!     .build(User { admin: false }, Params::new().with("done", "no"), Default::default())
//!     .unwrap();
//! let table = data_table().build(&mut query).unwrap();
//!
//! assert_eq!(table.rows.len(), 1);
//! assert_eq!(table.columns.len(), 1);
//! assert!(table.filtered);
//! ```
//!
//! ## Logging
//!
//! Building, evaluating and presenting queries emits `tracing` events at
//! `debug` and `trace` level. Strainer never installs a subscriber.

mod config;
mod definition;
mod error;
mod pagination;
mod params;
mod query;
mod records;
mod render;
mod table;

pub use config::{EmptyStateConfig, FiltersConfig, TableConfig};
pub use definition::QueryDefinition;
pub use error::{ConfigError, QueryError, Result};
pub use pagination::Pagination;
pub use params::Params;
pub use query::{Query, Scope};
pub use records::{Memory, Records};
pub use render::{render_payload, RenderTarget, RenderTemplate, RewriteUrl};
pub use table::{
    data_table, ColumnHeader, DataTable, DataTableBuilder, EmptyState, FilterField,
    EMPTY_STATE_NAMESPACE,
};

// Engine types, re-exported so most hosts depend on this crate alone.
pub use strainer_builder::{
    humanize, is_blank, is_present, Column, Conditional, Evaluatable, Filter, Humanize, Named,
    QueryBuilder, QueryBuilderSet, Setting, Settings, Translate, COLUMNS_NAMESPACE,
    FILTERS_NAMESPACE,
};
pub use strainer_options::{
    options, options_from_json, HasOptions, OptionValue, Options, OptionsError, OptionsMap,
};

pub use strainer_builder;
pub use strainer_options;
