//! Strainer builder - named, conditional query transformation steps.
//!
//! A query builder is a single named step that transforms an opaque "scope"
//! value (an ORM query, a SQL builder, an in-memory collection). Steps are
//! configured declaratively through schema-validated options and composed
//! into ordered sets that are applied as a left fold.
//!
//! - [`QueryBuilder`]: the atom, gated by `if`/`unless` predicates
//! - [`Filter`]: driven by a sanitized user value with an optional default
//! - [`Column`]: can be listed for display without touching the scope
//! - [`QueryBuilderSet`]: ordered composition, lookup and subsets
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::Value;
//! use strainer_builder::{Column, Filter, QueryBuilderSet, Settings};
//!
//! struct Params { status: Option<String> }
//!
//! // The scope here is a list of SQL fragments.
//! type Scope = Vec<String>;
//!
//! let params = Params { status: Some("open".into()) };
//!
//! let mut columns = QueryBuilderSet::new()
//!     .with(Column::new("title", Settings::new(), |_: &Params, mut s: Scope| {
//!         s.push("SELECT title".into());
//!         s
//!     }).unwrap())
//!     .with(Column::presentational("actions", Settings::new()).unwrap());
//!
//! let mut filters = QueryBuilderSet::new().with(
//!     Filter::new(
//!         "status",
//!         Settings::new().value(params.status.clone().map(Value::from).unwrap_or(Value::Null)),
//!         |_: &Params, mut s: Scope, value: &Value| {
//!             s.push(format!("WHERE status = '{}'", value.as_str().unwrap_or_default()));
//!             s
//!         },
//!     )
//!     .unwrap(),
//! );
//!
//! let scope = filters.call(&params, columns.call(&params, Vec::new()));
//! assert_eq!(scope, vec!["SELECT title", "WHERE status = 'open'"]);
//! assert_eq!(columns.renderable(&params).names(), vec!["title", "actions"]);
//! assert!(filters.any_applied());
//! ```
//!
//! # Context
//!
//! Every predicate, default and transform receives the caller's context
//! (`&C`) explicitly. The context is whatever state the embedding query
//! object wants its configuration to see: request parameters, the current
//! user, feature flags.
//!
//! # Applied Tracking
//!
//! Each builder records whether its transform ran. Filters refine this:
//! a filter that only ran because of its default value reports itself as
//! not applied, so "is this list filtered?" reflects user input only.

mod builder;
mod column;
mod filter;
mod label;
mod set;
mod setting;
mod traits;

pub use builder::{QueryBuilder, Transform};
pub use column::{Column, COLUMNS_NAMESPACE};
pub use filter::{Filter, FILTERS_NAMESPACE};
pub use label::{humanize, lookup_key, Humanize, Translate};
pub use set::QueryBuilderSet;
pub use setting::{is_blank, is_present, Compute, Predicate, Sanitizer, Setting, Settings};
pub use traits::{Conditional, Evaluatable, Named};

pub use strainer_options::{HasOptions, OptionValue, Options, OptionsError, OptionsMap};
