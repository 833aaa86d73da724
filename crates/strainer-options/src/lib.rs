//! Option schemas for declaratively configured objects.
//!
//! An [`OptionsMap`] declares which option keys an object accepts, which of
//! them are required, their defaults, and nested sub-schemas for grouped
//! configuration. Owners merge user-supplied values over the defaults,
//! validate, and freeze the result for their lifetime.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use strainer_options::{options, OptionValue, Options, OptionsError, OptionsMap};
//!
//! let empty_state = OptionsMap::new().with_default("title", json!("No results"));
//!
//! let schema = OptionsMap::new()
//!     .with_default("per_page", json!(25))
//!     .required("name")
//!     .nest("empty_state", &empty_state);
//!
//! // Missing a required key
//! let err = schema.merge(Options::new()).validate().unwrap_err();
//! assert!(matches!(err, OptionsError::Missing { .. }));
//!
//! // Nested keys keep their defaults when partially overridden
//! let resolved = schema
//!     .merge(options([
//!         ("name", OptionValue::Value(json!("users"))),
//!         ("empty_state", OptionValue::nested::<&str, _>([])),
//!     ]))
//!     .validate()
//!     .unwrap();
//! assert_eq!(resolved.str_in(&["empty_state", "title"]), Some("No results"));
//! ```
//!
//! # Copy-on-define
//!
//! `define`, `nest` and `merge` never modify the receiver. A "base" schema can
//! be extended by several derived schemas without any of them observing the
//! others' declarations:
//!
//! ```text
//! base ──define(value)──▶ filter schema
//!   └───define(affects_query)──▶ column schema
//! ```
//!
//! # Defaults
//!
//! Defaults are `Option<V>`: `None` means "no default", while `Some(null)` is
//! an intentional null default that counts as present for required keys.

mod error;
mod map;

pub use error::{OptionsError, Result};
pub use map::{options, options_from_json, HasOptions, OptionValue, Options, OptionsMap};
