//! Handing tables to the host's rendering layer.
//!
//! Strainer never renders markup itself. It assembles a JSON payload and
//! passes it to whatever the host uses for views, through one of two
//! targets:
//!
//! - [`RenderTarget::Template`] names a template the host's
//!   [`RenderTemplate`] engine resolves.
//! - [`RenderTarget::Callable`] renders the payload directly.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// The host's template engine.
pub trait RenderTemplate {
    /// Renders the template `name` with `payload`.
    fn render(&self, name: &str, payload: &Value) -> String;
}

impl<F> RenderTemplate for F
where
    F: Fn(&str, &Value) -> String,
{
    fn render(&self, name: &str, payload: &Value) -> String {
        self(name, payload)
    }
}

/// Where a payload is rendered.
#[derive(Clone)]
pub enum RenderTarget {
    /// A template resolved by the host engine.
    Template(String),
    /// A function rendering the payload itself.
    Callable(Rc<dyn Fn(&Value) -> String>),
}

impl RenderTarget {
    pub fn template(name: impl Into<String>) -> Self {
        RenderTarget::Template(name.into())
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&Value) -> String + 'static,
    {
        RenderTarget::Callable(Rc::new(f))
    }

    /// Renders `payload`. `engine` is only consulted for templates.
    pub fn render(&self, payload: &Value, engine: &dyn RenderTemplate) -> String {
        match self {
            RenderTarget::Template(name) => engine.render(name, payload),
            RenderTarget::Callable(f) => f(payload),
        }
    }
}

impl fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderTarget::Template(name) => f.debug_tuple("Template").field(name).finish(),
            RenderTarget::Callable(_) => f.write_str("Callable(<fn>)"),
        }
    }
}

/// Builds the object a render target receives.
///
/// `subject` is serialized under `subject_key`; `extras` are layered on
/// top. An extra named like the subject replaces it.
pub fn render_payload<T: Serialize>(
    subject_key: &str,
    subject: &T,
    extras: Map<String, Value>,
) -> Result<Value> {
    let mut payload = Map::new();
    payload.insert(subject_key.to_string(), serde_json::to_value(subject)?);
    payload.extend(extras);
    Ok(Value::Object(payload))
}

/// Rewrites a URL's query string.
///
/// `overrides` pairs a parameter name with its new value; `None` removes
/// the parameter. The reset link of a filtered table is built through here,
/// so the host keeps control over routing and encoding.
pub trait RewriteUrl {
    fn rewrite(&self, base: &str, overrides: &[(String, Option<String>)]) -> String;
}

impl<F> RewriteUrl for F
where
    F: Fn(&str, &[(String, Option<String>)]) -> String,
{
    fn rewrite(&self, base: &str, overrides: &[(String, Option<String>)]) -> String {
        self(base, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_nests_subject_and_extras() {
        let mut extras = Map::new();
        extras.insert("title".into(), json!("Tasks"));

        let payload = render_payload("table", &vec![1, 2], extras).unwrap();
        assert_eq!(payload, json!({"table": [1, 2], "title": "Tasks"}));
    }

    #[test]
    fn extras_override_subject_key() {
        let mut extras = Map::new();
        extras.insert("table".into(), json!(null));

        let payload = render_payload("table", &"rows", extras).unwrap();
        assert_eq!(payload, json!({"table": null}));
    }

    #[test]
    fn template_target_uses_engine() {
        let engine = |name: &str, payload: &Value| format!("{}:{}", name, payload["n"]);
        let target = RenderTarget::template("tables/list");

        assert_eq!(target.render(&json!({"n": 3}), &engine), "tables/list:3");
    }

    #[test]
    fn callable_target_ignores_engine() {
        let engine = |_: &str, _: &Value| "engine".to_string();
        let target = RenderTarget::callable(|payload| format!("rows={}", payload["n"]));

        assert_eq!(target.render(&json!({"n": 2}), &engine), "rows=2");
        assert_eq!(format!("{:?}", target), "Callable(<fn>)");
    }

    #[test]
    fn closures_rewrite_urls() {
        let rewrite = |base: &str, overrides: &[(String, Option<String>)]| {
            let kept: Vec<String> = overrides
                .iter()
                .filter_map(|(k, v)| v.as_ref().map(|v| format!("{}={}", k, v)))
                .collect();
            format!("{}?{}", base, kept.join("&"))
        };

        let url = rewrite.rewrite(
            "/tasks",
            &[("status".into(), None), ("sort".into(), Some("title".into()))],
        );
        assert_eq!(url, "/tasks?sort=title");
    }
}
