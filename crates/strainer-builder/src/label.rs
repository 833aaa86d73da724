//! Display label lookup.
//!
//! Labels are resolved by an external text service (translations, locale
//! files). This crate only derives the lookup keys; the service plugs in
//! through [`Translate`].

/// Looks up display text for a key within a namespace.
///
/// Implementations return `default` when they have no entry.
///
/// A blanket implementation covers closures:
///
/// ```
/// use strainer_builder::Translate;
///
/// let t = |namespace: &str, key: &str, default: &str| {
///     if namespace == "filters" && key == "status" {
///         "State".to_string()
///     } else {
///         default.to_string()
///     }
/// };
/// assert_eq!(t.lookup("filters", "status", "Status"), "State");
/// assert_eq!(t.lookup("columns", "status", "Status"), "Status");
/// ```
pub trait Translate {
    fn lookup(&self, namespace: &str, key: &str, default: &str) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str, &str, &str) -> String,
{
    fn lookup(&self, namespace: &str, key: &str, default: &str) -> String {
        (self)(namespace, key, default)
    }
}

/// A [`Translate`] that always answers with the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Humanize;

impl Translate for Humanize {
    fn lookup(&self, _namespace: &str, _key: &str, default: &str) -> String {
        default.to_string()
    }
}

/// Turns an identifier into a label: `created_at` becomes `Created at`.
pub fn humanize(name: &str) -> String {
    let spaced = name.trim_end_matches("_id").replace('_', " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Joins a namespace and a name into a lookup key.
pub fn lookup_key(namespace: &str, name: &str) -> String {
    format!("{}.{}", namespace, name)
}
