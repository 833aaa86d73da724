//! Record sources a query scope can be turned into rows from.
//!
//! The engine treats scopes as opaque. Presenting a scope as a table only
//! needs two things from it: how many rows it yields and a window of them.
//! [`Records`] captures that; [`Memory`] is an in-process implementation
//! useful for tests, fixtures and small datasets.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A scope that can be counted and paged.
pub trait Records {
    /// The row type yielded by the scope.
    type Row;

    /// Number of rows the scope yields.
    fn count(&self) -> usize;

    /// Up to `limit` rows starting at `offset`. `None` means no limit.
    fn fetch(&self, offset: usize, limit: Option<usize>) -> Vec<Self::Row>;
}

type Predicate<T> = Rc<dyn Fn(&T) -> bool>;
type Comparator<T> = Rc<dyn Fn(&T, &T) -> Ordering>;

/// A lazily evaluated scope over an in-memory collection.
///
/// Filters and orderings accumulate and only run when rows are counted or
/// fetched, so query builders can chain them freely.
///
/// ```
/// use strainer::{Memory, Records};
///
/// let scope = Memory::new(vec![5, 3, 8, 1])
///     .filter(|n| *n > 2)
///     .order_by(|a, b| a.cmp(b));
///
/// assert_eq!(scope.count(), 3);
/// assert_eq!(scope.fetch(1, Some(5)), vec![5, 8]);
/// ```
pub struct Memory<T> {
    items: Rc<Vec<T>>,
    predicates: Vec<Predicate<T>>,
    orderings: Vec<Comparator<T>>,
    offset: usize,
    limit: Option<usize>,
}

impl<T> Memory<T> {
    /// Wraps `items` without any filter or ordering.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Rc::new(items),
            predicates: Vec::new(),
            orderings: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Keeps only items matching `f`. Filters are AND-ed.
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.predicates.push(Rc::new(f));
        self
    }

    /// Adds an ordering. Earlier orderings take precedence; later ones
    /// break ties.
    pub fn order_by<F>(mut self, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        self.orderings.push(Rc::new(cmp));
        self
    }

    /// Skips the first `offset` matching rows.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Yields at most `limit` rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of items before any filter.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    fn matching(&self) -> Vec<&T> {
        let mut rows: Vec<&T> = self
            .items
            .iter()
            .filter(|item| self.predicates.iter().all(|p| p(item)))
            .collect();

        if !self.orderings.is_empty() {
            rows.sort_by(|a, b| {
                self.orderings
                    .iter()
                    .fold(Ordering::Equal, |acc, cmp| acc.then_with(|| cmp(a, b)))
            });
        }

        let rows = rows.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        }
    }
}

impl<T: Clone> Memory<T> {
    /// All rows the scope yields.
    pub fn to_vec(&self) -> Vec<T> {
        self.matching().into_iter().cloned().collect()
    }
}

impl<T: Clone> Records for Memory<T> {
    type Row = T;

    fn count(&self) -> usize {
        self.matching().len()
    }

    fn fetch(&self, offset: usize, limit: Option<usize>) -> Vec<T> {
        let rows = self.matching().into_iter().skip(offset).cloned();
        match limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        }
    }
}

impl<T> Clone for Memory<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
            predicates: self.predicates.clone(),
            orderings: self.orderings.clone(),
            offset: self.offset,
            limit: self.limit,
        }
    }
}

impl<T> fmt::Debug for Memory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("items", &self.items.len())
            .field("filters", &self.predicates.len())
            .field("orderings", &self.orderings.len())
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Task {
        title: &'static str,
        priority: u8,
        done: bool,
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task { title: "write", priority: 2, done: false },
            Task { title: "test", priority: 1, done: true },
            Task { title: "ship", priority: 2, done: false },
            Task { title: "rest", priority: 3, done: false },
        ]
    }

    #[test]
    fn unfiltered_scope_yields_everything() {
        let scope = Memory::new(tasks());
        assert_eq!(scope.count(), 4);
        assert_eq!(scope.total(), 4);
        assert_eq!(scope.to_vec(), tasks());
    }

    #[test]
    fn filters_are_anded() {
        let scope = Memory::new(tasks())
            .filter(|t| !t.done)
            .filter(|t| t.priority == 2);

        let titles: Vec<_> = scope.to_vec().iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["write", "ship"]);
    }

    #[test]
    fn later_orderings_break_ties() {
        let scope = Memory::new(tasks())
            .order_by(|a, b| b.priority.cmp(&a.priority))
            .order_by(|a, b| a.title.cmp(b.title));

        let titles: Vec<_> = scope.to_vec().iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["rest", "ship", "write", "test"]);
    }

    #[test]
    fn sort_is_stable_without_tiebreak() {
        let scope = Memory::new(tasks()).order_by(|a, b| a.priority.cmp(&b.priority));
        let titles: Vec<_> = scope.to_vec().iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["test", "write", "ship", "rest"]);
    }

    #[test]
    fn scope_window_is_applied_before_fetch_window() {
        let scope = Memory::new((1..=10).collect::<Vec<u32>>()).offset(2).limit(5);

        assert_eq!(scope.count(), 5);
        assert_eq!(scope.fetch(0, None), vec![3, 4, 5, 6, 7]);
        assert_eq!(scope.fetch(3, Some(10)), vec![6, 7]);
    }

    #[test]
    fn fetch_past_the_end_is_empty() {
        let scope = Memory::new(vec![1, 2, 3]);
        assert!(scope.fetch(5, Some(2)).is_empty());
    }

    #[test]
    fn clones_share_items() {
        let scope = Memory::new(vec![1, 2, 3]);
        let narrowed = scope.clone().filter(|n| *n > 1);

        assert_eq!(scope.count(), 3);
        assert_eq!(narrowed.count(), 2);
    }
}
