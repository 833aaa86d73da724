//! Property-based tests for query builder sets.

use proptest::prelude::*;
use serde_json::Value;
use strainer_builder::{is_blank, Filter, QueryBuilder, QueryBuilderSet, Settings};

#[derive(Debug, Clone, Copy)]
enum Step {
    Add(i64),
    Mul(i64),
}

impl Step {
    fn apply(self, n: i64) -> i64 {
        match self {
            Step::Add(k) => n.wrapping_add(k),
            Step::Mul(k) => n.wrapping_mul(k),
        }
    }
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-100i64..100).prop_map(Step::Add),
        (-5i64..5).prop_map(Step::Mul),
    ]
}

fn builder(index: usize, step: Step, visible: bool) -> QueryBuilder<(), i64> {
    QueryBuilder::new(
        format!("step_{index}"),
        Settings::new().when(move |_: &()| visible),
        move |_: &(), n: i64, _: &[Value]| step.apply(n),
    )
    .unwrap()
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        "[ a-z]{0,4}".prop_map(Value::String),
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
    ]
}

proptest! {
    /// A set computes the same result as applying its visible steps in order.
    #[test]
    fn fold_matches_sequential_application(
        steps in prop::collection::vec((step_strategy(), any::<bool>()), 0..12),
        start in -1000i64..1000,
    ) {
        let mut set: QueryBuilderSet<_> = steps
            .iter()
            .enumerate()
            .map(|(i, (step, visible))| builder(i, *step, *visible))
            .collect();

        let expected = steps
            .iter()
            .filter(|(_, visible)| *visible)
            .fold(start, |n, (step, _)| step.apply(n));

        prop_assert_eq!(set.call(&(), start), expected);
    }

    /// After evaluation, the applied subset equals the renderable subset for
    /// plain builders.
    #[test]
    fn applied_equals_renderable_for_plain_builders(
        steps in prop::collection::vec((step_strategy(), any::<bool>()), 0..12),
    ) {
        let mut set: QueryBuilderSet<_> = steps
            .iter()
            .enumerate()
            .map(|(i, (step, visible))| builder(i, *step, *visible))
            .collect();

        set.call(&(), 1);
        let applied = set.applied();
        let renderable = set.renderable(&());
        prop_assert_eq!(applied.names(), renderable.names());
    }

    /// A filter reports applied exactly when the user supplied a present value.
    #[test]
    fn filter_applied_iff_user_value_present(
        value in value_strategy(),
        default in prop::option::of(value_strategy()),
    ) {
        let mut settings = Settings::new().value(value.clone());
        if let Some(default) = default.clone() {
            settings = settings.default(default);
        }
        let mut filter = Filter::new("f", settings, |_: &(), n: usize, _: &Value| n + 1).unwrap();

        let result = filter.call(&(), 0);

        let default_present = default.as_ref().map(|d| !is_blank(d)).unwrap_or(false);
        let ran = !is_blank(&value) || default_present;
        prop_assert_eq!(result, usize::from(ran));
        prop_assert_eq!(filter.is_applied(), !is_blank(&value));
    }
}
