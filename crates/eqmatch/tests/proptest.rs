//! Property-based tests for eqmatch using proptest.

use proptest::prelude::*;
use eqmatch::{
    Bounds, DictSettings, Expected, HasLen, IsApprox, IsDict, IsInt, IsListOrTuple, Matcher,
    Value,
};

// ============================================================================
// Test helpers
// ============================================================================

fn greater_than(n: i64) -> IsInt {
    IsInt::bounded(Bounds::new().gt(n)).unwrap()
}

fn less_than(n: i64) -> IsInt {
    IsInt::bounded(Bounds::new().lt(n)).unwrap()
}

fn literals(items: &[i64]) -> Vec<Expected> {
    items.iter().map(|&n| Expected::from(n)).collect()
}

fn entries(map: &[(String, i64)]) -> Vec<(Value, Expected)> {
    map.iter()
        .map(|(k, v)| (Value::from(k.as_str()), Expected::from(*v)))
        .collect()
}

// Strategy for a list and a shuffled copy of it
fn shuffled_pair() -> impl Strategy<Value = (Vec<i64>, Vec<i64>)> {
    prop::collection::vec(0i64..5, 0..12)
        .prop_flat_map(|items| (Just(items.clone()), Just(items).prop_shuffle()))
}

// Strategy for a small dict with unique keys
fn dict_entries() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::btree_map("[a-e]", any::<i64>(), 0..5)
        .prop_map(|map| map.into_iter().collect())
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// `a | b` matches exactly when either side does.
    #[test]
    fn any_of_is_disjunction(x in any::<i64>(), lo in any::<i64>(), hi in any::<i64>()) {
        let candidate = Value::from(x);
        let expected = greater_than(lo).matches(&candidate) || less_than(hi).matches(&candidate);
        prop_assert_eq!((greater_than(lo) | less_than(hi)).matches(&candidate), expected);
    }

    /// `a & b` matches exactly when both sides do.
    #[test]
    fn all_of_is_conjunction(x in any::<i64>(), lo in any::<i64>(), hi in any::<i64>()) {
        let candidate = Value::from(x);
        let expected = greater_than(lo).matches(&candidate) && less_than(hi).matches(&candidate);
        prop_assert_eq!((greater_than(lo) & less_than(hi)).matches(&candidate), expected);
    }

    /// `!a` matches exactly when `a` does not.
    #[test]
    fn inverted_is_negation(x in any::<i64>(), lo in any::<i64>()) {
        let candidate = Value::from(x);
        prop_assert_eq!((!greater_than(lo)).matches(&candidate), !greater_than(lo).matches(&candidate));
    }

    /// Double negation matches like the un-negated matcher.
    #[test]
    fn double_negation(x in any::<i64>(), lo in any::<i64>()) {
        let candidate = Value::from(x);
        prop_assert_eq!((!!greater_than(lo)).matches(&candidate), greater_than(lo).matches(&candidate));
    }

    /// Any permutation of the items matches the unordered matcher.
    #[test]
    fn unordered_accepts_permutations((items, shuffled) in shuffled_pair()) {
        let m = IsListOrTuple::unordered(literals(&items));
        prop_assert!(m.matches(&Value::list(shuffled)));
    }

    /// Replacing one element with an absent value breaks the multiset match.
    #[test]
    fn unordered_rejects_changed_multiset(
        (items, shuffled) in shuffled_pair(),
        index in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!shuffled.is_empty());
        let mut changed = shuffled;
        let at = index.index(changed.len());
        changed[at] = 99;
        let m = IsListOrTuple::unordered(literals(&items));
        prop_assert!(!m.matches(&Value::list(changed)));
    }

    /// The ordered matcher accepts its own items and only permutations that
    /// leave them unchanged.
    #[test]
    fn ordered_matches_only_identical((items, shuffled) in shuffled_pair()) {
        let m = IsListOrTuple::new(literals(&items));
        prop_assert!(m.matches(&Value::list(items.clone())));
        prop_assert_eq!(m.matches(&Value::tuple(shuffled.clone())), items == shuffled);
    }

    /// HasLen agrees with the list length.
    #[test]
    fn has_len_matches_length(items in prop::collection::vec(any::<i64>(), 0..20), n in 0usize..20) {
        prop_assert_eq!(HasLen::exact(n).matches(&Value::list(items.clone())), items.len() == n);
    }

    /// An explicit delta is an inclusive tolerance.
    #[test]
    fn approx_delta_is_inclusive(target in -1_000_000i64..1_000_000, offset in -100i64..100, delta in 0i64..100) {
        let m = IsApprox::with_delta(target, delta);
        prop_assert_eq!(m.matches(&Value::from(target + offset)), offset.abs() <= delta);
    }

    /// Dicts match their own entries regardless of key order.
    #[test]
    fn dict_matches_own_entries(map in dict_entries()) {
        let reversed: Vec<(String, i64)> = map.iter().rev().cloned().collect();
        let candidate = Value::dict(reversed);
        prop_assert!(IsDict::new(entries(&map)).matches(&candidate));
    }

    /// Only the last partial setting counts, and the base never changes.
    #[test]
    fn settings_are_last_write_wins(
        map in dict_entries(),
        toggles in prop::collection::vec(any::<bool>(), 1..6),
    ) {
        let base = IsDict::new(entries(&map));
        let mut current = base.clone();
        for &partial in &toggles {
            current = current.settings(DictSettings::new().partial(partial)).unwrap();
        }
        let last = *toggles.last().unwrap();
        prop_assert_eq!(current.is_partial(), last);
        prop_assert!(!base.is_partial());

        let mut extended = map.clone();
        extended.push(("zz".to_string(), 0));
        let candidate = Value::dict(extended);
        prop_assert_eq!(current.matches(&candidate), last);
        prop_assert!(!base.matches(&candidate));
    }

    /// `!=` never overwrites what a prior `==` recorded.
    #[test]
    fn differs_preserves_state(x in any::<i64>(), y in any::<i64>()) {
        let m = IsInt::new();
        prop_assert!(m.matches(&Value::from(x)));
        let _ = m.differs(&Value::from(y));
        let _ = m.differs(&Value::from("text"));
        prop_assert_eq!(m.value().unwrap(), Value::from(x));
    }
}
