use parking_lot::Mutex;
use promise_chain::{Error, Future, Observable, Outcome, Promise};
use proptest::prelude::*;
use std::sync::Arc;

fn settled(outcome: &Outcome<i64>) -> Future<i64> {
    match outcome {
        Ok(value) => Future::fulfilled(*value),
        Err(error) => Future::rejected(error.clone()),
    }
}

fn observe(future: &Future<i64>) -> Result<i64, String> {
    future.wait().map_err(|e| e.to_string())
}

fn outcome_strategy() -> impl Strategy<Value = Outcome<i64>> {
    prop_oneof![
        any::<i32>().prop_map(|v| Ok(i64::from(v))),
        "[a-z]{1,8}".prop_map(|m| Err(Error::msg(m))),
    ]
}

fn values_and_fulfillment_order() -> impl Strategy<Value = (Vec<i64>, Vec<usize>)> {
    prop::collection::vec(any::<i64>(), 0..16).prop_flat_map(|values| {
        let indices: Vec<usize> = (0..values.len()).collect();
        (Just(values), Just(indices).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn map_identity_is_observationally_equal(outcome in outcome_strategy()) {
        let future = settled(&outcome);
        prop_assert_eq!(observe(&future.map(|v| v)), observe(&future));
    }

    #[test]
    fn map_composes(outcome in outcome_strategy()) {
        let f = |v: i64| v.wrapping_mul(3);
        let g = |v: i64| v.wrapping_sub(7);
        let future = settled(&outcome);
        prop_assert_eq!(observe(&future.map(f).map(g)), observe(&future.map(move |v| g(f(v)))));
    }

    #[test]
    fn first_resolution_wins(first in outcome_strategy(), rest in prop::collection::vec(outcome_strategy(), 0..5)) {
        let promise = Promise::<i64>::new();
        promise.settle(first.clone());
        for outcome in rest {
            promise.settle(outcome);
        }
        prop_assert_eq!(observe(&promise.proxy()), observe(&settled(&first)));
    }

    #[test]
    fn callbacks_fire_once_in_registration_order(count in 1usize..32) {
        let promise = Promise::<i64>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for id in 0..count {
            let log = log.clone();
            promise.proxy().submit(move |_| log.lock().push(id));
        }
        promise.fulfill(1);
        promise.fulfill(2);
        prop_assert_eq!(log.lock().clone(), (0..count).collect::<Vec<_>>());
    }

    #[test]
    fn combine_follows_source_order((values, order) in values_and_fulfillment_order()) {
        let promises: Vec<Promise<i64>> = values.iter().map(|_| Promise::new()).collect();
        let combined = Future::combine(promises.iter().map(Promise::proxy));
        for index in order {
            promises[index].fulfill(values[index]);
        }
        prop_assert_eq!(combined.current_value(), Some(values));
    }
}
