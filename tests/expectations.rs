// vim: tw=80
#![deny(warnings)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use mimicry::{
    actions::{by_move, from_fn, invoke, return_const},
    matchers::{eq, gt, lt},
    MockMethod,
};

#[test]
fn a_bare_expectation_means_exactly_one_call() {
    let m = MockMethod::<(i32,), i32>::new("frob");
    m.expect().will_once(return_const(1));
    assert_eq!(1, m.call((0,)));
    m.checkpoint();
}

#[test]
#[should_panic(expected = "unsatisfied expectation on frob")]
fn an_uncalled_expectation_fails_the_checkpoint() {
    let m = MockMethod::<(i32,), i32>::new("frob");
    m.expect().will_once(return_const(1));
    m.checkpoint();
}

#[test]
fn will_once_clauses_queue_in_order() {
    let m = MockMethod::<(), &'static str>::new("next");
    m.expect()
        .will_once(return_const("first"))
        .will_once(return_const("second"))
        .will_repeatedly(return_const("rest"));
    assert_eq!("first", m.call(()));
    assert_eq!("second", m.call(()));
    assert_eq!("rest", m.call(()));
    assert_eq!("rest", m.call(()));
}

#[test]
fn explicit_times_overrides_inference() {
    let m = MockMethod::<(), i32>::new("poll");
    m.expect().times(3).will_repeatedly(return_const(1));
    m.call(());
    m.call(());
    m.call(());
    m.checkpoint();
}

#[test]
#[should_panic(expected = "called more than expected")]
fn a_saturated_expectation_rejects_further_calls() {
    let m = MockMethod::<(), i32>::new("poll");
    m.expect().times(1).will_repeatedly(return_const(1));
    m.call(());
    m.call(());
}

#[test]
fn ranged_cardinality() {
    let m = MockMethod::<(), ()>::new("tick");
    m.expect().times(1..=3).will_repeatedly(return_const(()));
    m.call(());
    m.call(());
    m.checkpoint();
}

#[test]
#[should_panic(expected = "never called")]
fn range_lower_bound_is_enforced() {
    let m = MockMethod::<(), ()>::new("tick");
    m.expect().times(2..=3).will_repeatedly(return_const(()));
    m.checkpoint();
}

#[test]
fn newer_expectations_take_precedence() {
    let m = MockMethod::<(i32,), &'static str>::new("classify");
    m.expect().times_any().will_repeatedly(return_const("general"));
    m.expect()
        .with_args((eq(0),))
        .times_any()
        .will_repeatedly(return_const("zero"));
    assert_eq!("zero", m.call((0,)));
    assert_eq!("general", m.call((5,)));
    assert_eq!("zero", m.call((0,)));
}

#[test]
fn a_saturated_expectation_yields_to_an_older_match() {
    let m = MockMethod::<(i32,), &'static str>::new("classify");
    m.expect().times_any().will_repeatedly(return_const("fallback"));
    m.expect().times(1).will_once(return_const("first"));
    assert_eq!("first", m.call((0,)));
    assert_eq!("fallback", m.call((0,)));
}

#[test]
fn retires_on_saturation_steps_aside() {
    let m = MockMethod::<(i32,), &'static str>::new("classify");
    m.expect()
        .with_args((gt(0),))
        .times_any()
        .will_repeatedly(return_const("positive"));
    m.expect()
        .with_args((eq(7),))
        .times(1)
        .will_once(return_const("lucky"))
        .retires_on_saturation();
    assert_eq!("lucky", m.call((7,)));
    assert_eq!("positive", m.call((7,)));
}

#[test]
#[should_panic(expected = "no matching expectation found for frob((-3,))")]
fn an_unexpected_call_lists_the_candidates() {
    let m = MockMethod::<(i32,), i32>::new("frob");
    m.expect().with_args((gt(0),)).will_once(return_const(1));
    let _ = m.call((-3,));
}

#[test]
fn matchers_combine_per_argument() {
    let m = MockMethod::<(i32, i32), i32>::new("clamp");
    m.expect()
        .with_args((gt(0), lt(100)))
        .will_once(invoke(|a: i32, b: i32| a.min(b)));
    assert_eq!(5, m.call((5, 50)));
}

#[test]
fn withf_takes_the_packed_tuple() {
    let m = MockMethod::<(i32, i32), bool>::new("ordered");
    m.expect()
        .withf(|&(a, b): &(i32, i32)| a <= b)
        .times_any()
        .will_repeatedly(return_const(true));
    assert!(m.call((1, 2)));
}

#[test]
fn by_move_hands_out_a_non_clone_value() {
    struct Opaque(u32);
    let m = MockMethod::<(), Opaque>::new("take");
    m.expect().will_once(by_move(Opaque(7)));
    assert_eq!(7, m.call(()).0);
}

#[test]
fn checkpoint_verifies_and_forgets() {
    let m = MockMethod::<(), i32>::new("phase");
    m.expect().will_once(return_const(1));
    m.call(());
    m.checkpoint();

    m.expect().will_once(return_const(2));
    assert_eq!(2, m.call(()));
    m.checkpoint();
}

#[test]
fn actions_may_reenter_the_mock() {
    let m = Arc::new(MockMethod::<(u32,), u32>::new("countdown"));
    let inner = m.clone();
    m.expect().with_args((eq(0u32),)).will_once(return_const(0));
    m.expect()
        .with_args((gt(0u32),))
        .times_any()
        .will_repeatedly(from_fn(move |(n,): (u32,)| {
            inner.call((n - 1,)) + 1
        }));
    assert_eq!(3, m.call((3,)));
}

#[test]
fn expectations_work_across_threads() {
    let m = Arc::new(MockMethod::<(usize,), usize>::new("work"));
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    m.expect()
        .times(8)
        .will_repeatedly(from_fn(move |(n,): (usize,)| {
            c.fetch_add(1, Ordering::Relaxed);
            n * 2
        }));
    let handles = (0..8)
        .map(|i| {
            let m = m.clone();
            std::thread::spawn(move || m.call((i,)))
        })
        .collect::<Vec<_>>();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(8, calls.load(Ordering::Relaxed));
    m.checkpoint();
}

mod clause_grammar {
    use super::*;

    #[test]
    #[should_panic(expected = "`.with()` must be the first clause")]
    fn with_after_times() {
        let m = MockMethod::<(i32,), ()>::new("frob");
        m.expect().times(1).with_args((eq(1),));
    }

    #[test]
    #[should_panic(expected = "at most once per expectation")]
    fn duplicate_times() {
        let m = MockMethod::<(), ()>::new("frob");
        m.expect().times(1).times(2);
    }

    #[test]
    #[should_panic(expected = "must all precede `.will_repeatedly()`")]
    fn will_once_after_will_repeatedly() {
        let m = MockMethod::<(), ()>::new("frob");
        m.expect()
            .will_repeatedly(return_const(()))
            .will_once(return_const(()));
    }

    #[test]
    #[should_panic(expected = "must precede `.will_once()`")]
    fn in_sequence_after_actions() {
        let mut seq = mimicry::Sequence::new();
        let m = MockMethod::<(), ()>::new("frob");
        m.expect().will_once(return_const(())).in_sequence(&mut seq);
    }

    #[test]
    #[should_panic(expected = "must be the last clause")]
    fn retires_on_saturation_must_be_last() {
        let m = MockMethod::<(), ()>::new("frob");
        m.expect()
            .retires_on_saturation()
            .will_once(return_const(()));
    }
}
