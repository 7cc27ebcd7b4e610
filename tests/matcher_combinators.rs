// vim: tw=80
#![deny(warnings)]

use std::any::Any;

use mimicry::matchers::*;

#[test]
fn not_inverts_and_swaps_descriptions() {
    let m = not(eq(3));
    assert!(m.matches(&4));
    assert!(!m.matches(&3));
    assert_eq!("isn't equal to 3", m.describe());
    assert_eq!("is equal to 3", m.describe_negation());
}

#[test]
fn all_of_requires_every_matcher() {
    let m = all_of(vec![gt(0), lt(10), ne(5)]);
    assert!(m.matches(&7));
    assert!(!m.matches(&5));
    assert!(!m.matches(&-1));
    assert_eq!("(is > 0) and (is < 10) and (isn't equal to 5)",
        m.describe());
}

#[test]
fn any_of_requires_at_least_one() {
    let m = any_of(vec![lt(0), gt(10)]);
    assert!(m.matches(&-1));
    assert!(m.matches(&11));
    assert!(!m.matches(&5));
}

#[test]
fn empty_combinators_follow_the_identities() {
    assert!(all_of::<i32, _>(vec![]).matches(&42));
    assert!(!any_of::<i32, _>(vec![]).matches(&42));
}

#[test]
fn a_large_conjunction_still_works() {
    let m = all_of((0..50).map(|_| gt(0)).collect::<Vec<_>>());
    assert!(m.matches(&1));
    assert!(!m.matches(&0));
}

#[test]
fn all_of_failure_explains_the_first_failing_matcher() {
    let m = all_of(vec![gt(0), eq(9)]);
    let (ok, _) = m.explain(&3);
    assert!(!ok);
}

#[test]
fn conditional_picks_a_branch_up_front() {
    let strict = false;
    let m = conditional(strict, eq(5), anything());
    assert!(m.matches(&42));
    let m = conditional(!strict, eq(5), anything());
    assert!(!m.matches(&42));
}

#[test]
fn key_and_pair_project_tuples() {
    let entry = (3, "three");
    assert!(key(eq(3)).matches(&entry));
    assert!(!key(eq(4)).matches(&entry));
    assert!(pair(eq(3), str_eq("three")).matches(&entry));
    assert!(!pair(eq(3), str_eq("four")).matches(&entry));
}

#[test]
fn fields_are_matches_tuples_positionally() {
    let m = fields_are((eq(1), str_eq("one"), gt(0.5f64)));
    assert!(m.matches(&(1, "one", 0.9)));
    assert!(!m.matches(&(1, "one", 0.1)));
    let desc = m.describe();
    assert!(desc.contains("field #0"), "{desc}");
}

#[test]
fn downcasts_to_matches_the_concrete_type() {
    let value: Box<dyn Any> = Box::new(7i32);
    let m = downcasts_to::<i32>(eq(7));
    assert!(m.matches(value.as_ref()));
    assert!(!downcasts_to::<i32>(eq(8)).matches(value.as_ref()));
    assert!(!downcasts_to::<String>(anything()).matches(value.as_ref()));
}

#[test]
fn combinators_nest() {
    let m = not(any_of(vec![
        all_of(vec![gt(0), lt(10)]),
        eq(100),
    ]));
    assert!(m.matches(&50));
    assert!(!m.matches(&5));
    assert!(!m.matches(&100));
}
