// vim: tw=80
#![deny(warnings)]

use mimicry::matchers::*;

#[derive(Debug)]
struct Point {
    x: i32,
    y: i32,
}

#[test]
fn anything_matches_everything() {
    assert!(anything().matches(&0));
    assert!(anything().matches(&"whatever"));
    assert_eq!("is anything", anything::<i32>().describe());
}

#[test]
fn relations() {
    assert!(eq(4).matches(&4));
    assert!(!eq(4).matches(&5));
    assert!(ne(4).matches(&5));
    assert!(lt(4).matches(&3));
    assert!(le(4).matches(&4));
    assert!(gt(4).matches(&5));
    assert!(ge(4).matches(&4));
    assert_eq!("is equal to 4", eq(4).describe());
    assert_eq!("isn't equal to 4", eq(4).describe_negation());
}

#[test]
fn pair_relations() {
    assert!(eq2::<i32>().matches(&(3, 3)));
    assert!(lt2::<i32>().matches(&(3, 4)));
    assert!(!gt2::<i32>().matches(&(3, 4)));
}

#[test]
fn string_matchers_are_generic_over_the_value_type() {
    assert!(str_eq("abc").matches(&"abc"));
    assert!(str_eq("abc").matches(&"abc".to_owned()));
    assert!(str_case_eq("ABC").matches(&"abc"));
    assert!(has_substr("ell").matches(&"hello"));
    assert!(starts_with("he").matches(&"hello"));
    assert!(ends_with("lo").matches(&"hello"));
    assert!(!starts_with("lo").matches(&"hello"));
}

#[test]
fn regex_matchers() {
    assert!(matches_regex(r"^\d+$").matches(&"12345"));
    assert!(!matches_regex(r"^\d+$").matches(&"12345x"));
    assert!(contains_regex(r"\d+").matches(&"abc123def"));
}

#[test]
fn float_matchers() {
    assert!(float_eq(1.0).matches(&1.0f32));
    assert!(!float_eq(1.0).matches(&1.1f32));
    // One ULP away still matches.
    assert!(float_eq(1.0).matches(&f32::from_bits(1.0f32.to_bits() + 1)));
    assert!(float_near(1.0, 0.25).matches(&1.2f32));
    assert!(double_near(100.0, 0.5).matches(&100.4f64));

    // A NaN expectation never matches unless NaN-sensitive.
    assert!(!float_eq(f32::NAN).matches(&f32::NAN));
    assert!(nan_sensitive_float_eq(f32::NAN).matches(&f32::NAN));
    assert!(is_nan::<f64>().matches(&f64::NAN));
    assert!(!is_nan::<f64>().matches(&0.0));
}

#[test]
fn field_matcher_projects_into_a_struct() {
    let m = field("x", |p: &Point| &p.x, eq(3));
    assert!(m.matches(&Point { x: 3, y: 9 }));
    let (ok, why) = m.explain(&Point { x: 4, y: 9 });
    assert!(!ok);
    assert!(why.contains("field `x`"), "{why}");

    let m = field("y", |p: &Point| &p.y, gt(0));
    assert!(m.matches(&Point { x: 0, y: 9 }));
}

#[test]
fn result_of_applies_a_function_first() {
    let m = result_of("length", |s: &String| s.len(), eq(5));
    assert!(m.matches(&"hello".to_owned()));
    assert!(!m.matches(&"hi".to_owned()));
}

#[test]
fn pointer_matchers() {
    let boxed = Box::new(7);
    assert!(pointee(eq(7)).matches(&boxed));
    assert!(!pointee(eq(8)).matches(&boxed));

    let absent: Option<i32> = None;
    assert!(is_null::<Option<i32>>().matches(&absent));
    assert!(not_null::<Option<i32>>().matches(&Some(1)));
    // A null pointer fails pointee without consulting the inner matcher.
    assert!(!pointee(eq(7)).matches(&absent));
}

#[test]
fn same_address_compares_identity_not_value() {
    let a = 7;
    let b = 7;
    assert!(same_address(&a as *const i32).matches(&(&a as *const i32)));
    assert!(!same_address(&a as *const i32).matches(&(&b as *const i32)));
}

#[test]
fn matching_wraps_a_predicate_with_a_description() {
    let even = matching("is even", |x: &i32| x % 2 == 0);
    assert!(even.matches(&2));
    assert!(!even.matches(&3));
    assert_eq!("is even", even.describe());
    assert_eq!("not (is even)", even.describe_negation());
}

#[test]
fn satisfies_wraps_a_predicates_predicate() {
    use mimicry::predicate;

    let m = satisfies(predicate::in_iter(vec![1, 2, 3]));
    assert!(m.matches(&2));
    assert!(!m.matches(&9));
}

#[test]
fn cast_adapts_a_matcher_to_a_borrowing_type() {
    let m: Matcher<Box<i32>> = eq(7).cast();
    assert!(m.matches(&Box::new(7)));
    assert!(!m.matches(&Box::new(8)));
    assert_eq!("is equal to 7", m.describe());
}
