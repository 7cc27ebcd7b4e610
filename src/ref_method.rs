// vim: tw=80
//! Mock methods that lend out references to stored return values.
//!
//! A [`MockMethod`](crate::MockMethod) hands each call's return value to
//! the caller by value, so it cannot stand in for methods that return
//! `&T` or `&mut T` borrowed from the mock itself.  [`RefMockMethod`]
//! and [`RefMutMockMethod`] cover those signatures: each expectation
//! owns the value to lend, and the call borrows it for as long as the
//! mock is borrowed.

use std::fmt;
use std::fmt::Write as _;
use std::panic::Location;
use std::sync::Arc;
use std::thread;

use fragile::Fragile;

use crate::cardinality::{any_number, never, Cardinality};
use crate::expectation::ExpectationCore;
use crate::matchers::{anything, fields_are, matching, Matcher, MatcherTuple};
use crate::report::{verbosity_at_least, Verbosity};
use crate::sequence::Sequence;

/// The builder clauses shared by both reference expectation types.
macro_rules! ref_builder_common {
    ($klass:ident) => {
        /// Restrict the expectation to calls whose packed arguments
        /// match.  Must be the first clause, if present.
        pub fn with(&mut self, matcher: Matcher<I>) -> &mut Self {
            self.core.clause_with();
            self.matcher = matcher;
            self
        }

        /// Like [`with`](Self::with), taking one matcher per argument.
        pub fn with_args<M>(&mut self, matchers: M) -> &mut Self
        where
            M: MatcherTuple<I> + 'static,
        {
            self.with(fields_are(matchers))
        }

        /// Like [`with`](Self::with), taking a plain predicate over the
        /// packed arguments.
        pub fn withf<F>(&mut self, f: F) -> &mut Self
        where
            F: Fn(&I) -> bool + Send + Sync + 'static,
        {
            self.with(matching("matches the given predicate", f))
        }

        /// Require the call count to satisfy `cardinality`.
        pub fn times(&mut self, cardinality: impl Into<Cardinality>)
            -> &mut Self
        {
            self.core.clause_times(cardinality.into());
            self
        }

        /// Allow any number of calls.
        pub fn times_any(&mut self) -> &mut Self {
            self.times(any_number())
        }

        /// Require exactly one call.
        pub fn once(&mut self) -> &mut Self {
            self.times(1)
        }

        /// Forbid any calls.
        pub fn never(&mut self) -> &mut Self {
            self.times(never())
        }

        /// Add this expectation to the end of `seq`.
        pub fn in_sequence(&mut self, seq: &mut Sequence) -> &mut Self {
            self.core.clause_in_sequence();
            seq.add(&self.core);
            self
        }

        /// Require `prereq` to be satisfied before this expectation may
        /// match.
        pub fn after<I2, O2>(&mut self, prereq: &$klass<I2, O2>)
            -> &mut Self
        {
            self.core.clause_in_sequence();
            self.core.add_prerequisite(Arc::downgrade(&prereq.core));
            self
        }

        /// Retire this expectation as soon as it is saturated.
        pub fn retires_on_saturation(&mut self) -> &mut Self {
            self.core.clause_retires_on_saturation();
            self
        }
    }
}

/// An expectation on a [`RefMockMethod`].  Unless given an explicit
/// call count it allows any number of calls, since the stored value can
/// be lent out repeatedly.
pub struct RefExpectation<I, O> {
    core: Arc<ExpectationCore>,
    matcher: Matcher<I>,
    result: Option<O>,
}

impl<I: 'static, O> RefExpectation<I, O> {
    fn new(method: &str, location: &'static Location<'static>) -> Self {
        RefExpectation {
            core: ExpectationCore::new(method, location),
            matcher: anything(),
            result: None,
        }
    }

    /// Store `o`; every matching call borrows it.
    pub fn return_const(&mut self, o: O) -> &mut Self {
        if self.result.is_none() {
            self.core.clause_will_repeatedly();
        }
        self.result = Some(o);
        self
    }

    ref_builder_common!{RefExpectation}
}

/// An expectation on a [`RefMutMockMethod`].
pub struct RefMutExpectation<I, O> {
    core: Arc<ExpectationCore>,
    matcher: Matcher<I>,
    result: Option<O>,
    rfunc: Option<Box<dyn FnMut(I) -> O + Send + Sync>>,
}

impl<I: 'static, O> RefMutExpectation<I, O> {
    fn new(method: &str, location: &'static Location<'static>) -> Self {
        RefMutExpectation {
            core: ExpectationCore::new(method, location),
            matcher: anything(),
            result: None,
            rfunc: None,
        }
    }

    fn has_action(&self) -> bool {
        self.result.is_some() || self.rfunc.is_some()
    }

    /// Store `o`; every matching call borrows it mutably.  Changes made
    /// through the borrow are visible to later calls.
    pub fn return_var(&mut self, o: O) -> &mut Self {
        if !self.has_action() {
            self.core.clause_will_repeatedly();
        }
        self.result = Some(o);
        self
    }

    /// Compute a fresh value from the arguments on every matching call,
    /// then lend it out mutably.
    pub fn returning<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(I) -> O + Send + Sync + 'static,
    {
        if !self.has_action() {
            self.core.clause_will_repeatedly();
        }
        self.rfunc = Some(Box::new(f));
        self
    }

    /// Single-threaded version of [`returning`](Self::returning).  Can
    /// be used when the argument or return type isn't `Send`.
    pub fn returning_st<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(I) -> O + 'static,
    {
        let mut fragile = Fragile::new(f);
        self.returning(move |args| (fragile.get_mut())(args))
    }

    ref_builder_common!{RefMutExpectation}
}

/// Internal view of an expectation used by the shared dispatch scan.
trait Candidate<I> {
    fn core(&self) -> &Arc<ExpectationCore>;
    fn matcher(&self) -> &Matcher<I>;
}

impl<I, O> Candidate<I> for RefExpectation<I, O> {
    fn core(&self) -> &Arc<ExpectationCore> {
        &self.core
    }

    fn matcher(&self) -> &Matcher<I> {
        &self.matcher
    }
}

impl<I, O> Candidate<I> for RefMutExpectation<I, O> {
    fn core(&self) -> &Arc<ExpectationCore> {
        &self.core
    }

    fn matcher(&self) -> &Matcher<I> {
        &self.matcher
    }
}

/// The scan itself: newest first, skipping retired expectations,
/// argument mismatches, and unsatisfied prerequisites.  Unlike a
/// by-value mock method there is no default value to fall back on, so a
/// call with no matching expectation always panics.
fn select<I, C>(name: &str, expectations: &[C], args: &I) -> usize
where
    I: fmt::Debug,
    C: Candidate<I>,
{
    if expectations.is_empty() {
        panic!("no expectations set for {}({:?})", name, args);
    }
    let mut saturated = None;
    for (i, e) in expectations.iter().enumerate().rev() {
        let core = e.core();
        if core.is_retired()
            || !e.matcher().matches(args)
            || !core.all_prerequisites_satisfied()
        {
            continue;
        }
        if core.is_saturated() {
            saturated.get_or_insert(i);
            continue;
        }
        core.retire_prerequisites();
        core.record_call();
        if verbosity_at_least(Verbosity::Info) {
            tracing::info!(
                method = %name,
                location = %core.location(),
                "expected mock method call"
            );
        }
        return i;
    }
    if let Some(i) = saturated {
        let core = expectations[i].core();
        panic!(
            "expectation on {} set at {} called more than expected: {}",
            name, core.location(), core.describe_state()
        );
    }
    panic!("{}", describe_unexpected(name, expectations, args));
}

fn describe_unexpected<I, C>(name: &str, expectations: &[C], args: &I)
    -> String
where
    I: fmt::Debug,
    C: Candidate<I>,
{
    let mut msg = format!(
        "no matching expectation found for {}({:?})\ntried \
         expectations:",
        name, args
    );
    for (i, e) in expectations.iter().enumerate() {
        let core = e.core();
        let _ = write!(msg, "\n#{} set at {}: expected args {}",
            i, core.location(), e.matcher().describe());
        let (_, why) = e.matcher().explain(args);
        if !why.is_empty() {
            let _ = write!(msg, ", {why}");
        }
        let _ = write!(msg, "; {}", core.describe_state());
    }
    msg
}

/// A mock method returning `&O` borrowed from the mock object.
///
/// # Examples
/// ```
/// use mimicry::RefMockMethod;
///
/// let mut name = RefMockMethod::<(), String>::new("name");
/// name.expect().return_const("mimic".to_owned());
/// assert_eq!("mimic", name.call(()));
/// ```
pub struct RefMockMethod<I, O> {
    name: String,
    expectations: Vec<RefExpectation<I, O>>,
}

impl<I: 'static, O> RefMockMethod<I, O> {
    pub fn new(name: impl Into<String>) -> Self {
        RefMockMethod {
            name: name.into(),
            expectations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a new expectation, which takes precedence over all earlier
    /// ones whose argument matchers overlap with it.
    #[track_caller]
    pub fn expect(&mut self) -> &mut RefExpectation<I, O> {
        let e = RefExpectation::new(&self.name, Location::caller());
        self.expectations.push(e);
        self.expectations.last_mut().unwrap()
    }

    /// Dispatch a call, borrowing the selected expectation's stored
    /// value.  Panics if no expectation matches or the selected one has
    /// no value set.
    pub fn call(&self, args: I) -> &O
    where
        I: fmt::Debug,
    {
        let i = select(&self.name, &self.expectations, &args);
        let e = &self.expectations[i];
        match e.result.as_ref() {
            Some(o) => o,
            None => panic!(
                "no return value set for {} expectation at {}: use \
                 `return_const`",
                self.name, e.core.location()
            ),
        }
    }

    /// Verifies all expectations, panicking on the first unsatisfied
    /// one, then forgets them.
    pub fn checkpoint(&mut self) {
        for e in &self.expectations {
            e.core.verify();
        }
        self.expectations.clear();
    }
}

impl<I, O> Drop for RefMockMethod<I, O> {
    fn drop(&mut self) {
        if !thread::panicking() {
            for e in &self.expectations {
                e.core.verify();
            }
        }
    }
}

/// A mock method returning `&mut O` borrowed from the mock object.
///
/// # Examples
/// ```
/// use mimicry::RefMutMockMethod;
///
/// let mut counter = RefMutMockMethod::<(), u32>::new("counter");
/// counter.expect().return_var(0u32);
/// *counter.call_mut(()) += 1;
/// *counter.call_mut(()) += 1;
/// assert_eq!(2, *counter.call_mut(()));
/// ```
pub struct RefMutMockMethod<I, O> {
    name: String,
    expectations: Vec<RefMutExpectation<I, O>>,
}

impl<I: 'static, O> RefMutMockMethod<I, O> {
    pub fn new(name: impl Into<String>) -> Self {
        RefMutMockMethod {
            name: name.into(),
            expectations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a new expectation, which takes precedence over all earlier
    /// ones whose argument matchers overlap with it.
    #[track_caller]
    pub fn expect(&mut self) -> &mut RefMutExpectation<I, O> {
        let e = RefMutExpectation::new(&self.name, Location::caller());
        self.expectations.push(e);
        self.expectations.last_mut().unwrap()
    }

    /// Dispatch a call, lending out the selected expectation's value
    /// mutably.  An expectation configured with `returning` recomputes
    /// its value from the arguments on every call; one configured with
    /// `return_var` keeps lending the same value, so mutations made
    /// through the borrow persist.
    pub fn call_mut(&mut self, args: I) -> &mut O
    where
        I: fmt::Debug,
    {
        let i = select(&self.name, &self.expectations, &args);
        let e = &mut self.expectations[i];
        if let Some(f) = e.rfunc.as_mut() {
            e.result = Some(f(args));
        }
        match e.result.as_mut() {
            Some(o) => o,
            None => panic!(
                "no return value set for {} expectation at {}: use \
                 `return_var` or `returning`",
                self.name, e.core.location()
            ),
        }
    }

    /// Verifies all expectations, panicking on the first unsatisfied
    /// one, then forgets them.
    pub fn checkpoint(&mut self) {
        for e in &self.expectations {
            e.core.verify();
        }
        self.expectations.clear();
    }
}

impl<I, O> Drop for RefMutMockMethod<I, O> {
    fn drop(&mut self) {
        if !thread::panicking() {
            for e in &self.expectations {
                e.core.verify();
            }
        }
    }
}

#[cfg(test)]
mod t {
    use super::*;

    use crate::matchers::{eq, gt};
    use crate::mock::MockMethod;
    use crate::actions::return_const;

    #[test]
    fn returns_a_reference_to_the_stored_value() {
        let mut m = RefMockMethod::<(i32,), String>::new("label");
        m.expect().return_const("stored".to_owned());
        let r = m.call((1,));
        assert_eq!("stored", r);
        // The borrow is tied to the mock, not to the call.
        assert_eq!("stored", m.call((2,)));
    }

    #[test]
    fn newest_matching_expectation_wins() {
        let mut m = RefMockMethod::<(i32,), &'static str>::new("label");
        m.expect().return_const("general");
        m.expect().with_args((eq(5),)).return_const("special");
        assert_eq!(&"special", m.call((5,)));
        assert_eq!(&"general", m.call((6,)));
    }

    #[test]
    fn with_takes_a_matcher_over_the_packed_arguments() {
        let mut m = RefMockMethod::<(i32, i32), &'static str>::new("pair");
        m.expect()
            .with(fields_are((eq(1), eq(2))))
            .return_const("matched");
        assert_eq!(&"matched", m.call((1, 2)));
    }

    #[test]
    #[should_panic(expected = "no expectations set for label((9,))")]
    fn uninteresting_call_panics() {
        let m = RefMockMethod::<(i32,), String>::new("label");
        m.call((9,));
    }

    #[test]
    #[should_panic(expected = "no matching expectation found for label((9,))")]
    fn unexpected_call_panics() {
        let mut m = RefMockMethod::<(i32,), String>::new("label");
        m.expect().with_args((gt(100),)).return_const("big".to_owned());
        let _ = m.call((9,));
        m.checkpoint();
    }

    #[test]
    #[should_panic(expected = "use `return_const`")]
    fn missing_return_value_panics() {
        let mut m = RefMockMethod::<(), String>::new("label");
        m.expect().times_any();
        m.call(());
    }

    #[test]
    #[should_panic(expected = "called more than expected")]
    fn explicit_cardinality_saturates() {
        let mut m = RefMockMethod::<(), i32>::new("label");
        m.expect().times(1).return_const(42);
        m.call(());
        m.call(());
    }

    #[test]
    #[should_panic(expected = "unsatisfied expectation on label")]
    fn checkpoint_reports_unsatisfied() {
        let mut m = RefMockMethod::<(), i32>::new("label");
        m.expect().times(2).return_const(42);
        m.call(());
        m.checkpoint();
    }

    #[test]
    fn return_var_mutations_persist() {
        let mut m = RefMutMockMethod::<(), Vec<i32>>::new("buffer");
        m.expect().return_var(Vec::new());
        m.call_mut(()).push(1);
        m.call_mut(()).push(2);
        assert_eq!(&[1, 2][..], &m.call_mut(())[..]);
    }

    #[test]
    fn returning_recomputes_each_call() {
        let mut m = RefMutMockMethod::<(i32,), i32>::new("doubler");
        m.expect().returning(|(x,)| 2 * x);
        assert_eq!(6, *m.call_mut((3,)));
        assert_eq!(10, *m.call_mut((5,)));
    }

    #[test]
    fn returning_st_works_on_the_owning_thread() {
        let mut m = RefMutMockMethod::<(), i32>::new("counter");
        let mut count = 0;
        m.expect().returning_st(move |()| {
            count += 1;
            count
        });
        assert_eq!(1, *m.call_mut(()));
        assert_eq!(2, *m.call_mut(()));
    }

    #[test]
    fn sequences_interoperate_with_by_value_methods() {
        let mut seq = Sequence::new();
        let open = MockMethod::<(), bool>::new("open");
        let mut data = RefMockMethod::<(), Vec<u8>>::new("data");

        open.expect()
            .in_sequence(&mut seq)
            .will_once(return_const(true));
        data.expect()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(b"bytes".to_vec());

        assert!(open.call(()));
        assert_eq!(b"bytes".to_vec(), *data.call(()));
    }

    #[test]
    #[should_panic(expected = "no matching expectation found")]
    fn sequenced_ref_call_out_of_order_panics() {
        let mut seq = Sequence::new();
        let open = MockMethod::<(), bool>::new("open");
        let mut data = RefMockMethod::<(), Vec<u8>>::new("data");

        open.expect()
            .in_sequence(&mut seq)
            .will_once(return_const(true));
        data.expect()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(b"bytes".to_vec());

        let _ = data.call(());
        open.checkpoint();
        data.checkpoint();
    }

    #[test]
    fn after_orders_expectations_across_mocks() {
        let mut connect = RefMockMethod::<(), bool>::new("connect");
        let mut tls = RefMockMethod::<(), bool>::new("tls");

        let prereq = connect.expect();
        prereq.times(1).return_const(true);
        tls.expect().times(1).after(prereq).return_const(true);

        assert!(connect.call(()));
        assert!(tls.call(()));
    }
}
