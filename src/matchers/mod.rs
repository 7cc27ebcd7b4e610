// vim: tw=80
//! Composable, type-erased argument matchers.
//!
//! A [`Matcher<T>`] is a shared handle to a predicate over `&T` that can
//! also describe itself in English and, on request, explain *why* a value
//! did or didn't match.  Matchers are built from the leaf constructors in
//! [`basic`], [`float`] and [`strings`], combined with the functions in
//! [`combinators`] and [`container`], adapted from any
//! [`Predicate`](predicates::prelude::Predicate) via [`satisfies`], or
//! written from scratch with [`matching`] or a manual [`MatcherImpl`].

use std::borrow::Borrow;
use std::fmt::{self, Write};
use std::marker::PhantomData;
use std::sync::Arc;

use predicates::prelude::Predicate;
use predicates_tree::CaseTreeExt;

pub mod basic;
pub(crate) mod bipartite;
pub mod combinators;
pub mod container;
pub mod float;
pub mod strings;

pub use basic::*;
pub use combinators::*;
pub use container::*;
pub use float::*;
pub use strings::*;

/// The polymorphic matcher implementation.
///
/// Implementations must be pure: repeated calls with the same value must
/// return the same verdict.  `describe_to` produces a clause that completes
/// the sentence "the value ..."; the negation defaults to wrapping it in
/// `not (...)`.
pub trait MatcherImpl<T: ?Sized>: Send + Sync {
    /// Test `value`, appending an explanation to `listener` when one is
    /// available.  Explanations are optional; writing nothing is legal.
    fn match_and_explain(
        &self,
        value: &T,
        listener: &mut MatchResultListener<'_>,
    ) -> bool;

    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str("not (")?;
        self.describe_to(out)?;
        out.write_str(")")
    }
}

/// An optional sink for match explanations.
///
/// A dormant listener discards everything; matchers should check
/// [`is_interested`](Self::is_interested) before doing expensive formatting
/// work, but writing to a dormant listener is always safe.
pub struct MatchResultListener<'a> {
    sink: Option<&'a mut String>,
}

impl<'a> MatchResultListener<'a> {
    pub fn interested(buf: &'a mut String) -> Self {
        MatchResultListener { sink: Some(buf) }
    }

    pub fn dormant() -> MatchResultListener<'static> {
        MatchResultListener { sink: None }
    }

    pub fn is_interested(&self) -> bool {
        self.sink.is_some()
    }
}

impl Write for MatchResultListener<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.push_str(s);
        }
        Ok(())
    }
}

/// A shared, type-erased matcher over values of type `T`.
///
/// Cloning is cheap and shares the underlying implementation.
pub struct Matcher<T: ?Sized>(Arc<dyn MatcherImpl<T>>);

impl<T: ?Sized> Clone for Matcher<T> {
    fn clone(&self) -> Self {
        Matcher(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Matcher<T> {
    pub fn new<M: MatcherImpl<T> + 'static>(imp: M) -> Self {
        Matcher(Arc::new(imp))
    }

    /// Test `value` without collecting an explanation.
    pub fn matches(&self, value: &T) -> bool {
        self.0.match_and_explain(value, &mut MatchResultListener::dormant())
    }

    pub fn match_and_explain(
        &self,
        value: &T,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        self.0.match_and_explain(value, listener)
    }

    /// Test `value`, returning the verdict and any explanation text.
    pub fn explain(&self, value: &T) -> (bool, String) {
        let mut buf = String::new();
        let ok = self
            .0
            .match_and_explain(value, &mut MatchResultListener::interested(&mut buf));
        (ok, buf)
    }

    pub fn describe(&self) -> String {
        let mut s = String::new();
        let _ = self.0.describe_to(&mut s);
        s
    }

    pub fn describe_negation(&self) -> String {
        let mut s = String::new();
        let _ = self.0.describe_negation_to(&mut s);
        s
    }

    pub(crate) fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        self.0.describe_to(out)
    }

    pub(crate) fn describe_negation_to(
        &self,
        out: &mut dyn fmt::Write,
    ) -> fmt::Result {
        self.0.describe_negation_to(out)
    }
}

impl<T: ?Sized + 'static> Matcher<T> {
    /// Adapt this matcher to any value type that can borrow a `T`.
    ///
    /// This is the qualifier-stripping conversion: `eq(5).cast::<&i32>()`
    /// matches references without copying, `str_eq("x").cast::<String>()`
    /// and friends come for free via `Borrow`.
    pub fn cast<U>(self) -> Matcher<U>
    where
        U: ?Sized + Borrow<T> + 'static,
    {
        struct Cast<T: ?Sized, U: ?Sized> {
            inner: Matcher<T>,
            _u: PhantomData<fn(&U)>,
        }
        impl<T, U> MatcherImpl<U> for Cast<T, U>
        where
            T: ?Sized + 'static,
            U: ?Sized + Borrow<T> + 'static,
        {
            fn match_and_explain(
                &self,
                value: &U,
                listener: &mut MatchResultListener<'_>,
            ) -> bool {
                self.inner.match_and_explain(value.borrow(), listener)
            }
            fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
                self.inner.describe_to(out)
            }
            fn describe_negation_to(
                &self,
                out: &mut dyn fmt::Write,
            ) -> fmt::Result {
                self.inner.describe_negation_to(out)
            }
        }
        Matcher::new(Cast { inner: self, _u: PhantomData })
    }
}

impl<T: ?Sized> fmt::Display for Matcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Build a matcher from a plain predicate closure and a description.
///
/// This is the hand-rolled-matcher entry point: name the condition, write
/// one function body.
///
/// # Examples
/// ```
/// use mimicry::matchers::matching;
///
/// let m = matching("is even", |x: &u32| x % 2 == 0);
/// assert!(m.matches(&4));
/// assert_eq!("is even", m.describe());
/// ```
pub fn matching<T, F>(description: impl Into<String>, f: F) -> Matcher<T>
where
    T: ?Sized,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    struct FnMatcher<F> {
        description: String,
        f: F,
    }
    impl<T, F> MatcherImpl<T> for FnMatcher<F>
    where
        T: ?Sized,
        F: Fn(&T) -> bool + Send + Sync,
    {
        fn match_and_explain(
            &self,
            value: &T,
            _listener: &mut MatchResultListener<'_>,
        ) -> bool {
            (self.f)(value)
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            out.write_str(&self.description)
        }
    }
    Matcher::new(FnMatcher { description: description.into(), f })
}

/// Adapt any [`Predicate`] into a matcher.
///
/// Failure explanations render the predicate's case tree, so predicates
/// with structured reflection keep their diagnostics.
pub fn satisfies<T, P>(pred: P) -> Matcher<T>
where
    T: ?Sized,
    P: Predicate<T> + Send + Sync + 'static,
{
    struct PredicateMatcher<P>(P);
    impl<T, P> MatcherImpl<T> for PredicateMatcher<P>
    where
        T: ?Sized,
        P: Predicate<T> + Send + Sync,
    {
        fn match_and_explain(
            &self,
            value: &T,
            listener: &mut MatchResultListener<'_>,
        ) -> bool {
            if !listener.is_interested() {
                return self.0.eval(value);
            }
            match self.0.find_case(false, value) {
                Some(case) => {
                    let _ = write!(listener, "{}", case.tree());
                    false
                }
                None => true,
            }
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "satisfies the predicate `{}`", self.0)
        }
    }
    Matcher::new(PredicateMatcher(pred))
}

#[cfg(test)]
mod t {
    use super::*;

    #[test]
    fn dormant_listener_discards() {
        let mut listener = MatchResultListener::dormant();
        assert!(!listener.is_interested());
        let _ = write!(listener, "ignored");
    }

    #[test]
    fn display_is_description() {
        let m = matching("is odd", |x: &i32| x % 2 != 0);
        assert_eq!("is odd", format!("{m}"));
        assert_eq!("not (is odd)", m.describe_negation());
    }

    #[test]
    fn satisfies_wraps_predicates() {
        use predicates::prelude::*;
        let m = satisfies(predicate::ge(10i32));
        assert!(m.matches(&11));
        let (ok, why) = m.explain(&3);
        assert!(!ok);
        assert!(!why.is_empty());
    }

    #[test]
    fn cast_borrows() {
        let m = strings::str_eq::<str>("abc").cast::<String>();
        assert!(m.matches(&String::from("abc")));
    }
}
