// vim: tw=80
//! Leaf matchers: the comparison family, pointer and projection matchers.

use std::any::Any;
use std::fmt;
use std::fmt::Write as _;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use super::{MatchResultListener, Matcher, MatcherImpl};

struct Anything;

impl<T: ?Sized> MatcherImpl<T> for Anything {
    fn match_and_explain(
        &self,
        _value: &T,
        _listener: &mut MatchResultListener<'_>,
    ) -> bool {
        true
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str("is anything")
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str("never matches")
    }
}

/// Matches any value.  The catch-all wildcard.
pub fn anything<T: ?Sized>() -> Matcher<T> {
    Matcher::new(Anything)
}

/// Matches any value of type `T`.  Alias for [`anything`], reading better
/// when the type name carries the meaning: `a::<Widget>()`.
pub fn a<T: ?Sized>() -> Matcher<T> {
    anything()
}

struct Relation<T> {
    expected: T,
    desc: &'static str,
    negated_desc: &'static str,
    op: fn(&T, &T) -> bool,
}

impl<T> MatcherImpl<T> for Relation<T>
where
    T: fmt::Debug + Send + Sync,
{
    fn match_and_explain(
        &self,
        value: &T,
        _listener: &mut MatchResultListener<'_>,
    ) -> bool {
        (self.op)(value, &self.expected)
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{} {:?}", self.desc, self.expected)
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{} {:?}", self.negated_desc, self.expected)
    }
}

struct PairRelation<T> {
    desc: &'static str,
    negated_desc: &'static str,
    op: fn(&T, &T) -> bool,
}

impl<T> MatcherImpl<(T, T)> for PairRelation<T>
where
    T: Send + Sync,
{
    fn match_and_explain(
        &self,
        value: &(T, T),
        _listener: &mut MatchResultListener<'_>,
    ) -> bool {
        (self.op)(&value.0, &value.1)
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(self.desc)
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(self.negated_desc)
    }
}

macro_rules! relation_matchers {
    ($($(#[$attr:meta])*
       $name:ident, $name2:ident, $bound:ident, $op:tt,
       $desc:literal, $neg:literal, $pair:literal, $negpair:literal;)*) =>
    {$(
        $(#[$attr])*
        pub fn $name<T>(expected: T) -> Matcher<T>
        where
            T: $bound + fmt::Debug + Send + Sync + 'static,
        {
            Matcher::new(Relation {
                expected,
                desc: $desc,
                negated_desc: $neg,
                op: |a, b| a $op b,
            })
        }

        /// Two-field form of the same relation, comparing a 2-tuple's own
        /// fields against each other.  Used with `pointwise`-style
        /// matchers.
        pub fn $name2<T>() -> Matcher<(T, T)>
        where
            T: $bound + Send + Sync + 'static,
        {
            Matcher::new(PairRelation {
                desc: $pair,
                negated_desc: $negpair,
                op: |a, b| a $op b,
            })
        }
    )*}
}

relation_matchers! {
    /// Matches a value equal to `expected`.
    eq, eq2, PartialEq, ==,
        "is equal to", "isn't equal to",
        "are an equal pair", "aren't an equal pair";
    /// Matches a value not equal to `expected`.
    ne, ne2, PartialEq, !=,
        "isn't equal to", "is equal to",
        "are an unequal pair", "aren't an unequal pair";
    /// Matches a value strictly less than `expected`.
    lt, lt2, PartialOrd, <,
        "is <", "isn't <",
        "are a pair where the first < the second",
        "aren't a pair where the first < the second";
    /// Matches a value less than or equal to `expected`.
    le, le2, PartialOrd, <=,
        "is <=", "isn't <=",
        "are a pair where the first <= the second",
        "aren't a pair where the first <= the second";
    /// Matches a value strictly greater than `expected`.
    gt, gt2, PartialOrd, >,
        "is >", "isn't >",
        "are a pair where the first > the second",
        "aren't a pair where the first > the second";
    /// Matches a value greater than or equal to `expected`.
    ge, ge2, PartialOrd, >=,
        "is >=", "isn't >=",
        "are a pair where the first >= the second",
        "aren't a pair where the first >= the second";
}

/// Matches a raw pointer by address, not by pointee value.
///
/// The identity analogue of `eq`: two distinct but equal objects do not
/// match.
pub fn same_address<T>(expected: *const T) -> Matcher<*const T>
where
    T: 'static,
{
    struct SameAddress<T>(*const T);
    // The captured pointer is only ever compared, never dereferenced.
    unsafe impl<T> Send for SameAddress<T> {}
    unsafe impl<T> Sync for SameAddress<T> {}
    impl<T> MatcherImpl<*const T> for SameAddress<T> {
        fn match_and_explain(
            &self,
            value: &*const T,
            _listener: &mut MatchResultListener<'_>,
        ) -> bool {
            std::ptr::eq(*value, self.0)
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "is the address {:p}", self.0)
        }
        fn describe_negation_to(
            &self,
            out: &mut dyn fmt::Write,
        ) -> fmt::Result {
            write!(out, "isn't the address {:p}", self.0)
        }
    }
    Matcher::new(SameAddress(expected))
}

/// Matches a reference to exactly this object (address comparison).
pub fn same_instance<T>(target: &'static T) -> Matcher<&'static T>
where
    T: Send + Sync + 'static,
{
    struct SameInstance<T: 'static>(&'static T);
    impl<T: Send + Sync> MatcherImpl<&'static T> for SameInstance<T> {
        fn match_and_explain(
            &self,
            value: &&'static T,
            _listener: &mut MatchResultListener<'_>,
        ) -> bool {
            std::ptr::eq(*value, self.0)
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "references the object at {:p}", self.0)
        }
        fn describe_negation_to(
            &self,
            out: &mut dyn fmt::Write,
        ) -> fmt::Result {
            write!(out, "doesn't reference the object at {:p}", self.0)
        }
    }
    Matcher::new(SameInstance(target))
}

/// A pointer-like value: something that either dereferences to a target or
/// is empty/null.
///
/// Implemented for `Option`, `Box`, `Rc`, `Arc`, plain references, and raw
/// pointers, which lets [`is_null`], [`not_null`] and [`pointee`] work
/// uniformly across them.
pub trait Dereferenceable {
    type Target: ?Sized;
    fn try_deref(&self) -> Option<&Self::Target>;
}

impl<T> Dereferenceable for Option<T> {
    type Target = T;
    fn try_deref(&self) -> Option<&T> {
        self.as_ref()
    }
}

impl<T: ?Sized> Dereferenceable for Box<T> {
    type Target = T;
    fn try_deref(&self) -> Option<&T> {
        Some(self)
    }
}

impl<T: ?Sized> Dereferenceable for Rc<T> {
    type Target = T;
    fn try_deref(&self) -> Option<&T> {
        Some(self)
    }
}

impl<T: ?Sized> Dereferenceable for Arc<T> {
    type Target = T;
    fn try_deref(&self) -> Option<&T> {
        Some(self)
    }
}

impl<T: ?Sized> Dereferenceable for &T {
    type Target = T;
    fn try_deref(&self) -> Option<&T> {
        Some(self)
    }
}

impl<T> Dereferenceable for *const T {
    type Target = T;
    fn try_deref(&self) -> Option<&T> {
        // Soundness rests on the caller passing a valid or null pointer.
        unsafe { self.as_ref() }
    }
}

impl<T> Dereferenceable for *mut T {
    type Target = T;
    fn try_deref(&self) -> Option<&T> {
        unsafe { self.as_ref() }
    }
}

struct IsNull<P: ?Sized>(PhantomData<fn(&P)>);

impl<P> MatcherImpl<P> for IsNull<P>
where
    P: Dereferenceable,
{
    fn match_and_explain(
        &self,
        value: &P,
        _listener: &mut MatchResultListener<'_>,
    ) -> bool {
        value.try_deref().is_none()
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str("is null")
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str("isn't null")
    }
}

/// Matches an empty `Option`, a null raw pointer, etc.
pub fn is_null<P>() -> Matcher<P>
where
    P: Dereferenceable + 'static,
{
    Matcher::new(IsNull(PhantomData))
}

/// Matches any non-null pointer-like value.
pub fn not_null<P>() -> Matcher<P>
where
    P: Dereferenceable + 'static,
{
    struct NotNull<P: ?Sized>(PhantomData<fn(&P)>);
    impl<P> MatcherImpl<P> for NotNull<P>
    where
        P: Dereferenceable,
    {
        fn match_and_explain(
            &self,
            value: &P,
            _listener: &mut MatchResultListener<'_>,
        ) -> bool {
            value.try_deref().is_some()
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            out.write_str("isn't null")
        }
        fn describe_negation_to(
            &self,
            out: &mut dyn fmt::Write,
        ) -> fmt::Result {
            out.write_str("is null")
        }
    }
    Matcher::new(NotNull(PhantomData))
}

/// Matches a pointer-like value whose target matches `inner`.
///
/// A null/empty value never matches and the inner matcher is not
/// evaluated for it.
pub fn pointee<P>(inner: Matcher<P::Target>) -> Matcher<P>
where
    P: Dereferenceable + 'static,
    P::Target: 'static,
{
    struct Pointee<P: Dereferenceable + ?Sized> {
        inner: Matcher<P::Target>,
        _p: PhantomData<fn(&P)>,
    }
    impl<P> MatcherImpl<P> for Pointee<P>
    where
        P: Dereferenceable,
    {
        fn match_and_explain(
            &self,
            value: &P,
            listener: &mut MatchResultListener<'_>,
        ) -> bool {
            match value.try_deref() {
                None => {
                    let _ = listener.write_str("which is null");
                    false
                }
                Some(target) => {
                    let mut why = String::new();
                    let ok = self.inner.match_and_explain(
                        target,
                        &mut MatchResultListener::interested(&mut why),
                    );
                    if listener.is_interested() && !why.is_empty() {
                        let _ = write!(listener, "which points to a value {why}");
                    }
                    ok
                }
            }
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "points to a value that {}", self.inner.describe())
        }
        fn describe_negation_to(
            &self,
            out: &mut dyn fmt::Write,
        ) -> fmt::Result {
            write!(
                out,
                "is null or points to a value that {}",
                self.inner.describe_negation()
            )
        }
    }
    Matcher::new(Pointee { inner, _p: PhantomData })
}

/// Matches a value whose field, extracted by `accessor`, matches `inner`.
///
/// # Examples
/// ```
/// use mimicry::matchers::{eq, field};
///
/// struct Point { x: i32, y: i32 }
/// let m = field("x", |p: &Point| &p.x, eq(3));
/// assert!(m.matches(&Point { x: 3, y: 9 }));
/// ```
pub fn field<S, F, A>(
    name: &'static str,
    accessor: A,
    inner: Matcher<F>,
) -> Matcher<S>
where
    S: ?Sized,
    F: fmt::Debug + 'static,
    A: Fn(&S) -> &F + Send + Sync + 'static,
{
    struct Field<A, F: 'static> {
        name: &'static str,
        accessor: A,
        inner: Matcher<F>,
    }
    impl<S, F, A> MatcherImpl<S> for Field<A, F>
    where
        S: ?Sized,
        F: fmt::Debug,
        A: Fn(&S) -> &F + Send + Sync,
    {
        fn match_and_explain(
            &self,
            value: &S,
            listener: &mut MatchResultListener<'_>,
        ) -> bool {
            let projected = (self.accessor)(value);
            if !listener.is_interested() {
                return self.inner.matches(projected);
            }
            let (ok, why) = self.inner.explain(projected);
            let _ = write!(listener, "whose field `{}` is {:?}", self.name,
                projected);
            if !why.is_empty() {
                let _ = write!(listener, ", {why}");
            }
            ok
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "is an object whose field `{}` {}", self.name,
                self.inner.describe())
        }
        fn describe_negation_to(
            &self,
            out: &mut dyn fmt::Write,
        ) -> fmt::Result {
            write!(out, "is an object whose field `{}` {}", self.name,
                self.inner.describe_negation())
        }
    }
    Matcher::new(Field { name, accessor, inner })
}

/// Matches a value for which `f(value)` matches `inner`.
///
/// Covers accessor methods, free-function projections and sub-tuple
/// selection alike; `f` runs on every match attempt and must be pure.
pub fn result_of<S, R, F>(
    name: &'static str,
    f: F,
    inner: Matcher<R>,
) -> Matcher<S>
where
    S: ?Sized,
    R: fmt::Debug + 'static,
    F: Fn(&S) -> R + Send + Sync + 'static,
{
    struct ResultOf<F, R: 'static> {
        name: &'static str,
        f: F,
        inner: Matcher<R>,
    }
    impl<S, R, F> MatcherImpl<S> for ResultOf<F, R>
    where
        S: ?Sized,
        R: fmt::Debug,
        F: Fn(&S) -> R + Send + Sync,
    {
        fn match_and_explain(
            &self,
            value: &S,
            listener: &mut MatchResultListener<'_>,
        ) -> bool {
            let projected = (self.f)(value);
            if !listener.is_interested() {
                return self.inner.matches(&projected);
            }
            let (ok, why) = self.inner.explain(&projected);
            let _ = write!(listener, "whose `{}` is {:?}", self.name,
                projected);
            if !why.is_empty() {
                let _ = write!(listener, ", {why}");
            }
            ok
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "is an object whose `{}` {}", self.name,
                self.inner.describe())
        }
        fn describe_negation_to(
            &self,
            out: &mut dyn fmt::Write,
        ) -> fmt::Result {
            write!(out, "is an object whose `{}` {}", self.name,
                self.inner.describe_negation())
        }
    }
    Matcher::new(ResultOf { name, f, inner })
}

/// Matches a `dyn Any` value that is a `T` matching `inner`.
///
/// A value of any other concrete type never matches.  Use
/// `.cast::<Box<dyn Any>>()` to apply it to boxed values.
pub fn downcasts_to<T>(inner: Matcher<T>) -> Matcher<dyn Any>
where
    T: Any + Send + Sync,
{
    struct DowncastsTo<T: 'static>(Matcher<T>);
    impl<T: Any + Send + Sync> MatcherImpl<dyn Any> for DowncastsTo<T> {
        fn match_and_explain(
            &self,
            value: &dyn Any,
            listener: &mut MatchResultListener<'_>,
        ) -> bool {
            match value.downcast_ref::<T>() {
                None => {
                    let _ = write!(listener, "which isn't a `{}`",
                        std::any::type_name::<T>());
                    false
                }
                Some(v) => self.0.match_and_explain(v, listener),
            }
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "is a `{}` that {}", std::any::type_name::<T>(),
                self.0.describe())
        }
        fn describe_negation_to(
            &self,
            out: &mut dyn fmt::Write,
        ) -> fmt::Result {
            write!(out, "isn't a `{}` or {}", std::any::type_name::<T>(),
                self.0.describe_negation())
        }
    }
    Matcher::new(DowncastsTo(inner))
}
