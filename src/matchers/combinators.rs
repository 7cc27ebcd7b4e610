// vim: tw=80
//! Matcher combinators: negation, conjunction, disjunction, and tuple
//! field composition.

use std::fmt;
use std::fmt::Write as _;

use super::{MatchResultListener, Matcher, MatcherImpl};

struct Not<T: ?Sized>(Matcher<T>);

impl<T: ?Sized> MatcherImpl<T> for Not<T> {
    fn match_and_explain(
        &self,
        value: &T,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        !self.0.match_and_explain(value, listener)
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        self.0.describe_negation_to(out)
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        self.0.describe_to(out)
    }
}

/// Matches whatever `inner` rejects.  Double negation describes itself in
/// the positive voice again.
pub fn not<T: ?Sized + 'static>(inner: Matcher<T>) -> Matcher<T> {
    Matcher::new(Not(inner))
}

fn describe_joined<T: ?Sized>(
    matchers: &[Matcher<T>],
    out: &mut dyn fmt::Write,
    conj: &str,
    negated: bool,
) -> fmt::Result {
    for (i, m) in matchers.iter().enumerate() {
        if i > 0 {
            write!(out, "{conj}")?;
        }
        out.write_str("(")?;
        if negated {
            m.describe_negation_to(out)?;
        } else {
            m.describe_to(out)?;
        }
        out.write_str(")")?;
    }
    Ok(())
}

struct AllOf<T: ?Sized>(Vec<Matcher<T>>);

impl<T: ?Sized> MatcherImpl<T> for AllOf<T> {
    fn match_and_explain(
        &self,
        value: &T,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        if !listener.is_interested() {
            return self.0.iter().all(|m| m.matches(value));
        }
        // On failure the first failing matcher explains; on success every
        // sub-explanation is kept.
        let mut explanations = Vec::new();
        for m in &self.0 {
            let (ok, why) = m.explain(value);
            if !ok {
                let _ = listener.write_str(&why);
                return false;
            }
            if !why.is_empty() {
                explanations.push(why);
            }
        }
        let _ = listener.write_str(&explanations.join(", and "));
        true
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        describe_joined(&self.0, out, " and ", false)
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        describe_joined(&self.0, out, " or ", true)
    }
}

/// Matches values accepted by every one of `matchers`.
///
/// An empty list matches everything, the identity of conjunction.
pub fn all_of<T, I>(matchers: I) -> Matcher<T>
where
    T: ?Sized + 'static,
    I: IntoIterator<Item = Matcher<T>>,
{
    Matcher::new(AllOf(matchers.into_iter().collect()))
}

struct AnyOf<T: ?Sized>(Vec<Matcher<T>>);

impl<T: ?Sized> MatcherImpl<T> for AnyOf<T> {
    fn match_and_explain(
        &self,
        value: &T,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        if !listener.is_interested() {
            return self.0.iter().any(|m| m.matches(value));
        }
        // On success the first accepting matcher explains; on failure
        // every rejection is kept.
        let mut explanations = Vec::new();
        for m in &self.0 {
            let (ok, why) = m.explain(value);
            if ok {
                let _ = listener.write_str(&why);
                return true;
            }
            if !why.is_empty() {
                explanations.push(why);
            }
        }
        let _ = listener.write_str(&explanations.join(", and "));
        false
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        describe_joined(&self.0, out, " or ", false)
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        describe_joined(&self.0, out, " and ", true)
    }
}

/// Matches values accepted by at least one of `matchers`.
///
/// An empty list matches nothing, the identity of disjunction.
pub fn any_of<T, I>(matchers: I) -> Matcher<T>
where
    T: ?Sized + 'static,
    I: IntoIterator<Item = Matcher<T>>,
{
    Matcher::new(AnyOf(matchers.into_iter().collect()))
}

/// Picks one of two matchers based on a condition known at construction
/// time.  Both arms must match the same type.
pub fn conditional<T: ?Sized>(
    condition: bool,
    on_true: Matcher<T>,
    on_false: Matcher<T>,
) -> Matcher<T> {
    if condition { on_true } else { on_false }
}

struct Key<K: 'static, V> {
    inner: Matcher<K>,
    _p: std::marker::PhantomData<fn(&V)>,
}

impl<K, V> MatcherImpl<(K, V)> for Key<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn match_and_explain(
        &self,
        value: &(K, V),
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        self.inner.match_and_explain(&value.0, listener)
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "has a key that {}", self.inner.describe())
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "doesn't have a key that {}", self.inner.describe())
    }
}

/// Matches a pair whose first field matches `inner`, ignoring the second.
/// The usual way to assert on map keys together with `contains`.
pub fn key<K, V>(inner: Matcher<K>) -> Matcher<(K, V)>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    Matcher::new(Key { inner, _p: std::marker::PhantomData })
}

struct PairOf<K: 'static, V: 'static> {
    first: Matcher<K>,
    second: Matcher<V>,
}

impl<K, V> MatcherImpl<(K, V)> for PairOf<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn match_and_explain(
        &self,
        value: &(K, V),
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        let (first_ok, first_why) = self.first.explain(&value.0);
        if !first_ok {
            if listener.is_interested() {
                let _ = listener.write_str("whose first field does not match");
                if !first_why.is_empty() {
                    let _ = write!(listener, ", {first_why}");
                }
            }
            return false;
        }
        let (second_ok, second_why) = self.second.explain(&value.1);
        if !second_ok {
            if listener.is_interested() {
                let _ =
                    listener.write_str("whose second field does not match");
                if !second_why.is_empty() {
                    let _ = write!(listener, ", {second_why}");
                }
            }
            return false;
        }
        if listener.is_interested() {
            let mut parts = Vec::new();
            if !first_why.is_empty() {
                parts.push(format!("whose first field {first_why}"));
            }
            if !second_why.is_empty() {
                parts.push(format!("whose second field {second_why}"));
            }
            let _ = listener.write_str(&parts.join(", and "));
        }
        true
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "has a first field that {}, and has a second field \
            that {}", self.first.describe(), self.second.describe())
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "has a first field that {}, or has a second field \
            that {}", self.first.describe_negation(),
            self.second.describe_negation())
    }
}

/// Matches a pair whose fields match `first` and `second` respectively.
pub fn pair<K, V>(first: Matcher<K>, second: Matcher<V>) -> Matcher<(K, V)>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    Matcher::new(PairOf { first, second })
}

/// A fixed-arity bundle of matchers applied fieldwise to a tuple.
/// Implemented for tuples of [`Matcher`]s up to arity 6.
pub trait MatcherTuple<T: ?Sized>: Send + Sync {
    fn match_fields(
        &self,
        value: &T,
        listener: &mut MatchResultListener<'_>,
    ) -> bool;
    fn describe_fields(
        &self,
        out: &mut dyn fmt::Write,
        negated: bool,
    ) -> fmt::Result;
}

macro_rules! matcher_tuple_impl {
    ($(($($t:ident, $idx:tt),+);)*) => {$(
        impl<$($t: Send + Sync + 'static),+> MatcherTuple<($($t,)+)>
            for ($(Matcher<$t>,)+)
        {
            fn match_fields(
                &self,
                value: &($($t,)+),
                listener: &mut MatchResultListener<'_>,
            ) -> bool {
                $(
                    {
                        let (ok, why) =
                            self.$idx.explain(&value.$idx);
                        if !ok {
                            if listener.is_interested() {
                                let _ = write!(listener,
                                    "whose field #{} does not match",
                                    $idx);
                                if !why.is_empty() {
                                    let _ = write!(listener, ", {why}");
                                }
                            }
                            return false;
                        }
                    }
                )+
                true
            }

            fn describe_fields(
                &self,
                out: &mut dyn fmt::Write,
                negated: bool,
            ) -> fmt::Result {
                let conj = if negated { ", or" } else { ", and" };
                let mut first = true;
                $(
                    {
                        if !first {
                            write!(out, "{conj} ")?;
                        }
                        first = false;
                        let desc = if negated {
                            self.$idx.describe_negation()
                        } else {
                            self.$idx.describe()
                        };
                        write!(out, "whose field #{} {}", $idx, desc)?;
                    }
                )+
                let _ = first;
                Ok(())
            }
        }
    )*}
}

matcher_tuple_impl! {
    (T0, 0);
    (T0, 0, T1, 1);
    (T0, 0, T1, 1, T2, 2);
    (T0, 0, T1, 1, T2, 2, T3, 3);
    (T0, 0, T1, 1, T2, 2, T3, 3, T4, 4);
    (T0, 0, T1, 1, T2, 2, T3, 3, T4, 4, T5, 5);
}

struct FieldsAre<M>(M);

impl<T: ?Sized, M: MatcherTuple<T>> MatcherImpl<T> for FieldsAre<M> {
    fn match_and_explain(
        &self,
        value: &T,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        self.0.match_fields(value, listener)
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str("is a tuple ")?;
        self.0.describe_fields(out, false)
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str("is a tuple ")?;
        self.0.describe_fields(out, true)
    }
}

/// Matches a tuple whose fields match the given matchers, one per field.
///
/// # Examples
/// ```
/// use mimicry::matchers::{eq, fields_are, gt};
///
/// let m = fields_are((eq("x"), gt(2)));
/// assert!(m.matches(&("x", 5)));
/// assert!(!m.matches(&("x", 1)));
/// ```
pub fn fields_are<T, M>(matchers: M) -> Matcher<T>
where
    T: ?Sized + 'static,
    M: MatcherTuple<T> + 'static,
{
    Matcher::new(FieldsAre(matchers))
}

#[cfg(test)]
mod t {
    use crate::matchers::basic::{eq, gt, lt};

    use super::*;

    #[test]
    fn negation() {
        let m = not(eq(5));
        assert!(m.matches(&4));
        assert!(!m.matches(&5));
        assert_eq!("isn't equal to 5", m.describe());
        assert_eq!("is equal to 5", m.describe_negation());
        // Double negation reads positively again.
        assert_eq!("is equal to 5", not(not(eq(5))).describe());
    }

    #[test]
    fn conjunction() {
        let m = all_of([gt(2), lt(8)]);
        assert!(m.matches(&5));
        assert!(!m.matches(&1));
        assert!(!m.matches(&9));
        assert_eq!("(is > 2) and (is < 8)", m.describe());
        assert_eq!("(isn't > 2) or (isn't < 8)", m.describe_negation());
        // Identity elements.
        assert!(all_of::<i32, _>([]).matches(&1));
        assert!(!any_of::<i32, _>([]).matches(&1));
    }

    #[test]
    fn disjunction() {
        let m = any_of([lt(2), gt(8)]);
        assert!(m.matches(&1));
        assert!(m.matches(&9));
        assert!(!m.matches(&5));
        assert_eq!("(is < 2) or (is > 8)", m.describe());
    }

    #[test]
    fn conditional_picks_one_arm() {
        assert!(conditional(true, eq(1), eq(2)).matches(&1));
        assert!(conditional(false, eq(1), eq(2)).matches(&2));
    }

    #[test]
    fn pairs() {
        assert!(key::<_, i32>(eq("a")).matches(&("a", 5)));
        assert!(!key::<_, i32>(eq("a")).matches(&("b", 5)));
        let m = pair(eq("a"), gt(2));
        assert!(m.matches(&("a", 5)));
        assert!(!m.matches(&("a", 1)));
        assert!(!m.matches(&("b", 5)));
        let (_, why) = m.explain(&("b", 5));
        assert!(why.contains("first field does not match"));
    }

    #[test]
    fn tuple_fields() {
        let m = fields_are((eq(1), gt(2), eq("z")));
        assert!(m.matches(&(1, 3, "z")));
        assert!(!m.matches(&(1, 1, "z")));
        let (_, why) = m.explain(&(1, 1, "z"));
        assert!(why.contains("field #1 does not match"));
        assert_eq!(
            "is a tuple whose field #0 is equal to 1, and whose field #1 \
             is > 2",
            fields_are((eq(1), gt(2))).describe()
        );
    }
}
