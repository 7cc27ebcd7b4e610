// vim: tw=80
//! Cardinalities: how many calls an expectation allows and requires.

use std::fmt;
use std::ops::{Range, RangeFull, RangeInclusive};
use std::sync::Arc;

/// The behavior of a cardinality, for the built-in constructors and for
/// user-defined ones via [`cardinality`].
pub trait CardinalityImpl: Send + Sync {
    /// True once `count` calls are enough.  More calls may still arrive.
    fn is_satisfied_by(&self, count: usize) -> bool;
    /// True once `count` calls exhaust the allowance.  One more call is an
    /// over-saturation.
    fn is_saturated_by(&self, count: usize) -> bool;
    /// Conservative minimum number of calls.
    fn lower_bound(&self) -> usize;
    /// Conservative maximum number of calls, `None` if unbounded.
    fn upper_bound(&self) -> Option<usize>;
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

/// A shared handle to a call count requirement.
///
/// Cheap to clone.  Construct one with [`exactly`], [`at_least`],
/// [`at_most`], [`between`], [`any_number`], [`never`], or from a `usize`
/// or range literal via `From`.
#[derive(Clone)]
pub struct Cardinality(Arc<dyn CardinalityImpl>);

impl Cardinality {
    pub fn new<C: CardinalityImpl + 'static>(imp: C) -> Self {
        Cardinality(Arc::new(imp))
    }

    pub fn is_satisfied_by(&self, count: usize) -> bool {
        self.0.is_satisfied_by(count)
    }

    pub fn is_saturated_by(&self, count: usize) -> bool {
        self.0.is_saturated_by(count)
    }

    pub fn is_over_saturated_by(&self, count: usize) -> bool {
        self.0.is_saturated_by(count) && !self.0.is_satisfied_by(count)
    }

    pub fn lower_bound(&self) -> usize {
        self.0.lower_bound()
    }

    pub fn upper_bound(&self) -> Option<usize> {
        self.0.upper_bound()
    }

    pub fn describe(&self) -> String {
        let mut s = String::new();
        let _ = self.0.describe_to(&mut s);
        s
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.describe_to(f)
    }
}

impl fmt::Debug for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cardinality({})", self.describe())
    }
}

impl From<usize> for Cardinality {
    fn from(n: usize) -> Self {
        exactly(n)
    }
}

/// Half-open, like a slice range.
impl From<Range<usize>> for Cardinality {
    fn from(r: Range<usize>) -> Self {
        assert!(r.end > r.start, "invalid call count range {r:?}");
        between(r.start, r.end - 1)
    }
}

impl From<RangeInclusive<usize>> for Cardinality {
    fn from(r: RangeInclusive<usize>) -> Self {
        assert!(r.end() >= r.start(), "invalid call count range {r:?}");
        between(*r.start(), *r.end())
    }
}

impl From<RangeFull> for Cardinality {
    fn from(_: RangeFull) -> Self {
        any_number()
    }
}

/// "once", "twice", "5 times".
pub(crate) fn format_times(n: usize) -> String {
    match n {
        1 => "once".to_owned(),
        2 => "twice".to_owned(),
        n => format!("{n} times"),
    }
}

/// "never called", "called once", "called 5 times".
pub(crate) fn describe_call_count(n: usize) -> String {
    if n == 0 {
        "never called".to_owned()
    } else {
        format!("called {}", format_times(n))
    }
}

struct Between {
    min: usize,
    max: Option<usize>,
}

impl CardinalityImpl for Between {
    fn is_satisfied_by(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    fn is_saturated_by(&self, count: usize) -> bool {
        self.max.is_some_and(|max| count >= max)
    }

    fn lower_bound(&self) -> usize {
        self.min
    }

    fn upper_bound(&self) -> Option<usize> {
        self.max
    }

    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match (self.min, self.max) {
            (0, Some(0)) => out.write_str("never called"),
            (0, None) => out.write_str("called any number of times"),
            (min, Some(max)) if min == max => {
                write!(out, "called exactly {}", format_times(min))
            },
            (0, Some(max)) => {
                write!(out, "called at most {}", format_times(max))
            },
            (min, None) => {
                write!(out, "called at least {}", format_times(min))
            },
            (min, Some(max)) => {
                write!(out, "called between {min} and {max} times")
            },
        }
    }
}

/// Requires exactly `n` calls.
pub fn exactly(n: usize) -> Cardinality {
    Cardinality::new(Between { min: n, max: Some(n) })
}

/// Requires at least `n` calls, with no upper limit.
pub fn at_least(n: usize) -> Cardinality {
    Cardinality::new(Between { min: n, max: None })
}

/// Allows up to `n` calls, including none at all.
pub fn at_most(n: usize) -> Cardinality {
    Cardinality::new(Between { min: 0, max: Some(n) })
}

/// Requires between `min` and `max` calls, inclusive on both ends.
pub fn between(min: usize, max: usize) -> Cardinality {
    assert!(min <= max, "invalid call count range {min}..={max}");
    Cardinality::new(Between { min, max: Some(max) })
}

/// Allows any number of calls, including none.
pub fn any_number() -> Cardinality {
    Cardinality::new(Between { min: 0, max: None })
}

/// Forbids all calls.
pub fn never() -> Cardinality {
    exactly(0)
}

struct Custom<F> {
    description: String,
    is_satisfied: F,
}

impl<F> CardinalityImpl for Custom<F>
where
    F: Fn(usize) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, count: usize) -> bool {
        (self.is_satisfied)(count)
    }

    // A predicate gives no view of the future, so a custom cardinality
    // never saturates and its bounds stay maximally loose.
    fn is_saturated_by(&self, _count: usize) -> bool {
        false
    }

    fn lower_bound(&self) -> usize {
        0
    }

    fn upper_bound(&self) -> Option<usize> {
        None
    }

    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(&self.description)
    }
}

/// A user-defined cardinality: satisfied whenever the predicate accepts
/// the call count.  `description` should read like "called an even number
/// of times".
pub fn cardinality<F>(description: impl Into<String>, is_satisfied: F)
    -> Cardinality
where
    F: Fn(usize) -> bool + Send + Sync + 'static,
{
    Cardinality::new(Custom { description: description.into(), is_satisfied })
}
