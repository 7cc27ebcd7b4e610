// vim: tw=80
//! Container matchers: ordered and unordered element-wise matching.
//!
//! All of these are generic over any container whose reference iterates
//! its elements by reference, which covers `Vec`, slices, arrays, and the
//! standard collections.

use std::fmt;
use std::fmt::Write as _;
use std::marker::PhantomData;

use crate::cardinality::{at_least, Cardinality};

use super::basic::eq;
use super::bipartite::MatchMatrix;
use super::{MatchResultListener, Matcher, MatcherImpl};

fn describe_element_list<T>(
    matchers: &[Matcher<T>],
    out: &mut dyn fmt::Write,
) -> fmt::Result
where
    T: ?Sized,
{
    for (i, m) in matchers.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write!(out, "({})", m.describe())?;
    }
    Ok(())
}

struct ElementsAre<C: ?Sized, T: 'static> {
    matchers: Vec<Matcher<T>>,
    _p: PhantomData<fn(&C)>,
}

impl<C, T> MatcherImpl<C> for ElementsAre<C, T>
where
    C: ?Sized,
    T: fmt::Debug + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn match_and_explain(
        &self,
        value: &C,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        let elements = value.into_iter().collect::<Vec<_>>();
        if elements.len() != self.matchers.len() {
            let _ = write!(listener, "which has {} elements",
                elements.len());
            return false;
        }
        for (i, (element, m)) in
            elements.iter().zip(&self.matchers).enumerate()
        {
            if listener.is_interested() {
                let (ok, why) = m.explain(element);
                if !ok {
                    let _ = write!(listener,
                        "whose element #{i} ({element:?}) doesn't match");
                    if !why.is_empty() {
                        let _ = write!(listener, ", {why}");
                    }
                    return false;
                }
            } else if !m.matches(element) {
                return false;
            }
        }
        true
    }

    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        if self.matchers.is_empty() {
            return out.write_str("is empty");
        }
        write!(out, "has {} elements where, in order: ",
            self.matchers.len())?;
        describe_element_list(&self.matchers, out)
    }

    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        if self.matchers.is_empty() {
            return out.write_str("isn't empty");
        }
        write!(out, "doesn't have {} elements where, in order: ",
            self.matchers.len())?;
        describe_element_list(&self.matchers, out)
    }
}

/// Matches a container with exactly these elements, in this order, each
/// matching its positional matcher.
pub fn elements_are<C, T, I>(matchers: I) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: fmt::Debug + 'static,
    I: IntoIterator<Item = Matcher<T>>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    Matcher::new(ElementsAre {
        matchers: matchers.into_iter().collect(),
        _p: PhantomData,
    })
}

/// [`elements_are`] over plain expected values, compared with `eq`.
pub fn elements_are_array<C, T, I>(expected: I) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
    I: IntoIterator<Item = T>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    elements_are(expected.into_iter().map(eq))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum UnorderedMode {
    /// Every element pairs with a distinct matcher and vice versa.
    ExactMatch,
    /// Every matcher pairs with a distinct element; extra elements are
    /// allowed.
    Superset,
    /// Every element pairs with a distinct matcher; extra matchers are
    /// allowed.
    Subset,
}

impl UnorderedMode {
    fn required_pairs(self, elements: usize, matchers: usize) -> usize {
        match self {
            UnorderedMode::ExactMatch => elements.max(matchers),
            UnorderedMode::Superset => matchers,
            UnorderedMode::Subset => elements,
        }
    }
}

struct Unordered<C: ?Sized, T: 'static> {
    matchers: Vec<Matcher<T>>,
    mode: UnorderedMode,
    _p: PhantomData<fn(&C)>,
}

impl<C, T> Unordered<C, T>
where
    C: ?Sized,
    T: fmt::Debug + 'static,
{
    /// Explains an insufficient matching: which matchers could accept
    /// nothing, and which elements nothing would accept.
    fn explain_failure(
        &self,
        elements: &[&T],
        matrix: &MatchMatrix,
        pairing: &[(usize, usize)],
        listener: &mut MatchResultListener<'_>,
    ) {
        let mut parts = Vec::new();
        if self.mode != UnorderedMode::Subset {
            let unmatchable = (0..matrix.cols())
                .filter(|&c| (0..matrix.rows()).all(|r| !matrix.at(r, c)))
                .collect::<Vec<_>>();
            for c in unmatchable {
                parts.push(format!(
                    "the matcher ({}) matches no remaining element",
                    self.matchers[c].describe()
                ));
            }
        }
        if self.mode != UnorderedMode::Superset {
            let unmatched = (0..matrix.rows())
                .filter(|&r| (0..matrix.cols()).all(|c| !matrix.at(r, c)))
                .collect::<Vec<_>>();
            for r in unmatched {
                parts.push(format!(
                    "the element {:?} matches no matcher", elements[r]
                ));
            }
        }
        if parts.is_empty() {
            // Every row and column has an edge, but no pairing covers
            // them all.  Show the best one found.
            let listed = pairing
                .iter()
                .map(|&(r, c)| format!("(element #{r}, matcher #{c})"))
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!(
                "the best pairing covers only {} of the required {}: {}",
                pairing.len(),
                self.mode.required_pairs(elements.len(),
                    self.matchers.len()),
                listed
            ));
        }
        let _ = write!(listener, "where {}", parts.join(", and "));
    }
}

impl<C, T> MatcherImpl<C> for Unordered<C, T>
where
    C: ?Sized,
    T: fmt::Debug + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn match_and_explain(
        &self,
        value: &C,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        let elements = value.into_iter().collect::<Vec<_>>();
        if self.mode == UnorderedMode::ExactMatch
            && elements.len() != self.matchers.len()
        {
            let _ = write!(listener, "which has {} elements",
                elements.len());
            return false;
        }
        let mut matrix =
            MatchMatrix::new(elements.len(), self.matchers.len());
        for (r, element) in elements.iter().enumerate() {
            for (c, m) in self.matchers.iter().enumerate() {
                matrix.set(r, c, m.matches(element));
            }
        }
        let pairing = matrix.find_max_matching();
        let required =
            self.mode.required_pairs(elements.len(), self.matchers.len());
        if pairing.len() == required {
            true
        } else {
            if listener.is_interested() {
                self.explain_failure(&elements, &matrix, &pairing,
                    listener);
            }
            false
        }
    }

    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self.mode {
            UnorderedMode::ExactMatch if self.matchers.is_empty() => {
                return out.write_str("is empty");
            },
            UnorderedMode::ExactMatch => {
                write!(out, "has {} elements where, in some order: ",
                    self.matchers.len())?;
            },
            UnorderedMode::Superset => {
                out.write_str("is a superset of: ")?;
            },
            UnorderedMode::Subset => {
                out.write_str("is a subset of: ")?;
            },
        }
        describe_element_list(&self.matchers, out)
    }

    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self.mode {
            UnorderedMode::ExactMatch if self.matchers.is_empty() => {
                return out.write_str("isn't empty");
            },
            UnorderedMode::ExactMatch => {
                write!(out, "doesn't have {} elements where, in some \
                    order: ", self.matchers.len())?;
            },
            UnorderedMode::Superset => {
                out.write_str("isn't a superset of: ")?;
            },
            UnorderedMode::Subset => {
                out.write_str("isn't a subset of: ")?;
            },
        }
        describe_element_list(&self.matchers, out)
    }
}

fn unordered<C, T, I>(matchers: I, mode: UnorderedMode) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: fmt::Debug + 'static,
    I: IntoIterator<Item = Matcher<T>>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    Matcher::new(Unordered {
        matchers: matchers.into_iter().collect(),
        mode,
        _p: PhantomData,
    })
}

/// Matches a container with exactly these elements in any order: there
/// must be a pairing between elements and matchers that uses each exactly
/// once.  Found by maximum bipartite matching, not by trying every
/// permutation.
pub fn unordered_elements_are<C, T, I>(matchers: I) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: fmt::Debug + 'static,
    I: IntoIterator<Item = Matcher<T>>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    unordered(matchers, UnorderedMode::ExactMatch)
}

/// [`unordered_elements_are`] over plain expected values, compared with
/// `eq`.
pub fn unordered_elements_are_array<C, T, I>(expected: I) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
    I: IntoIterator<Item = T>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    unordered(expected.into_iter().map(eq), UnorderedMode::ExactMatch)
}

/// Matches a container holding, among possibly other elements, a distinct
/// element for every one of `matchers`.
pub fn is_superset_of<C, T, I>(matchers: I) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: fmt::Debug + 'static,
    I: IntoIterator<Item = Matcher<T>>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    unordered(matchers, UnorderedMode::Superset)
}

/// Matches a container all of whose elements pair with distinct members
/// of `matchers`; not every matcher needs a partner.
pub fn is_subset_of<C, T, I>(matchers: I) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: fmt::Debug + 'static,
    I: IntoIterator<Item = Matcher<T>>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    unordered(matchers, UnorderedMode::Subset)
}

struct Contains<C: ?Sized, T: 'static> {
    inner: Matcher<T>,
    count: Cardinality,
    _p: PhantomData<fn(&C)>,
}

impl<C, T> MatcherImpl<C> for Contains<C, T>
where
    C: ?Sized,
    T: fmt::Debug + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn match_and_explain(
        &self,
        value: &C,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        let n = value.into_iter()
            .filter(|e| self.inner.matches(e))
            .count();
        let ok = self.count.is_satisfied_by(n);
        if !ok && listener.is_interested() {
            let _ = write!(listener, "which contains {} matching elements",
                n);
        }
        ok
    }

    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "contains an element that {}, {}",
            self.inner.describe(), self.count.describe())
    }

    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "doesn't contain an element that {}, {}",
            self.inner.describe(), self.count.describe())
    }
}

/// Matches a container with at least one element matching `inner`.
pub fn contains<C, T>(inner: Matcher<T>) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: fmt::Debug + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    contains_times(inner, at_least(1))
}

/// Matches a container whose number of elements matching `inner`
/// satisfies `count`.
pub fn contains_times<C, T>(
    inner: Matcher<T>,
    count: impl Into<Cardinality>,
) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: fmt::Debug + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    Matcher::new(Contains {
        inner,
        count: count.into(),
        _p: PhantomData,
    })
}

struct Each<C: ?Sized, T: 'static> {
    inner: Matcher<T>,
    _p: PhantomData<fn(&C)>,
}

impl<C, T> MatcherImpl<C> for Each<C, T>
where
    C: ?Sized,
    T: fmt::Debug + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn match_and_explain(
        &self,
        value: &C,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        for (i, element) in value.into_iter().enumerate() {
            if listener.is_interested() {
                let (ok, why) = self.inner.explain(element);
                if !ok {
                    let _ = write!(listener,
                        "whose element #{i} ({element:?}) doesn't match");
                    if !why.is_empty() {
                        let _ = write!(listener, ", {why}");
                    }
                    return false;
                }
            } else if !self.inner.matches(element) {
                return false;
            }
        }
        true
    }

    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "only contains elements that {}",
            self.inner.describe())
    }

    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "contains some element that {}",
            self.inner.describe_negation())
    }
}

/// Matches a container all of whose elements match `inner`.  An empty
/// container matches vacuously.
pub fn each<C, T>(inner: Matcher<T>) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: fmt::Debug + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    Matcher::new(Each { inner, _p: PhantomData })
}

/// Matches an empty container.
pub fn is_empty<C, T>() -> Matcher<C>
where
    C: ?Sized + 'static,
    T: fmt::Debug + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    elements_are::<C, T, _>([])
}

struct SizeIs<C: ?Sized, T: 'static> {
    inner: Matcher<usize>,
    _p: PhantomData<fn(&C, &T)>,
}

impl<C, T> MatcherImpl<C> for SizeIs<C, T>
where
    C: ?Sized,
    T: 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn match_and_explain(
        &self,
        value: &C,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        let n = value.into_iter().count();
        let ok = self.inner.matches(&n);
        if listener.is_interested() {
            let _ = write!(listener, "whose size is {n}");
        }
        ok
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "has a size that {}", self.inner.describe())
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "has a size that {}", self.inner.describe_negation())
    }
}

/// Matches a container whose element count matches `inner`.
pub fn size_is<C, T>(inner: Matcher<usize>) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    Matcher::new(SizeIs { inner, _p: PhantomData })
}

struct WhenSorted<C: ?Sized, T: 'static, F> {
    compare: F,
    inner: Matcher<Vec<T>>,
    _p: PhantomData<fn(&C)>,
}

impl<C, T, F> MatcherImpl<C> for WhenSorted<C, T, F>
where
    C: ?Sized,
    T: Clone + 'static,
    F: Fn(&T, &T) -> std::cmp::Ordering + Send + Sync,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn match_and_explain(
        &self,
        value: &C,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        let mut sorted =
            value.into_iter().cloned().collect::<Vec<_>>();
        sorted.sort_by(&self.compare);
        self.inner.match_and_explain(&sorted, listener)
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "when sorted, {}", self.inner.describe())
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "when sorted, {}", self.inner.describe_negation())
    }
}

/// Sorts a copy of the container's elements, then applies `inner` to the
/// sorted `Vec`.
pub fn when_sorted<C, T>(inner: Matcher<Vec<T>>) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: Clone + Ord + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    when_sorted_by(T::cmp, inner)
}

/// [`when_sorted`] with an explicit comparator.
pub fn when_sorted_by<C, T, F>(compare: F, inner: Matcher<Vec<T>>)
    -> Matcher<C>
where
    C: ?Sized + 'static,
    T: Clone + 'static,
    F: Fn(&T, &T) -> std::cmp::Ordering + Send + Sync + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    Matcher::new(WhenSorted { compare, inner, _p: PhantomData })
}

struct Pointwise<C: ?Sized, T: 'static, U: 'static> {
    relation: Matcher<(T, U)>,
    rhs: Vec<U>,
    ordered: bool,
    _p: PhantomData<fn(&C)>,
}

impl<C, T, U> MatcherImpl<C> for Pointwise<C, T, U>
where
    C: ?Sized,
    T: Clone + fmt::Debug + 'static,
    U: Clone + fmt::Debug + Send + Sync + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn match_and_explain(
        &self,
        value: &C,
        listener: &mut MatchResultListener<'_>,
    ) -> bool {
        let elements = value.into_iter().collect::<Vec<_>>();
        if elements.len() != self.rhs.len() {
            let _ = write!(listener, "which has {} elements",
                elements.len());
            return false;
        }
        if self.ordered {
            for (i, (element, rhs)) in
                elements.iter().zip(&self.rhs).enumerate()
            {
                let pair = ((*element).clone(), rhs.clone());
                if !self.relation.matches(&pair) {
                    let _ = write!(listener,
                        "whose element #{i} ({element:?}) and {rhs:?} \
                         don't match");
                    return false;
                }
            }
            true
        } else {
            let mut matrix =
                MatchMatrix::new(elements.len(), self.rhs.len());
            for (r, element) in elements.iter().enumerate() {
                for (c, rhs) in self.rhs.iter().enumerate() {
                    let pair = ((*element).clone(), rhs.clone());
                    matrix.set(r, c, self.relation.matches(&pair));
                }
            }
            let pairs = matrix.find_max_matching().len();
            if pairs == elements.len() {
                true
            } else {
                let _ = write!(listener,
                    "where only {} of {} elements can be paired",
                    pairs, elements.len());
                false
            }
        }
    }

    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let order = if self.ordered {
            "its corresponding value"
        } else {
            "some distinct value"
        };
        write!(out, "has {} elements, where each element and {order} in \
            {:?} {}", self.rhs.len(), self.rhs, self.relation.describe())
    }

    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str("doesn't ")?;
        self.describe_to(out)
    }
}

/// Matches a container of the same length as `rhs` where every element
/// and its positional partner satisfy the binary relation, given as a
/// matcher over the pair.
///
/// # Examples
/// ```
/// use mimicry::matchers::{lt2, pointwise};
///
/// // Each element strictly less than its partner.
/// let m = pointwise(lt2(), vec![2, 4, 6]);
/// assert!(m.matches(&vec![1, 3, 5]));
/// assert!(!m.matches(&vec![1, 5, 5]));
/// ```
pub fn pointwise<C, T, R>(
    relation: Matcher<(T, T)>,
    rhs: R,
) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: Clone + fmt::Debug + Send + Sync + 'static,
    R: IntoIterator<Item = T>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    Matcher::new(Pointwise {
        relation,
        rhs: rhs.into_iter().collect(),
        ordered: true,
        _p: PhantomData,
    })
}

/// Like [`pointwise`], except elements pair with `rhs` values in any
/// order, using maximum bipartite matching.
pub fn unordered_pointwise<C, T, R>(
    relation: Matcher<(T, T)>,
    rhs: R,
) -> Matcher<C>
where
    C: ?Sized + 'static,
    T: Clone + fmt::Debug + Send + Sync + 'static,
    R: IntoIterator<Item = T>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    Matcher::new(Pointwise {
        relation,
        rhs: rhs.into_iter().collect(),
        ordered: false,
        _p: PhantomData,
    })
}

#[cfg(test)]
mod t {
    use crate::matchers::basic::{anything, eq, eq2, ge, gt, lt, lt2};

    use super::*;

    #[test]
    fn ordered_elements() {
        let m = elements_are::<Vec<i32>, _, _>([gt(0), lt(0), anything()]);
        assert!(m.matches(&vec![5, -5, 0]));
        assert!(!m.matches(&vec![-5, 5, 0]));
        assert!(!m.matches(&vec![5, -5]));
        let (_, why) = m.explain(&vec![5, -5]);
        assert_eq!("which has 2 elements", why);
        let (_, why) = m.explain(&vec![5, 5, 0]);
        assert!(why.contains("element #1"));
    }

    #[test]
    fn ordered_values() {
        let m = elements_are_array::<Vec<i32>, _, _>([1, 2, 3]);
        assert!(m.matches(&vec![1, 2, 3]));
        assert!(!m.matches(&vec![3, 2, 1]));
        // Works on slices too.
        let m = elements_are_array::<[i32], _, _>([1, 2]);
        assert!(m.matches(&[1, 2][..]));
    }

    #[test]
    fn unordered_exact() {
        let m = unordered_elements_are_array::<Vec<i32>, _, _>([3, 1, 2]);
        assert!(m.matches(&vec![1, 2, 3]));
        assert!(!m.matches(&vec![1, 2, 2]));
        assert!(!m.matches(&vec![1, 2]));

        // Requires a perfect pairing, not merely per-matcher hits: both
        // matchers accept 5, but only one element exists for them.
        let m = unordered_elements_are::<Vec<i32>, _, _>([ge(5), ge(5)]);
        assert!(!m.matches(&vec![5, 1]));
        assert!(m.matches(&vec![5, 6]));
    }

    #[test]
    fn unordered_failure_analysis() {
        let m =
            unordered_elements_are_array::<Vec<i32>, _, _>([1, 2, 3]);
        let (ok, why) = m.explain(&vec![1, 2, 9]);
        assert!(!ok);
        assert!(why.contains("matches no remaining element"), "{why}");
        assert!(why.contains("the element 9 matches no matcher"), "{why}");
    }

    #[test]
    fn unordered_failure_lists_the_best_pairing() {
        // Every element and matcher has at least one partner, yet no
        // complete pairing exists.
        let m = unordered_elements_are::<Vec<i32>, _, _>(
            [eq(1), eq(1), anything()]);
        let (ok, why) = m.explain(&vec![1, 2, 3]);
        assert!(!ok);
        assert!(why.contains("covers only 2 of the required 3"), "{why}");
        assert!(why.contains("(element #0, matcher #0)"), "{why}");
        assert!(why.contains("(element #1, matcher #2)"), "{why}");
    }

    #[test]
    fn superset_and_subset() {
        let sup = is_superset_of::<Vec<i32>, _, _>([eq(1), eq(2)]);
        assert!(sup.matches(&vec![3, 2, 1]));
        assert!(!sup.matches(&vec![1, 3]));

        let sub = is_subset_of::<Vec<i32>, _, _>([eq(1), eq(2), eq(3)]);
        assert!(sub.matches(&vec![3, 1]));
        assert!(!sub.matches(&vec![1, 4]));
        // Duplicates need distinct partners.
        assert!(!sub.matches(&vec![1, 1]));
    }

    #[test]
    fn contains_and_each() {
        assert!(contains::<Vec<i32>, _>(gt(4)).matches(&vec![1, 5, 2]));
        assert!(!contains::<Vec<i32>, _>(gt(9)).matches(&vec![1, 5, 2]));
        assert!(contains_times::<Vec<i32>, _>(gt(1), 2)
            .matches(&vec![1, 5, 2]));
        assert!(!contains_times::<Vec<i32>, _>(gt(1), 2)
            .matches(&vec![1, 5, 2, 3]));
        assert!(each::<Vec<i32>, _>(gt(0)).matches(&vec![1, 2, 3]));
        assert!(!each::<Vec<i32>, _>(gt(0)).matches(&vec![1, -2, 3]));
        assert!(each::<Vec<i32>, _>(gt(0)).matches(&vec![]));
    }

    #[test]
    fn sizes() {
        assert!(is_empty::<Vec<i32>, i32>().matches(&vec![]));
        assert!(!is_empty::<Vec<i32>, i32>().matches(&vec![1]));
        assert!(size_is::<Vec<i32>, i32>(eq(2)).matches(&vec![1, 2]));
        assert!(size_is::<Vec<i32>, i32>(gt(1)).matches(&vec![1, 2, 3]));
    }

    #[test]
    fn sorted_views() {
        let m = when_sorted::<Vec<i32>, _>(
            elements_are_array([1, 2, 3]));
        assert!(m.matches(&vec![3, 1, 2]));
        assert!(!m.matches(&vec![3, 1, 4]));

        let descending = when_sorted_by::<Vec<i32>, _, _>(
            |a, b| b.cmp(a), elements_are_array([3, 2, 1]));
        assert!(descending.matches(&vec![1, 3, 2]));
    }

    #[test]
    fn pointwise_relations() {
        let m = pointwise::<Vec<i32>, _, _>(lt2(), [2, 4, 6]);
        assert!(m.matches(&vec![1, 3, 5]));
        assert!(!m.matches(&vec![1, 5, 5]));
        assert!(!m.matches(&vec![1, 3]));

        let m = unordered_pointwise::<Vec<i32>, _, _>(eq2(), [3, 1, 2]);
        assert!(m.matches(&vec![1, 2, 3]));
        assert!(!m.matches(&vec![1, 2, 2]));
    }
}
