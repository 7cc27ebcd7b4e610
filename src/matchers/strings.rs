// vim: tw=80
//! String matchers, generic over anything that views as a `str`.

use std::fmt;
use std::marker::PhantomData;

use regex::Regex;

use super::{MatchResultListener, Matcher, MatcherImpl};

struct StrMatcher<T: ?Sized> {
    expected: String,
    desc: &'static str,
    negated_desc: &'static str,
    op: fn(&str, &str) -> bool,
    _p: PhantomData<fn(&T)>,
}

impl<T> MatcherImpl<T> for StrMatcher<T>
where
    T: AsRef<str> + ?Sized,
{
    fn match_and_explain(
        &self,
        value: &T,
        _listener: &mut MatchResultListener<'_>,
    ) -> bool {
        (self.op)(value.as_ref(), &self.expected)
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{} {:?}", self.desc, self.expected)
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{} {:?}", self.negated_desc, self.expected)
    }
}

fn str_matcher<T>(
    expected: impl Into<String>,
    desc: &'static str,
    negated_desc: &'static str,
    op: fn(&str, &str) -> bool,
) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    Matcher::new(StrMatcher {
        expected: expected.into(),
        desc,
        negated_desc,
        op,
        _p: PhantomData,
    })
}

/// Matches a string equal to `expected`.
///
/// Unlike `eq`, this is generic over the string-like type of the matched
/// value, so one matcher serves `&str`, `String`, and anything else that
/// is `AsRef<str>`.
pub fn str_eq<T>(expected: impl Into<String>) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    str_matcher(expected, "is equal to", "isn't equal to", |v, e| v == e)
}

/// Matches a string not equal to `expected`.
pub fn str_ne<T>(expected: impl Into<String>) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    str_matcher(expected, "isn't equal to", "is equal to", |v, e| v != e)
}

fn case_eq(a: &str, b: &str) -> bool {
    // Full case folding, not just ASCII.
    a.chars().flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Matches a string equal to `expected`, ignoring case.
pub fn str_case_eq<T>(expected: impl Into<String>) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    str_matcher(expected, "is equal to (ignoring case)",
        "isn't equal to (ignoring case)", case_eq)
}

/// Matches a string not equal to `expected`, ignoring case.
pub fn str_case_ne<T>(expected: impl Into<String>) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    str_matcher(expected, "isn't equal to (ignoring case)",
        "is equal to (ignoring case)", |v, e| !case_eq(v, e))
}

/// Matches a string containing `substring`.
pub fn has_substr<T>(substring: impl Into<String>) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    str_matcher(substring, "has substring", "has no substring",
        |v, e| v.contains(e))
}

/// Matches a string starting with `prefix`.
pub fn starts_with<T>(prefix: impl Into<String>) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    str_matcher(prefix, "starts with", "doesn't start with",
        |v, e| v.starts_with(e))
}

/// Matches a string ending with `suffix`.
pub fn ends_with<T>(suffix: impl Into<String>) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    str_matcher(suffix, "ends with", "doesn't end with",
        |v, e| v.ends_with(e))
}

struct RegexMatcher<T: ?Sized> {
    re: Regex,
    full_match: bool,
    _p: PhantomData<fn(&T)>,
}

impl<T> MatcherImpl<T> for RegexMatcher<T>
where
    T: AsRef<str> + ?Sized,
{
    fn match_and_explain(
        &self,
        value: &T,
        _listener: &mut MatchResultListener<'_>,
    ) -> bool {
        self.re.is_match(value.as_ref())
    }
    fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let verb = if self.full_match { "matches" } else { "contains" };
        write!(out, "{} regular expression {:?}", verb, self.re.as_str())
    }
    fn describe_negation_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let verb = if self.full_match {
            "doesn't match"
        } else {
            "doesn't contain"
        };
        write!(out, "{} regular expression {:?}", verb, self.re.as_str())
    }
}

/// Matches a string that the regular expression matches in its entirety.
///
/// # Panics
///
/// Panics if `pattern` is not a valid regular expression.
pub fn matches_regex<T>(pattern: &str) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    // Anchor without changing the meaning of alternations in the pattern.
    let anchored = format!("^(?:{pattern})$");
    match Regex::new(&anchored) {
        Ok(re) => Matcher::new(RegexMatcher {
            re,
            full_match: true,
            _p: PhantomData,
        }),
        Err(e) => panic!("invalid regular expression {pattern:?}: {e}"),
    }
}

/// Matches a string containing a match of the regular expression.
///
/// # Panics
///
/// Panics if `pattern` is not a valid regular expression.
pub fn contains_regex<T>(pattern: &str) -> Matcher<T>
where
    T: AsRef<str> + ?Sized + 'static,
{
    match Regex::new(pattern) {
        Ok(re) => Matcher::new(RegexMatcher {
            re,
            full_match: false,
            _p: PhantomData,
        }),
        Err(e) => panic!("invalid regular expression {pattern:?}: {e}"),
    }
}
