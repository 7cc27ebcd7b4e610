// vim: tw=80
//! Approximate floating point matchers.
//!
//! Equality is measured in ULPs (units in the last place) over a biased
//! integer reordering of the IEEE 754 bit patterns, so the tolerance scales
//! with the magnitude of the expected value.  Two values within 4 ULPs of
//! each other compare equal.

use std::fmt;

use super::{MatchResultListener, Matcher, MatcherImpl};

const MAX_ULPS: u64 = 4;

macro_rules! float_matchers {
    ($float:ty, $bits:ty, $sign:expr,
     $eq:ident, $nan_eq:ident, $near:ident, $nan_near:ident) =>
    {
        #[allow(clippy::cast_lossless)]
        mod $eq {
            use super::*;

            // Reorder sign-and-magnitude bit patterns so that consecutive
            // representable floats map to consecutive integers.
            fn biased(bits: $bits) -> $bits {
                if bits & $sign != 0 {
                    (!bits).wrapping_add(1)
                } else {
                    $sign | bits
                }
            }

            fn ulp_distance(a: $float, b: $float) -> u64 {
                let (ba, bb) = (biased(a.to_bits()), biased(b.to_bits()));
                ba.abs_diff(bb) as u64
            }

            pub(super) struct FloatingEq {
                pub(super) expected: $float,
                pub(super) max_abs_error: Option<$float>,
                pub(super) nan_sensitive: bool,
            }

            impl FloatingEq {
                fn is_match(&self, value: $float) -> bool {
                    if self.expected.is_nan() || value.is_nan() {
                        return self.nan_sensitive
                            && self.expected.is_nan()
                            && value.is_nan();
                    }
                    match self.max_abs_error {
                        Some(e) => (value - self.expected).abs() <= e,
                        None => {
                            ulp_distance(value, self.expected) <= MAX_ULPS
                        },
                    }
                }
            }

            impl MatcherImpl<$float> for FloatingEq {
                fn match_and_explain(
                    &self,
                    value: &$float,
                    _listener: &mut MatchResultListener<'_>,
                ) -> bool {
                    self.is_match(*value)
                }

                fn describe_to(
                    &self,
                    out: &mut dyn fmt::Write,
                ) -> fmt::Result {
                    if self.expected.is_nan() && !self.nan_sensitive {
                        return out.write_str("never matches");
                    }
                    write!(out, "is approximately {:?}", self.expected)?;
                    if let Some(e) = self.max_abs_error {
                        write!(out, " (absolute error <= {e:?})")?;
                    }
                    Ok(())
                }

                fn describe_negation_to(
                    &self,
                    out: &mut dyn fmt::Write,
                ) -> fmt::Result {
                    if self.expected.is_nan() && !self.nan_sensitive {
                        return out.write_str("is anything");
                    }
                    write!(out, "isn't approximately {:?}", self.expected)?;
                    if let Some(e) = self.max_abs_error {
                        write!(out, " (absolute error > {e:?})")?;
                    }
                    Ok(())
                }
            }
        }

        /// Matches a value within 4 ULPs of `expected`.  A NaN expectation
        /// never matches anything; use the NaN-sensitive variant for that.
        pub fn $eq(expected: $float) -> Matcher<$float> {
            Matcher::new($eq::FloatingEq {
                expected,
                max_abs_error: None,
                nan_sensitive: false,
            })
        }

        /// Like the ULP matcher, except two NaNs compare equal.
        pub fn $nan_eq(expected: $float) -> Matcher<$float> {
            Matcher::new($eq::FloatingEq {
                expected,
                max_abs_error: None,
                nan_sensitive: true,
            })
        }

        /// Matches a value within `max_abs_error` of `expected`.
        pub fn $near(
            expected: $float,
            max_abs_error: $float,
        ) -> Matcher<$float> {
            assert!(
                max_abs_error >= 0.0,
                "max_abs_error must be non-negative"
            );
            Matcher::new($eq::FloatingEq {
                expected,
                max_abs_error: Some(max_abs_error),
                nan_sensitive: false,
            })
        }

        /// Like the absolute-error matcher, except two NaNs compare equal.
        pub fn $nan_near(
            expected: $float,
            max_abs_error: $float,
        ) -> Matcher<$float> {
            assert!(
                max_abs_error >= 0.0,
                "max_abs_error must be non-negative"
            );
            Matcher::new($eq::FloatingEq {
                expected,
                max_abs_error: Some(max_abs_error),
                nan_sensitive: true,
            })
        }
    }
}

float_matchers!(f32, u32, 0x8000_0000u32,
    float_eq, nan_sensitive_float_eq, float_near, nan_sensitive_float_near);
float_matchers!(f64, u64, 0x8000_0000_0000_0000u64,
    double_eq, nan_sensitive_double_eq, double_near,
    nan_sensitive_double_near);

/// Matches any NaN, of either type of float.
pub fn is_nan<T>() -> Matcher<T>
where
    T: Float + Send + Sync + 'static,
{
    struct IsNan<T>(std::marker::PhantomData<fn(&T)>);
    impl<T: Float + Send + Sync> MatcherImpl<T> for IsNan<T> {
        fn match_and_explain(
            &self,
            value: &T,
            _listener: &mut MatchResultListener<'_>,
        ) -> bool {
            value.is_nan()
        }
        fn describe_to(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            out.write_str("is NaN")
        }
        fn describe_negation_to(
            &self,
            out: &mut dyn fmt::Write,
        ) -> fmt::Result {
            out.write_str("isn't NaN")
        }
    }
    Matcher::new(IsNan(std::marker::PhantomData))
}

/// The two primitive float types, for [`is_nan`].
pub trait Float {
    fn is_nan(&self) -> bool;
}
impl Float for f32 {
    fn is_nan(&self) -> bool {
        f32::is_nan(*self)
    }
}
impl Float for f64 {
    fn is_nan(&self) -> bool {
        f64::is_nan(*self)
    }
}
