use std::fmt;

use num_traits::Float;
use serde::ser::{Serialize, SerializeTuple, Serializer};

/// Closed interval `[lower, upper]`, serialized as a two-element array.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Interval<T> {
    pub lower: T,
    pub upper: T,
}

impl<T: Float> Interval<T> {
    /// Create asymmetric interval.
    #[inline]
    pub const fn new(lower: T, upper: T) -> Self {
        Self { lower, upper }
    }

    /// Create symmetric interval: `[estimate - error, estimate + error]`.
    #[inline]
    pub fn symmetric(estimate: T, error: T) -> Self {
        Self::new(estimate - error, estimate + error)
    }

    /// Restrict both bounds to `[min, max]`.
    #[must_use]
    pub fn clamp(self, min: T, max: T) -> Self {
        Self::new(self.lower.max(min).min(max), self.upper.max(min).min(max))
    }

    /// Check if value lies within `[lower, upper]` (inclusive).
    #[inline]
    pub fn contains(&self, value: T) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Interval width: `upper - lower`.
    #[inline]
    pub fn width(&self) -> T {
        self.upper - self.lower
    }

    /// Midpoint: `(lower + upper) / 2`.
    #[inline]
    pub fn midpoint(&self) -> T {
        (self.lower + self.upper) / (T::one() + T::one())
    }

    /// Format with a precision derived from the interval width.
    pub fn format(&self, style: IntervalStyle) -> FormattedInterval<'_, T> {
        FormattedInterval { interval: self, style }
    }
}

impl<T: Serialize> Serialize for Interval<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.lower)?;
        tuple.serialize_element(&self.upper)?;
        tuple.end()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IntervalStyle {
    /// Bounds only: `[4.46, 5.43]`
    #[default]
    Bounds,
    /// Midpoint and half-width: `4.87 ± 0.48`
    Symmetric,
}

/// Display adapter returned by [`Interval::format`].
///
/// Rounds to two significant digits of the half-width, so `[4.4612, 5.4288]`
/// prints as `[4.46, 5.43]`.
pub struct FormattedInterval<'a, T> {
    interval: &'a Interval<T>,
    style: IntervalStyle,
}

impl<T: Float + fmt::Display> fmt::Display for FormattedInterval<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Interval { lower, upper } = *self.interval;
        let half = self.interval.width().to_f64().unwrap_or(f64::NAN) / 2.0;

        if !half.is_finite() || half <= 0.0 {
            return write!(f, "[{lower}, {upper}]");
        }

        let decimals = (1.0 - half.log10().floor()).max(0.0) as usize;
        let lo = lower.to_f64().unwrap_or(f64::NAN);
        let hi = upper.to_f64().unwrap_or(f64::NAN);

        match self.style {
            IntervalStyle::Bounds => write!(f, "[{lo:.decimals$}, {hi:.decimals$}]"),
            IntervalStyle::Symmetric => {
                let mid = (lo + hi) / 2.0;
                write!(f, "{mid:.decimals$} ± {half:.decimals$}")
            }
        }
    }
}
