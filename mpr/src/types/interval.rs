use crate::tape::Choice;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Stores a range, with conservative calculations to guarantee that it always
/// contains the actual value.
///
/// There are two kinds of valid interval:
/// - `[lower, upper]` where `lower <= upper` (either bound may be infinite)
/// - `[NaN, NaN]`, which represents an undefined result
///
/// # Warning
/// This implementation does not set rounding modes, so it may not be _perfect_.
#[derive(Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Interval {
    lower: f32,
    upper: f32,
}

impl std::fmt::Debug for Interval {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> Result<(), std::fmt::Error> {
        f.debug_tuple("")
            .field(&self.lower)
            .field(&self.upper)
            .finish()
    }
}

/// Padding applied to transcendental bounds, which are computed without
/// directed rounding
const TRIG_PAD: f32 = 1e-6;

impl Interval {
    /// The interval covering the entire real line
    pub const EVERYTHING: Self = Self {
        lower: f32::NEG_INFINITY,
        upper: f32::INFINITY,
    };

    /// The undefined interval
    pub const NAN: Self = Self {
        lower: f32::NAN,
        upper: f32::NAN,
    };

    /// Builds a new interval
    ///
    /// # Panics
    /// Panics if the resulting interval would be invalid
    #[inline]
    pub fn new(lower: f32, upper: f32) -> Self {
        assert!(
            upper >= lower || (lower.is_nan() && upper.is_nan()),
            "invalid interval [{lower}, {upper}]"
        );
        Self { lower, upper }
    }

    /// Builds an interval from arithmetic results, collapsing to
    /// [`Interval::NAN`] if either bound is `NaN` (e.g. from `inf - inf`)
    #[inline]
    fn bounded(lower: f32, upper: f32) -> Self {
        if lower.is_nan() || upper.is_nan() {
            Self::NAN
        } else {
            Self::new(lower, upper)
        }
    }

    /// Returns the lower bound of the interval
    #[inline]
    pub fn lower(&self) -> f32 {
        self.lower
    }
    /// Returns the upper bound of the interval
    #[inline]
    pub fn upper(&self) -> f32 {
        self.upper
    }
    /// Checks whether the given value is contained in the interval
    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.lower && v <= self.upper
    }
    /// Returns `true` if either bound of the interval is `NaN`
    #[inline]
    pub fn has_nan(&self) -> bool {
        self.lower.is_nan() || self.upper.is_nan()
    }
    /// Returns `true` if both bounds are finite (neither infinite nor `NaN`)
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }
    /// Returns the midpoint of the interval
    pub fn midpoint(self) -> f32 {
        (self.lower + self.upper) / 2.0
    }
    /// Calculates the width of the interval
    ///
    /// ```
    /// # use mpr::types::Interval;
    /// let a = Interval::new(2.0, 3.0);
    /// assert_eq!(a.width(), 1.0);
    /// let b = Interval::new(2.0, 5.0);
    /// assert_eq!(b.width(), 3.0);
    /// ```
    pub fn width(self) -> f32 {
        self.upper - self.lower
    }

    /// Calculates the absolute value of the interval
    pub fn abs(self) -> Self {
        if self.lower < 0.0 {
            if self.upper > 0.0 {
                Interval::new(0.0, self.upper.max(-self.lower))
            } else {
                Interval::new(-self.upper, -self.lower)
            }
        } else {
            self
        }
    }
    /// Squares the interval
    ///
    /// Note that this has tighter bounds than multiplication, because we know
    /// that both sides of the multiplication are the same value.
    pub fn square(self) -> Self {
        if self.upper < 0.0 {
            Interval::new(self.upper.powi(2), self.lower.powi(2))
        } else if self.lower > 0.0 {
            Interval::new(self.lower.powi(2), self.upper.powi(2))
        } else if self.has_nan() {
            Self::NAN
        } else {
            Interval::new(0.0, self.lower.abs().max(self.upper.abs()).powi(2))
        }
    }
    /// Calculates the square root of the interval
    ///
    /// The portion of the interval below zero is ignored; if the entire
    /// interval is below zero, returns [`Interval::NAN`].
    pub fn sqrt(self) -> Self {
        if self.has_nan() || self.upper < 0.0 {
            Self::NAN
        } else if self.lower < 0.0 {
            Interval::new(0.0, self.upper.sqrt())
        } else {
            Interval::new(self.lower.sqrt(), self.upper.sqrt())
        }
    }
    /// Calculates the reciprocal of the interval
    ///
    /// If the interval touches or includes 0, returns
    /// [`Interval::EVERYTHING`]
    pub fn recip(self) -> Self {
        if self.has_nan() {
            Self::NAN
        } else if self.lower > 0.0 || self.upper < 0.0 {
            Interval::new(1.0 / self.upper, 1.0 / self.lower)
        } else {
            Self::EVERYTHING
        }
    }
    /// Computes the sine of the interval
    pub fn sin(self) -> Self {
        self.periodic(f64::sin, FRAC_PI_2, -FRAC_PI_2)
    }
    /// Computes the cosine of the interval
    pub fn cos(self) -> Self {
        self.periodic(f64::cos, 0.0, PI)
    }
    /// Shared implementation for `sin` and `cos`
    ///
    /// `max_phase` and `min_phase` are the positions of the function's maximum
    /// and minimum within one period.
    fn periodic(
        self,
        f: fn(f64) -> f64,
        max_phase: f64,
        min_phase: f64,
    ) -> Self {
        if self.has_nan() {
            return Self::NAN;
        }
        let (a, b) = (self.lower as f64, self.upper as f64);
        if !(b - a).is_finite() || b - a >= TAU {
            return Interval::new(-1.0, 1.0);
        }
        let encloses = |phase: f64| {
            let k = ((a - phase) / TAU).ceil();
            phase + k * TAU <= b
        };
        let (fa, fb) = (f(a), f(b));
        let lower = if encloses(min_phase) { -1.0 } else { fa.min(fb) };
        let upper = if encloses(max_phase) { 1.0 } else { fa.max(fb) };
        Interval::new(
            (lower as f32 - TRIG_PAD).max(-1.0),
            (upper as f32 + TRIG_PAD).min(1.0),
        )
    }
    /// Computes the tangent of the interval
    ///
    /// Returns [`Interval::NAN`] if the result contains an undefined point
    pub fn tan(self) -> Self {
        let size = self.upper - self.lower;
        if size >= std::f32::consts::PI {
            Self::NAN
        } else {
            let lower = self.lower.tan();
            let upper = self.upper.tan();
            if upper >= lower {
                Interval::new(lower, upper)
            } else {
                Self::NAN
            }
        }
    }
    /// Computes the arcsine of the interval
    ///
    /// Returns [`Interval::NAN`] if the input is invalid
    pub fn asin(self) -> Self {
        if self.has_nan() || self.lower < -1.0 || self.upper > 1.0 {
            Self::NAN
        } else {
            Interval::new(self.lower.asin(), self.upper.asin())
        }
    }
    /// Computes the arccosine of the interval
    ///
    /// Returns [`Interval::NAN`] if the input is invalid
    pub fn acos(self) -> Self {
        if self.has_nan() || self.lower < -1.0 || self.upper > 1.0 {
            Self::NAN
        } else {
            Interval::new(self.upper.acos(), self.lower.acos())
        }
    }
    /// Computes the arctangent of the interval
    pub fn atan(self) -> Self {
        Interval::bounded(self.lower.atan(), self.upper.atan())
    }
    /// Computes the exponent function applied to the interval
    pub fn exp(self) -> Self {
        Interval::bounded(self.lower.exp(), self.upper.exp())
    }
    /// Computes the natural log of the input interval
    ///
    /// An interval touching zero is unbounded below; an interval that is
    /// entirely non-positive returns [`Interval::NAN`].
    pub fn ln(self) -> Self {
        if self.has_nan() || self.upper <= 0.0 {
            Self::NAN
        } else if self.lower <= 0.0 {
            Interval::new(f32::NEG_INFINITY, self.upper.ln())
        } else {
            Interval::new(self.lower.ln(), self.upper.ln())
        }
    }

    /// Calculates the minimum of two intervals
    ///
    /// Returns both the result and a [`Choice`] indicating whether one side is
    /// always less than the other.  The comparison is strict, so intervals
    /// that touch produce [`Choice::Both`].
    ///
    /// If either side is `NAN`, returns the `NAN` interval and `Choice::Both`.
    pub fn min_choice(self, rhs: Self) -> (Self, Choice) {
        if self.has_nan() || rhs.has_nan() {
            return (Self::NAN, Choice::Both);
        }
        let choice = if self.upper < rhs.lower {
            Choice::Left
        } else if rhs.upper < self.lower {
            Choice::Right
        } else {
            Choice::Both
        };
        (
            Interval::new(self.lower.min(rhs.lower), self.upper.min(rhs.upper)),
            choice,
        )
    }
    /// Calculates the maximum of two intervals
    ///
    /// Returns both the result and a [`Choice`] indicating whether one side is
    /// always greater than the other.
    ///
    /// If either side is `NAN`, returns the `NAN` interval and `Choice::Both`.
    pub fn max_choice(self, rhs: Self) -> (Self, Choice) {
        if self.has_nan() || rhs.has_nan() {
            return (Self::NAN, Choice::Both);
        }
        let choice = if self.lower > rhs.upper {
            Choice::Left
        } else if rhs.lower > self.upper {
            Choice::Right
        } else {
            Choice::Both
        };
        (
            Interval::new(self.lower.max(rhs.lower), self.upper.max(rhs.upper)),
            choice,
        )
    }

    /// Checks that the two values are roughly equal, panicking otherwise
    #[cfg(test)]
    pub(crate) fn compare_eq(&self, other: Self) {
        let d = (self.lower - other.lower)
            .abs()
            .max((self.upper - other.upper).abs());
        if d >= 1e-6 {
            panic!("lhs != rhs ({self:?} != {other:?})");
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

impl From<[f32; 2]> for Interval {
    fn from(i: [f32; 2]) -> Interval {
        Interval::new(i[0], i[1])
    }
}

impl From<f32> for Interval {
    fn from(f: f32) -> Self {
        Interval::new(f, f)
    }
}

/// Folds the four corner products (or quotients) into a bounding interval
///
/// `NaN` corners (e.g. `0 * inf`) are skipped; if every corner is `NaN`, the
/// result is [`Interval::NAN`].
fn corners(lhs: Interval, rhs: Interval, f: fn(f32, f32) -> f32) -> Interval {
    let mut lower = f32::NAN;
    let mut upper = f32::NAN;
    for i in [lhs.lower, lhs.upper] {
        for j in [rhs.lower, rhs.upper] {
            let v = f(i, j);
            lower = lower.min(v);
            upper = upper.max(v);
        }
    }
    Interval::bounded(lower, upper)
}

impl std::ops::Add<Interval> for Interval {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Interval::bounded(self.lower + rhs.lower, self.upper + rhs.upper)
    }
}

impl std::ops::Mul<Interval> for Interval {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        if self.has_nan() || rhs.has_nan() {
            return Self::NAN;
        }
        corners(self, rhs, |a, b| a * b)
    }
}

impl std::ops::Mul<f32> for Interval {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        if self.has_nan() || rhs.is_nan() {
            Self::NAN
        } else if rhs < 0.0 {
            Interval::bounded(self.upper * rhs, self.lower * rhs)
        } else {
            Interval::bounded(self.lower * rhs, self.upper * rhs)
        }
    }
}

impl std::ops::Div<Interval> for Interval {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        if self.has_nan() || rhs.has_nan() {
            Self::NAN
        } else if rhs.lower > 0.0 || rhs.upper < 0.0 {
            corners(self, rhs, |a, b| a / b)
        } else {
            Self::EVERYTHING
        }
    }
}

impl std::ops::Sub<Interval> for Interval {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Interval::bounded(self.lower - rhs.upper, self.upper - rhs.lower)
    }
}

impl std::ops::Neg for Interval {
    type Output = Self;
    fn neg(self) -> Self {
        Interval {
            lower: -self.upper,
            upper: -self.lower,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_min_max_choice() {
        let a = Interval::new(0.0, 1.0);
        let b = Interval::new(0.5, 1.5);
        let (v, c) = a.min_choice(b);
        assert_eq!(v, [0.0, 1.0].into());
        assert_eq!(c, Choice::Both);

        let (v, c) = a.max_choice(b);
        assert_eq!(v, [0.5, 1.5].into());
        assert_eq!(c, Choice::Both);

        let x = Interval::new(2.0, 3.0);
        let y = Interval::new(-1.0, 0.0);
        let (v, c) = x.min_choice(y);
        assert_eq!(v, [-1.0, 0.0].into());
        assert_eq!(c, Choice::Right);
        let (v, c) = x.max_choice(y);
        assert_eq!(v, [2.0, 3.0].into());
        assert_eq!(c, Choice::Left);
    }

    #[test]
    fn test_touching_bounds_are_ambiguous() {
        let a = Interval::new(0.0, 1.0);
        let b = Interval::new(1.0, 2.0);
        assert_eq!(a.min_choice(b).1, Choice::Both);
        assert_eq!(b.min_choice(a).1, Choice::Both);
        assert_eq!(a.max_choice(b).1, Choice::Both);
    }

    #[test]
    fn test_nan_choice() {
        let (v, c) = Interval::NAN.min_choice(Interval::new(0.0, 1.0));
        assert!(v.has_nan());
        assert_eq!(c, Choice::Both);
    }

    #[test]
    fn test_recip_widens() {
        let a = Interval::new(-1.0, 1.0);
        assert_eq!(a.recip(), Interval::EVERYTHING);
        let a = Interval::new(0.0, 1.0);
        assert_eq!(a.recip(), Interval::EVERYTHING);
        let a = Interval::new(2.0, 4.0);
        assert_eq!(a.recip(), [0.25, 0.5].into());

        let b = Interval::new(1.0, 2.0) / Interval::new(-1.0, 1.0);
        assert_eq!(b, Interval::EVERYTHING);
        assert!(!b.is_finite());
    }

    #[test]
    fn test_mul() {
        let a = Interval::new(-1.0, 2.0);
        let b = Interval::new(-3.0, 0.5);
        assert_eq!(a * b, [-6.0, 3.0].into());
        assert_eq!(a * -2.0, [-4.0, 2.0].into());

        // 0 * inf corners are skipped
        let c = Interval::new(0.0, 1.0) * Interval::EVERYTHING;
        assert_eq!(c, Interval::EVERYTHING);
    }

    #[test]
    fn test_sqrt_ln() {
        Interval::new(-1.0, 4.0).sqrt().compare_eq([0.0, 2.0].into());
        assert!(Interval::new(-2.0, -1.0).sqrt().has_nan());

        let v = Interval::new(0.0, 1.0).ln();
        assert_eq!(v.lower(), f32::NEG_INFINITY);
        assert_eq!(v.upper(), 0.0);
        assert!(Interval::new(-2.0, 0.0).ln().has_nan());
    }

    #[test]
    fn test_sin_cos() {
        let full = Interval::new(0.0, 10.0);
        assert_eq!(full.sin(), [-1.0, 1.0].into());

        // Monotonic region
        let a = Interval::new(0.0, 1.0).sin();
        assert!(a.lower() <= 0.0 && a.lower() > -1e-5);
        assert!(a.upper() >= 1f32.sin() && a.upper() < 1f32.sin() + 1e-5);

        // Encloses the maximum at pi/2
        let b = Interval::new(1.0, 2.0).sin();
        assert_eq!(b.upper(), 1.0);
        assert!(b.lower() <= 2f32.sin().min(1f32.sin()));

        // Cosine encloses its minimum at pi
        let c = Interval::new(3.0, 3.5).cos();
        assert_eq!(c.lower(), -1.0);
        assert!(c.upper() >= 3f32.cos().max(3.5f32.cos()));
    }

    #[test]
    fn test_infinite_add() {
        let a = Interval::new(f32::INFINITY, f32::INFINITY);
        let b = Interval::EVERYTHING;
        assert!((a + b).has_nan());
        assert!((b - b).lower() == f32::NEG_INFINITY);
    }
}
