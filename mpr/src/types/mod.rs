//! Custom types used during evaluation
//!
//! Each evaluator stage picks one numeric type at compile time: tiles and
//! subtiles evaluate with [`Interval`], pixels evaluate with `f32` and then
//! [`Dual`] for normals.  All three implement [`EvalMath`], so a single
//! generic interpreter ([`TapeView::eval`](crate::tape::TapeView::eval))
//! serves every stage.
mod dual;
mod interval;

pub use dual::Dual;
pub use interval::Interval;

use crate::tape::Choice;

/// Trait for math operations used during evaluation
pub trait EvalMath:
    Clone
    + Copy
    + From<f32>
    + std::ops::Add<Self, Output = Self>
    + std::ops::Mul<Self, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::Div<Self, Output = Self>
    + std::ops::Neg<Output = Self>
{
    /// Absolute value
    fn abs(self) -> Self;
    /// Reciprocal (`1 / self`)
    fn recip(self) -> Self;
    /// Square root
    fn sqrt(self) -> Self;
    /// Square (`self * self`)
    fn square(self) -> Self;
    #[allow(missing_docs)]
    fn sin(self) -> Self;
    #[allow(missing_docs)]
    fn cos(self) -> Self;
    #[allow(missing_docs)]
    fn tan(self) -> Self;
    #[allow(missing_docs)]
    fn asin(self) -> Self;
    #[allow(missing_docs)]
    fn acos(self) -> Self;
    #[allow(missing_docs)]
    fn atan(self) -> Self;
    #[allow(missing_docs)]
    fn exp(self) -> Self;
    /// Natural log
    fn ln(self) -> Self;

    /// Minimum of two values, returning the branch that was taken
    fn min_choice(self, rhs: Self) -> (Self, Choice);
    /// Maximum of two values, returning the branch that was taken
    fn max_choice(self, rhs: Self) -> (Self, Choice);
}

impl EvalMath for f32 {
    fn abs(self) -> Self {
        f32::abs(self)
    }
    fn recip(self) -> Self {
        1.0 / self
    }
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
    fn square(self) -> Self {
        self * self
    }
    fn sin(self) -> Self {
        f32::sin(self)
    }
    fn cos(self) -> Self {
        f32::cos(self)
    }
    fn tan(self) -> Self {
        f32::tan(self)
    }
    fn asin(self) -> Self {
        f32::asin(self)
    }
    fn acos(self) -> Self {
        f32::acos(self)
    }
    fn atan(self) -> Self {
        f32::atan(self)
    }
    fn exp(self) -> Self {
        f32::exp(self)
    }
    fn ln(self) -> Self {
        f32::ln(self)
    }
    fn min_choice(self, rhs: Self) -> (Self, Choice) {
        if self < rhs {
            (self, Choice::Left)
        } else {
            (rhs, Choice::Right)
        }
    }
    fn max_choice(self, rhs: Self) -> (Self, Choice) {
        if self >= rhs {
            (self, Choice::Left)
        } else {
            (rhs, Choice::Right)
        }
    }
}

impl EvalMath for Interval {
    fn abs(self) -> Self {
        Interval::abs(self)
    }
    fn recip(self) -> Self {
        Interval::recip(self)
    }
    fn sqrt(self) -> Self {
        Interval::sqrt(self)
    }
    fn square(self) -> Self {
        Interval::square(self)
    }
    fn sin(self) -> Self {
        Interval::sin(self)
    }
    fn cos(self) -> Self {
        Interval::cos(self)
    }
    fn tan(self) -> Self {
        Interval::tan(self)
    }
    fn asin(self) -> Self {
        Interval::asin(self)
    }
    fn acos(self) -> Self {
        Interval::acos(self)
    }
    fn atan(self) -> Self {
        Interval::atan(self)
    }
    fn exp(self) -> Self {
        Interval::exp(self)
    }
    fn ln(self) -> Self {
        Interval::ln(self)
    }
    fn min_choice(self, rhs: Self) -> (Self, Choice) {
        Interval::min_choice(self, rhs)
    }
    fn max_choice(self, rhs: Self) -> (Self, Choice) {
        Interval::max_choice(self, rhs)
    }
}

impl EvalMath for Dual {
    fn abs(self) -> Self {
        Dual::abs(self)
    }
    fn recip(self) -> Self {
        Dual::recip(self)
    }
    fn sqrt(self) -> Self {
        Dual::sqrt(self)
    }
    fn square(self) -> Self {
        Dual::square(self)
    }
    fn sin(self) -> Self {
        Dual::sin(self)
    }
    fn cos(self) -> Self {
        Dual::cos(self)
    }
    fn tan(self) -> Self {
        Dual::tan(self)
    }
    fn asin(self) -> Self {
        Dual::asin(self)
    }
    fn acos(self) -> Self {
        Dual::acos(self)
    }
    fn atan(self) -> Self {
        Dual::atan(self)
    }
    fn exp(self) -> Self {
        Dual::exp(self)
    }
    fn ln(self) -> Self {
        Dual::ln(self)
    }
    fn min_choice(self, rhs: Self) -> (Self, Choice) {
        let c = if self.v < rhs.v {
            Choice::Left
        } else {
            Choice::Right
        };
        (Dual::min(self, rhs), c)
    }
    fn max_choice(self, rhs: Self) -> (Self, Choice) {
        let c = if self.v >= rhs.v {
            Choice::Left
        } else {
            Choice::Right
        };
        (Dual::max(self, rhs), c)
    }
}
