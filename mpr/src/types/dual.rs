use crate::tree::Axis;

/// A value with associated partial derivatives, used for forward-mode
/// automatic differentiation.
///
/// Derivatives at non-differentiable points (`abs` at zero, `min` / `max`
/// where both sides are equal) are one-sided and implementation-chosen, so
/// normals along such creases are discontinuous.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Dual {
    /// Value of the field at this point
    pub v: f32,
    /// Partial derivative with respect to `x`
    pub dx: f32,
    /// Partial derivative with respect to `y`
    pub dy: f32,
    /// Partial derivative with respect to `z`
    pub dz: f32,
}

impl std::fmt::Display for Dual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.v, self.dx, self.dy, self.dz)
    }
}

impl Dual {
    /// Constructs a new dual value
    pub fn new(v: f32, dx: f32, dy: f32, dz: f32) -> Self {
        Self { v, dx, dy, dz }
    }

    /// Builds a constant, which has zero derivative along every axis
    pub fn constant(v: f32) -> Self {
        Self::new(v, 0.0, 0.0, 0.0)
    }

    /// Seeds the input variable for the given axis
    ///
    /// The result has unit derivative along its own axis and zero elsewhere.
    pub fn variable(axis: Axis, v: f32) -> Self {
        match axis {
            Axis::X => Self::new(v, 1.0, 0.0, 0.0),
            Axis::Y => Self::new(v, 0.0, 1.0, 0.0),
            Axis::Z => Self::new(v, 0.0, 0.0, 1.0),
        }
    }

    /// Returns the three seeded inputs for a position
    pub fn position(x: f32, y: f32, z: f32) -> [Self; 3] {
        [
            Self::variable(Axis::X, x),
            Self::variable(Axis::Y, y),
            Self::variable(Axis::Z, z),
        ]
    }

    /// Returns the gradient `[dx, dy, dz]`
    pub fn gradient(&self) -> [f32; 3] {
        [self.dx, self.dy, self.dz]
    }

    /// Returns the normalized gradient
    ///
    /// A zero-length or non-finite gradient produces a non-finite normal;
    /// this is not treated as an error.
    pub fn normal(&self) -> [f32; 3] {
        let s = (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt();
        [self.dx / s, self.dy / s, self.dz / s]
    }

    /// Absolute value
    pub fn abs(self) -> Self {
        if self.v < 0.0 { -self } else { self }
    }

    /// Square
    pub fn square(self) -> Self {
        let d = self.v * 2.0;
        Dual {
            v: self.v * self.v,
            dx: self.dx * d,
            dy: self.dy * d,
            dz: self.dz * d,
        }
    }

    /// Square root
    pub fn sqrt(self) -> Self {
        let v = self.v.sqrt();
        Dual {
            v,
            dx: self.dx / (2.0 * v),
            dy: self.dy / (2.0 * v),
            dz: self.dz / (2.0 * v),
        }
    }

    /// Sine
    pub fn sin(self) -> Self {
        let c = self.v.cos();
        Dual {
            v: self.v.sin(),
            dx: self.dx * c,
            dy: self.dy * c,
            dz: self.dz * c,
        }
    }
    /// Cosine
    pub fn cos(self) -> Self {
        let s = -self.v.sin();
        Dual {
            v: self.v.cos(),
            dx: self.dx * s,
            dy: self.dy * s,
            dz: self.dz * s,
        }
    }
    /// Tangent
    pub fn tan(self) -> Self {
        let c = self.v.cos().powi(2);
        Dual {
            v: self.v.tan(),
            dx: self.dx / c,
            dy: self.dy / c,
            dz: self.dz / c,
        }
    }
    /// Arcsin
    pub fn asin(self) -> Self {
        let r = (1.0 - self.v.powi(2)).sqrt();
        Dual {
            v: self.v.asin(),
            dx: self.dx / r,
            dy: self.dy / r,
            dz: self.dz / r,
        }
    }
    /// Arccos
    pub fn acos(self) -> Self {
        let r = -(1.0 - self.v.powi(2)).sqrt();
        Dual {
            v: self.v.acos(),
            dx: self.dx / r,
            dy: self.dy / r,
            dz: self.dz / r,
        }
    }
    /// Arctangent
    pub fn atan(self) -> Self {
        let r = self.v.powi(2) + 1.0;
        Dual {
            v: self.v.atan(),
            dx: self.dx / r,
            dy: self.dy / r,
            dz: self.dz / r,
        }
    }
    /// Exponential function
    pub fn exp(self) -> Self {
        let v = self.v.exp();
        Dual {
            v,
            dx: v * self.dx,
            dy: v * self.dy,
            dz: v * self.dz,
        }
    }
    /// Natural log
    pub fn ln(self) -> Self {
        Dual {
            v: self.v.ln(),
            dx: self.dx / self.v,
            dy: self.dy / self.v,
            dz: self.dz / self.v,
        }
    }

    /// Reciprocal
    pub fn recip(self) -> Self {
        let v2 = -self.v.powi(2);
        Dual {
            v: 1.0 / self.v,
            dx: self.dx / v2,
            dy: self.dy / v2,
            dz: self.dz / v2,
        }
    }

    /// Minimum of two values, picking whichever dual has the smaller value
    pub fn min(self, rhs: Self) -> Self {
        if self.v < rhs.v { self } else { rhs }
    }

    /// Maximum of two values, picking whichever dual has the larger value
    pub fn max(self, rhs: Self) -> Self {
        if self.v >= rhs.v { self } else { rhs }
    }

    /// Checks that the two values are roughly equal, panicking otherwise
    #[cfg(test)]
    pub(crate) fn compare_eq(&self, other: Self) {
        let d = (self.v - other.v)
            .abs()
            .max((self.dx - other.dx).abs())
            .max((self.dy - other.dy).abs())
            .max((self.dz - other.dz).abs());
        if d >= 1e-6 {
            panic!("lhs != rhs ({self:?} != {other:?})");
        }
    }
}

impl From<f32> for Dual {
    fn from(v: f32) -> Self {
        Dual::constant(v)
    }
}

impl std::ops::Add<Dual> for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Dual {
            v: self.v + rhs.v,
            dx: self.dx + rhs.dx,
            dy: self.dy + rhs.dy,
            dz: self.dz + rhs.dz,
        }
    }
}

impl std::ops::Mul<Dual> for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            v: self.v * rhs.v,
            dx: self.v * rhs.dx + rhs.v * self.dx,
            dy: self.v * rhs.dy + rhs.v * self.dy,
            dz: self.v * rhs.dz + rhs.v * self.dz,
        }
    }
}

impl std::ops::Div<Dual> for Dual {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let d = rhs.v.powi(2);
        Self {
            v: self.v / rhs.v,
            dx: (rhs.v * self.dx - self.v * rhs.dx) / d,
            dy: (rhs.v * self.dy - self.v * rhs.dy) / d,
            dz: (rhs.v * self.dz - self.v * rhs.dz) / d,
        }
    }
}

impl std::ops::Sub<Dual> for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            v: self.v - rhs.v,
            dx: self.dx - rhs.dx,
            dy: self.dy - rhs.dy,
            dz: self.dz - rhs.dz,
        }
    }
}

impl std::ops::Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            v: -self.v,
            dx: -self.dx,
            dy: -self.dy,
            dz: -self.dz,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn product_and_quotient_rules() {
        let [x, y, _z] = Dual::position(2.0, 3.0, 0.0);
        (x * y).compare_eq(Dual::new(6.0, 3.0, 2.0, 0.0));
        (x / y).compare_eq(Dual::new(2.0 / 3.0, 1.0 / 3.0, -2.0 / 9.0, 0.0));
        (x - y * Dual::constant(2.0))
            .compare_eq(Dual::new(-4.0, 1.0, -2.0, 0.0));
    }

    #[test]
    fn abs_min_max() {
        let [x, y, _z] = Dual::position(-1.0, 0.5, 0.0);
        x.abs().compare_eq(Dual::new(1.0, -1.0, 0.0, 0.0));
        y.abs().compare_eq(y);
        assert_eq!(x.min(y), x);
        assert_eq!(x.max(y), y);

        // Ties pick the right-hand side for min and the left-hand for max
        let a = Dual::new(1.0, 1.0, 0.0, 0.0);
        let b = Dual::new(1.0, 0.0, 1.0, 0.0);
        assert_eq!(a.min(b), b);
        assert_eq!(a.max(b), a);
    }

    #[test]
    fn normal() {
        let g = Dual::new(0.0, 3.0, 4.0, 0.0);
        assert_eq!(g.normal(), [0.6, 0.8, 0.0]);
        assert!(Dual::constant(1.0).normal().iter().all(|v| v.is_nan()));
    }
}
