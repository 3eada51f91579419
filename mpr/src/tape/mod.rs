//! Linear instruction sequences ("tapes") and their evaluation
//!
//! A [`Tape`] is a list of [`Clause`]s in single static assignment form: the
//! result of clause `i` is stored in register `i`, and every operand refers to
//! an earlier clause.  A tape can therefore be evaluated in one forward pass,
//! with any numeric type implementing [`EvalMath`].
//!
//! Evaluating with [`Interval`] values records one [`Choice`] per `min` /
//! `max` clause; those choices drive [`TapeView::simplify`], which derives a
//! shorter subtape that is valid for the region where the choices were made.
//!
//! ```
//! use mpr::{tape::Tape, tree::Tree, types::Interval};
//!
//! let (x, y, _z) = Tree::axes();
//! let tape = Tape::new(&x.min(y))?;
//! assert_eq!(tape.len(), 3);
//!
//! let (v, choices) = tape.eval_interval(
//!     Interval::new(2.0, 3.0),
//!     Interval::new(-1.0, 0.0),
//!     Interval::from(0.0),
//! );
//! assert_eq!(v, Interval::new(-1.0, 0.0));
//!
//! let sub = tape.simplify(&choices)?;
//! assert_eq!(sub.len(), 1);
//! # Ok::<(), mpr::Error>(())
//! ```
mod choice;
mod compile;
mod store;
mod subtape;

pub use choice::Choice;
pub use store::{SubtapeStore, TapeRef};
pub use subtape::SubtapeWorkspace;

use crate::{
    Error,
    tree::{Axis, BinaryOpcode, UnaryOpcode},
    types::{Dual, EvalMath, Interval},
};

/// A single instruction in a [`Tape`]
///
/// Operands are register indices, i.e. indices of earlier clauses in the same
/// tape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Clause {
    /// Reads one of the `x`, `y`, `z` inputs
    Input(Axis),
    /// Loads a constant
    Const(f32),
    /// Applies a unary operation to an earlier result
    Unary(UnaryOpcode, u32),
    /// Applies a binary operation to two earlier results
    Binary(BinaryOpcode, u32, u32),
}

static_assertions::const_assert!(std::mem::size_of::<Clause>() <= 12);

impl Clause {
    /// Checks whether this clause records a [`Choice`] during evaluation
    #[inline]
    pub fn has_choice(&self) -> bool {
        matches!(self, Clause::Binary(op, ..) if op.has_choice())
    }

    /// Returns this clause with each operand passed through `f`
    #[inline]
    pub(crate) fn remap<F: Fn(u32) -> u32>(&self, f: F) -> Self {
        match *self {
            Clause::Input(..) | Clause::Const(..) => *self,
            Clause::Unary(op, a) => Clause::Unary(op, f(a)),
            Clause::Binary(op, a, b) => Clause::Binary(op, f(a), f(b)),
        }
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Clause::Input(axis) => write!(f, "{axis}"),
            Clause::Const(c) => write!(f, "{c}"),
            Clause::Unary(op, a) => {
                let op: &'static str = op.into();
                write!(f, "{op} ${a}")
            }
            Clause::Binary(op, a, b) => {
                let op: &'static str = op.into();
                write!(f, "{op} ${a} ${b}")
            }
        }
    }
}

/// A compiled, immutable instruction sequence
///
/// The output is always the last clause.
#[derive(Clone, Debug)]
pub struct Tape {
    clauses: Vec<Clause>,
    choice_count: usize,
}

impl Tape {
    /// Builds a tape from raw clauses
    ///
    /// Clauses after `output` are unreachable and are discarded.  Returns an
    /// error if the clause list is empty, if `output` is out of range, or if
    /// any operand does not refer to an earlier clause.
    pub fn from_clauses(
        mut clauses: Vec<Clause>,
        output: usize,
    ) -> Result<Self, Error> {
        if clauses.is_empty() {
            return Err(Error::EmptyTape);
        } else if output >= clauses.len() {
            return Err(Error::BadOutput(output, clauses.len()));
        }
        for (i, c) in clauses.iter().enumerate() {
            let bad = match *c {
                Clause::Input(..) | Clause::Const(..) => None,
                Clause::Unary(_, a) => Some(a).filter(|a| *a as usize >= i),
                Clause::Binary(_, a, b) => [a, b]
                    .into_iter()
                    .find(|v| *v as usize >= i),
            };
            if let Some(a) = bad {
                return Err(Error::BadOperand(i, a));
            }
        }
        clauses.truncate(output + 1);
        let choice_count = clauses.iter().filter(|c| c.has_choice()).count();
        Ok(Self {
            clauses,
            choice_count,
        })
    }

    /// Returns the number of clauses in the tape
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Checks whether the tape is empty
    ///
    /// A successfully constructed tape always has at least one clause.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the number of `min` / `max` clauses
    pub fn choice_count(&self) -> usize {
        self.choice_count
    }

    /// Returns the index of the output clause
    pub fn output(&self) -> usize {
        self.clauses.len() - 1
    }

    /// Returns the raw clauses
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Borrows the tape as a [`TapeView`]
    pub fn view(&self) -> TapeView<'_> {
        TapeView {
            clauses: &self.clauses,
            choice_count: self.choice_count,
        }
    }

    /// Evaluates the tape at a single point
    ///
    /// This allocates scratch space on every call; the renderer instead uses
    /// [`TapeView::eval`] with preallocated registers.
    pub fn eval_f32(&self, x: f32, y: f32, z: f32) -> f32 {
        self.eval_with([x, y, z]).0
    }

    /// Evaluates the tape over an interval box, returning the choices made
    pub fn eval_interval(
        &self,
        x: Interval,
        y: Interval,
        z: Interval,
    ) -> (Interval, Vec<Choice>) {
        self.eval_with([x, y, z])
    }

    /// Evaluates the tape and its partial derivatives at a single point
    pub fn eval_dual(&self, x: f32, y: f32, z: f32) -> Dual {
        self.eval_with(Dual::position(x, y, z)).0
    }

    fn eval_with<T: EvalMath>(&self, xyz: [T; 3]) -> (T, Vec<Choice>) {
        let mut regs = vec![T::from(0.0); self.len()];
        let mut choices = vec![Choice::Both; self.choice_count];
        let out = self.view().eval(xyz, &mut regs, &mut choices);
        (out, choices)
    }

    /// Derives an owned subtape from a set of choices
    ///
    /// This is a convenience wrapper around [`TapeView::simplify`], which
    /// allocates a fresh workspace.
    pub fn simplify(&self, choices: &[Choice]) -> Result<Tape, Error> {
        let mut ws = SubtapeWorkspace::default();
        let mut out = Vec::with_capacity(self.len());
        let choice_count = self.view().simplify(choices, &mut ws, &mut out)?;
        Ok(Tape {
            clauses: out,
            choice_count,
        })
    }
}

impl std::fmt::Display for Tape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, c) in self.clauses.iter().enumerate() {
            writeln!(f, "${i} = {c}")?;
        }
        Ok(())
    }
}

/// A borrowed tape (either a root [`Tape`] or a span of a [`SubtapeStore`])
///
/// The output is always the last clause.
#[derive(Copy, Clone, Debug)]
pub struct TapeView<'a> {
    clauses: &'a [Clause],
    choice_count: usize,
}

impl<'a> TapeView<'a> {
    pub(crate) fn new(clauses: &'a [Clause], choice_count: usize) -> Self {
        debug_assert!(!clauses.is_empty());
        debug_assert_eq!(
            clauses.iter().filter(|c| c.has_choice()).count(),
            choice_count
        );
        Self {
            clauses,
            choice_count,
        }
    }

    /// Returns the number of clauses
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Checks whether the view is empty (which is never true for a valid view)
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the number of `min` / `max` clauses
    pub fn choice_count(&self) -> usize {
        self.choice_count
    }

    /// Returns the raw clauses
    pub fn clauses(&self) -> &'a [Clause] {
        self.clauses
    }

    /// Evaluates the tape with caller-provided scratch space
    ///
    /// `regs` must have at least [`len`](Self::len) slots and `choices` at
    /// least [`choice_count`](Self::choice_count) slots; one choice is written
    /// per `min` / `max` clause, in tape order.
    ///
    /// # Panics
    /// If either scratch slice is too short
    pub fn eval<T: EvalMath>(
        &self,
        xyz: [T; 3],
        regs: &mut [T],
        choices: &mut [Choice],
    ) -> T {
        let mut c = 0;
        for (i, clause) in self.clauses.iter().enumerate() {
            let v = match *clause {
                Clause::Input(axis) => xyz[axis.index()],
                Clause::Const(f) => T::from(f),
                Clause::Unary(op, a) => {
                    let a = regs[a as usize];
                    match op {
                        UnaryOpcode::Neg => -a,
                        UnaryOpcode::Abs => a.abs(),
                        UnaryOpcode::Recip => a.recip(),
                        UnaryOpcode::Sqrt => a.sqrt(),
                        UnaryOpcode::Square => a.square(),
                        UnaryOpcode::Sin => a.sin(),
                        UnaryOpcode::Cos => a.cos(),
                        UnaryOpcode::Tan => a.tan(),
                        UnaryOpcode::Asin => a.asin(),
                        UnaryOpcode::Acos => a.acos(),
                        UnaryOpcode::Atan => a.atan(),
                        UnaryOpcode::Exp => a.exp(),
                        UnaryOpcode::Ln => a.ln(),
                    }
                }
                Clause::Binary(op, a, b) => {
                    let (a, b) = (regs[a as usize], regs[b as usize]);
                    match op {
                        BinaryOpcode::Add => a + b,
                        BinaryOpcode::Sub => a - b,
                        BinaryOpcode::Mul => a * b,
                        BinaryOpcode::Div => a / b,
                        BinaryOpcode::Min | BinaryOpcode::Max => {
                            let (v, choice) = if op == BinaryOpcode::Min {
                                a.min_choice(b)
                            } else {
                                a.max_choice(b)
                            };
                            choices[c] = choice;
                            c += 1;
                            v
                        }
                    }
                }
            };
            regs[i] = v;
        }
        regs[self.clauses.len() - 1]
    }
}
