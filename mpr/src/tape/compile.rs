use super::{Clause, Tape};
use crate::{
    Error,
    tree::{Tree, TreeOp},
};
use std::collections::HashMap;

/// Deduplication key for a clause
///
/// Constants are compared by bit pattern, so `0.0` and `-0.0` stay distinct.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
enum Key {
    Input(u8),
    Const(u32),
    Unary(u8, u32),
    Binary(u8, u32, u32),
}

impl From<Clause> for Key {
    fn from(c: Clause) -> Self {
        match c {
            Clause::Input(axis) => Key::Input(axis as u8),
            Clause::Const(f) => Key::Const(f.to_bits()),
            Clause::Unary(op, a) => Key::Unary(op as u8, a),
            Clause::Binary(op, a, b) => Key::Binary(op as u8, a, b),
        }
    }
}

impl Tape {
    /// Compiles a [`Tree`] into a tape
    ///
    /// Shared subtrees (clones of the same `Tree`) and structurally identical
    /// clauses are emitted once.  The traversal is iterative, so deep trees
    /// do not overflow the stack.
    pub fn new(tree: &Tree) -> Result<Self, Error> {
        let mut seen: HashMap<*const TreeOp, u32> = HashMap::new();
        let mut interned: HashMap<Key, u32> = HashMap::new();
        let mut clauses = vec![];

        let mut todo = vec![(tree, false)];
        while let Some((t, ready)) = todo.pop() {
            if seen.contains_key(&t.as_ptr()) {
                continue;
            }
            if !ready {
                todo.push((t, true));
                match &**t {
                    TreeOp::Input(..) | TreeOp::Const(..) => (),
                    TreeOp::Unary(_, a) => todo.push((a, false)),
                    TreeOp::Binary(_, a, b) => {
                        todo.push((b, false));
                        todo.push((a, false));
                    }
                }
                continue;
            }
            // Children are always handled before their parent
            let reg = |t: &Tree| seen[&t.as_ptr()];
            let clause = match &**t {
                TreeOp::Input(axis) => Clause::Input(*axis),
                TreeOp::Const(c) => Clause::Const(*c as f32),
                TreeOp::Unary(op, a) => Clause::Unary(*op, reg(a)),
                TreeOp::Binary(op, a, b) => Clause::Binary(*op, reg(a), reg(b)),
            };
            let index = *interned.entry(clause.into()).or_insert_with(|| {
                clauses.push(clause);
                (clauses.len() - 1) as u32
            });
            seen.insert(t.as_ptr(), index);
        }

        let output = seen[&tree.as_ptr()] as usize;
        log::trace!(
            "compiled {} tree nodes into {} clauses",
            seen.len(),
            clauses.len()
        );
        Tape::from_clauses(clauses, output)
    }
}
