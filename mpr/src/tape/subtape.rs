use super::{Choice, Clause, TapeView};
use crate::Error;

/// Reusable scratch space for [`TapeView::simplify`]
///
/// Buffers grow to the length of the longest tape simplified and are then
/// reused, so a workspace sized at build time never allocates again.
#[derive(Default, Debug)]
pub struct SubtapeWorkspace {
    /// Whether each clause is reachable from the output
    alive: Vec<bool>,
    /// Resolved `min` / `max` clauses forward to one of their operands
    alias: Vec<Option<u32>>,
    /// Index of each clause in the subtape
    remap: Vec<u32>,
}

impl SubtapeWorkspace {
    /// Builds a workspace with room for tapes of up to `size` clauses
    pub fn new(size: usize) -> Self {
        Self {
            alive: Vec::with_capacity(size),
            alias: Vec::with_capacity(size),
            remap: Vec::with_capacity(size),
        }
    }

    fn reset(&mut self, size: usize) {
        self.alive.clear();
        self.alive.resize(size, false);
        self.alias.clear();
        self.alias.resize(size, None);
        self.remap.clear();
        self.remap.resize(size, 0);
    }
}

impl TapeView<'_> {
    /// Derives a subtape from the choices recorded by an interval evaluation
    ///
    /// The new clauses are written to `out` (which is cleared first), with the
    /// output as the last clause.  Returns the number of `min` / `max` clauses
    /// remaining in the subtape.
    ///
    /// This is a two-pass algorithm:
    /// - Walking backwards from the output, mark clauses as alive.  A `min` /
    ///   `max` clause with a resolved choice becomes an alias of the chosen
    ///   operand, so only that operand is kept alive.
    /// - Walking forwards, emit every live (non-aliased) clause with its
    ///   operands remapped into the subtape.
    pub fn simplify(
        &self,
        choices: &[Choice],
        ws: &mut SubtapeWorkspace,
        out: &mut Vec<Clause>,
    ) -> Result<usize, Error> {
        if choices.len() != self.choice_count {
            return Err(Error::BadChoiceSlice(choices.len(), self.choice_count));
        }
        let n = self.clauses.len();
        ws.reset(n);
        ws.alive[n - 1] = true;

        let mut c = choices.len();
        for (i, clause) in self.clauses.iter().enumerate().rev() {
            let choice = if clause.has_choice() {
                c -= 1;
                choices[c]
            } else {
                Choice::Both
            };
            if !ws.alive[i] {
                continue;
            }
            match *clause {
                Clause::Input(..) | Clause::Const(..) => (),
                Clause::Unary(_, a) => ws.alive[a as usize] = true,
                Clause::Binary(_, a, b) => match choice {
                    Choice::Left => {
                        ws.alias[i] = Some(a);
                        ws.alive[a as usize] = true;
                    }
                    Choice::Right => {
                        ws.alias[i] = Some(b);
                        ws.alive[b as usize] = true;
                    }
                    Choice::Both => {
                        ws.alive[a as usize] = true;
                        ws.alive[b as usize] = true;
                    }
                },
            }
        }

        out.clear();
        let mut choice_count = 0;
        for (i, clause) in self.clauses.iter().enumerate() {
            if !ws.alive[i] {
                continue;
            }
            if let Some(a) = ws.alias[i] {
                ws.remap[i] = ws.remap[a as usize];
            } else {
                let remap = &ws.remap;
                out.push(clause.remap(|a| remap[a as usize]));
                ws.remap[i] = (out.len() - 1) as u32;
                if clause.has_choice() {
                    choice_count += 1;
                }
            }
        }
        debug_assert_eq!(ws.remap[n - 1] as usize, out.len() - 1);
        Ok(choice_count)
    }
}
