//! Coarse tile classification with interval arithmetic
use super::{TileGrid, View};
use crate::{
    Error,
    tape::{
        Choice, Clause, SubtapeStore, SubtapeWorkspace, Tape, TapeRef,
        TapeView,
    },
    types::{Dual, Interval},
};
use nalgebra::Point3;
use rayon::prelude::*;

/// Result of classifying a single cell
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Outcome {
    Empty,
    Filled([f32; 3]),
    /// The lane's subtape buffer holds a subtape with the given choice count
    Ambiguous { choices: usize, pruned: bool },
}

/// Preallocated scratch space for one interval-evaluation lane
///
/// This is shared by the tile and subtile stages, which have the same
/// per-cell contract.
pub(crate) struct IntervalLane {
    regs: Vec<Interval>,
    duals: Vec<Dual>,
    choices: Vec<Choice>,
    workspace: SubtapeWorkspace,
    pub(crate) subtape: Vec<Clause>,
    outcome: Result<Outcome, Error>,
}

impl IntervalLane {
    pub(crate) fn new(max_tape_len: usize) -> Self {
        Self {
            regs: vec![Interval::from(0.0); max_tape_len],
            duals: vec![Dual::default(); max_tape_len],
            choices: vec![Choice::Both; max_tape_len],
            workspace: SubtapeWorkspace::new(max_tape_len),
            subtape: Vec::with_capacity(max_tape_len),
            outcome: Ok(Outcome::Empty),
        }
    }

    /// Classifies a cell, storing the result in the lane
    pub(crate) fn classify(
        &mut self,
        tape: TapeView,
        bounds: [Interval; 3],
        center: Point3<f32>,
    ) {
        self.outcome = self.classify_inner(tape, bounds, center);
    }

    fn classify_inner(
        &mut self,
        tape: TapeView,
        bounds: [Interval; 3],
        center: Point3<f32>,
    ) -> Result<Outcome, Error> {
        let n = tape.len();
        let choices = &mut self.choices[..tape.choice_count()];
        let i = tape.eval(bounds, &mut self.regs[..n], choices);

        // Non-finite bounds are never trusted for classification
        let out = if i.is_finite() && i.upper() <= 0.0 {
            let d = tape.eval(
                Dual::position(center.x, center.y, center.z),
                &mut self.duals[..n],
                choices,
            );
            Outcome::Filled(d.normal())
        } else if i.is_finite() && i.lower() > 0.0 {
            Outcome::Empty
        } else {
            let c = tape.simplify(
                choices,
                &mut self.workspace,
                &mut self.subtape,
            )?;
            Outcome::Ambiguous {
                choices: c,
                pruned: self.subtape.len() < n,
            }
        };
        Ok(out)
    }

    /// Takes the most recent outcome, leaving `Empty` in its place
    pub(crate) fn take_outcome(&mut self) -> Result<Outcome, Error> {
        std::mem::replace(&mut self.outcome, Ok(Outcome::Empty))
    }
}

/// Records a lane's outcome into a grid
///
/// Ambiguous cells whose subtape is shorter than `parent_tape` push it to the
/// store; otherwise, they reuse the parent's tape reference.
pub(crate) fn commit<const N: usize>(
    lane: &mut IntervalLane,
    grid: &mut TileGrid<N>,
    store: &mut SubtapeStore,
    index: usize,
    parent: Option<u32>,
    parent_tape: TapeRef,
) -> Result<(), Error> {
    match lane.take_outcome()? {
        Outcome::Empty => grid.set_empty(index, parent),
        Outcome::Filled(normal) => {
            grid.set_filled(index, parent, parent_tape, normal)
        }
        Outcome::Ambiguous { choices, pruned } => {
            let tape = if pruned {
                store.push(&lane.subtape, choices)?
            } else {
                parent_tape
            };
            grid.set_ambiguous(index, parent, tape);
        }
    }
    Ok(())
}

/// Interval bounds and center of a cell, in model space
pub(crate) fn cell_region<const N: usize>(
    grid: &TileGrid<N>,
    view: &View,
    index: usize,
) -> ([Interval; 3], Point3<f32>) {
    let (lo, hi) = grid.bounds(index);
    let size = grid.image_size();
    let bounds = view.cell_bounds(size, lo, hi);
    let center: [f32; N] =
        std::array::from_fn(|i| (lo[i] as f32 + hi[i] as f32) / 2.0);
    (bounds, view.screen_to_model(size, center))
}

/// First stage of the pipeline, classifying every coarse tile
pub struct TileEvaluator<const N: usize> {
    tiles: TileGrid<N>,
    lanes: Vec<IntervalLane>,
    work: Vec<u32>,
}

impl<const N: usize> TileEvaluator<N> {
    /// Builds a new evaluator, preallocating `lanes` lanes
    pub(crate) fn new(
        image_size: u32,
        tile_size: u32,
        lanes: usize,
        max_tape_len: usize,
    ) -> Self {
        let tiles = TileGrid::new(image_size, tile_size);
        let work = (0..tiles.len() as u32).collect();
        let lanes = (0..lanes.min(tiles.len()).max(1))
            .map(|_| IntervalLane::new(max_tape_len))
            .collect();
        Self { tiles, lanes, work }
    }

    /// Returns the tile grid from the most recent run
    pub fn tiles(&self) -> &TileGrid<N> {
        &self.tiles
    }

    /// Classifies every tile against the root tape
    ///
    /// Tiles are dispatched in batches of one tile per lane; the sequential
    /// commit after each batch is the only point where the grid and store are
    /// written.
    pub(crate) fn run(
        &mut self,
        tape: &Tape,
        store: &mut SubtapeStore,
        view: &View,
    ) -> Result<(), Error> {
        self.tiles.reset();
        let root = tape.view();
        for batch in self.work.chunks(self.lanes.len()) {
            let tiles = &self.tiles;
            self.lanes[..batch.len()]
                .par_iter_mut()
                .zip(batch.par_iter())
                .for_each(|(lane, &t)| {
                    let (bounds, center) =
                        cell_region(tiles, view, t as usize);
                    lane.classify(root, bounds, center);
                });
            for (lane, &t) in self.lanes.iter_mut().zip(batch) {
                commit(
                    lane,
                    &mut self.tiles,
                    store,
                    t as usize,
                    None,
                    TapeRef::Root,
                )?;
            }
        }
        log::debug!(
            "tiles: {} filled, {} ambiguous, {} empty; store at {} / {}",
            self.tiles.filled().len(),
            self.tiles.active().len(),
            self.tiles.len()
                - self.tiles.filled().len()
                - self.tiles.active().len(),
            store.len(),
            store.capacity(),
        );
        Ok(())
    }
}
