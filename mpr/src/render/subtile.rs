//! Refinement of ambiguous tiles into subtiles
use super::{
    TileGrid, View,
    tile::{IntervalLane, cell_region, commit},
};
use crate::{
    Error,
    tape::{SubtapeStore, Tape},
};
use rayon::prelude::*;

/// Second stage of the pipeline, classifying subtiles of ambiguous tiles
///
/// Each subtile starts from its parent tile's subtape, so clauses pruned at
/// the tile level are never evaluated again.
pub struct SubtileEvaluator<const N: usize> {
    subtiles: TileGrid<N>,
    lanes: Vec<IntervalLane>,
    /// `(subtile, parent tile)` pairs for the current frame
    work: Vec<(u32, u32)>,
}

impl<const N: usize> SubtileEvaluator<N> {
    /// Builds a new evaluator, preallocating `lanes` lanes
    pub(crate) fn new(
        image_size: u32,
        subtile_size: u32,
        lanes: usize,
        max_tape_len: usize,
    ) -> Self {
        let subtiles = TileGrid::new(image_size, subtile_size);
        let work = Vec::with_capacity(subtiles.len());
        let lanes = (0..lanes.min(subtiles.len()).max(1))
            .map(|_| IntervalLane::new(max_tape_len))
            .collect();
        Self {
            subtiles,
            lanes,
            work,
        }
    }

    /// Returns the subtile grid from the most recent run
    pub fn subtiles(&self) -> &TileGrid<N> {
        &self.subtiles
    }

    /// Returns the number of subtiles classified in the most recent run
    pub fn visited(&self) -> usize {
        self.work.len()
    }

    /// Classifies the subtiles within every ambiguous tile
    ///
    /// `tiles` is the output of the tile stage, which is only read here.
    pub(crate) fn run(
        &mut self,
        tape: &Tape,
        tiles: &TileGrid<N>,
        store: &mut SubtapeStore,
        view: &View,
    ) -> Result<(), Error> {
        self.subtiles.reset();
        self.work.clear();
        for &t in tiles.active() {
            let (lo, hi) = tiles.bounds(t as usize);
            self.work.extend(
                self.subtiles
                    .children_of(lo, hi)
                    .map(|s| (s as u32, t)),
            );
        }
        log::trace!("subtile stage has {} work items", self.work.len());

        for batch in self.work.chunks(self.lanes.len()) {
            let subtiles = &self.subtiles;
            let store_ref = &*store;
            self.lanes[..batch.len()]
                .par_iter_mut()
                .zip(batch.par_iter())
                .for_each(|(lane, &(s, t))| {
                    let parent = tiles.get(t as usize).tape;
                    let tape = store_ref.view(tape, parent);
                    let (bounds, center) =
                        cell_region(subtiles, view, s as usize);
                    lane.classify(tape, bounds, center);
                });
            for (lane, &(s, t)) in self.lanes.iter_mut().zip(batch) {
                let parent_tape = tiles.get(t as usize).tape;
                commit(
                    lane,
                    &mut self.subtiles,
                    store,
                    s as usize,
                    Some(t),
                    parent_tape,
                )?;
            }
        }
        log::debug!(
            "subtiles: {} filled, {} ambiguous, {} empty; store at {} / {}",
            self.subtiles.filled().len(),
            self.subtiles.active().len(),
            self.work.len()
                - self.subtiles.filled().len()
                - self.subtiles.active().len(),
            store.len(),
            store.capacity(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        render::{CellState, tile::TileEvaluator},
        tape::TapeRef,
        tree::Tree,
    };

    #[test]
    fn subtiles_use_parent_subtapes() {
        // Two circles, each tile only sees one of them
        let (x, y, _z) = Tree::axes();
        let circle = |cx: f64| {
            ((x.clone() - cx).square() + y.square()).sqrt() - 0.2
        };
        let t = circle(-0.5).min(circle(0.5));
        let tape = Tape::new(&t).unwrap();

        let view = View::default();
        let mut store = SubtapeStore::new(1 << 16);
        let mut tiles = TileEvaluator::<2>::new(128, 16, 4, tape.len());
        let mut subtiles = SubtileEvaluator::<2>::new(128, 4, 16, tape.len());
        tiles.run(&tape, &mut store, &view).unwrap();
        subtiles
            .run(&tape, tiles.tiles(), &mut store, &view)
            .unwrap();

        let tile_grid = tiles.tiles();
        let grid = subtiles.subtiles();
        assert!(!grid.active().is_empty());
        for &t in tile_grid.active() {
            // Every ambiguous tile resolved the min, so it has a subtape
            let cell = tile_grid.get(t as usize);
            let TapeRef::Stored { len, .. } = cell.tape else {
                panic!("tile {t} has no subtape");
            };
            assert!((len as usize) < tape.len());
        }
        for i in 0..grid.len() {
            let cell = grid.get(i);
            match cell.parent {
                Some(p) => {
                    let parent = tile_grid.get(p as usize);
                    assert_eq!(parent.state, CellState::Ambiguous);
                    assert_ne!(cell.state, CellState::Unprocessed);
                    if cell.state == CellState::Ambiguous {
                        let v = store.view(&tape, cell.tape);
                        let pv = store.view(&tape, parent.tape);
                        assert!(v.len() <= pv.len());
                    }
                }
                None => assert_eq!(cell.state, CellState::Unprocessed),
            }
        }
        // Every subtile under an ambiguous tile was visited
        let visited = (0..grid.len())
            .filter(|i| grid.get(*i).parent.is_some())
            .count();
        assert_eq!(visited, tile_grid.active().len() * 16);
    }
}
