//! Per-pixel evaluation of ambiguous subtiles
use super::{Image, Pixel, TileGrid, View};
use crate::{
    Error,
    tape::{Choice, SubtapeStore, Tape, TapeView},
    types::Dual,
};
use rayon::prelude::*;

/// Builds an `N`-dimensional position from its first `N` coordinates
#[inline]
fn pos<const N: usize>(x: u32, y: u32, z: u32) -> [u32; N] {
    let p = [x, y, z];
    std::array::from_fn(|i| p[i])
}

/// Preallocated scratch space for one pixel lane
struct PixelLane {
    regs: Vec<f32>,
    duals: Vec<Dual>,
    choices: Vec<Choice>,
    /// `(offset, pixel)` writes, applied to the image after the barrier
    out: Vec<(usize, Pixel)>,
}

impl PixelLane {
    fn new(max_tape_len: usize, subtile_size: u32) -> Self {
        Self {
            regs: vec![0.0; max_tape_len],
            duals: vec![Dual::default(); max_tape_len],
            choices: vec![Choice::Both; max_tape_len],
            out: Vec::with_capacity((subtile_size as usize).pow(2)),
        }
    }

    /// Renders one ambiguous subtile
    ///
    /// In 2D, every pixel center is evaluated.  In 3D, each voxel column is
    /// walked from the top down, stopping at the first filled voxel or once
    /// the image is already at least as deep.
    fn render<const N: usize>(
        &mut self,
        tape: TapeView,
        grid: &TileGrid<N>,
        index: usize,
        view: &View,
        image: &Image,
    ) {
        self.out.clear();
        let (lo, hi) = grid.bounds(index);
        let size = grid.image_size();
        let n = tape.len();
        let choices = &mut self.choices[..tape.choice_count()];
        let (z_lo, z_hi) = if N == 3 {
            (lo[N - 1], hi[N - 1])
        } else {
            (0, 1)
        };

        for y in lo[1]..hi[1] {
            for x in lo[0]..hi[0] {
                let offset = image.offset(x, y);
                let current = image.pixels()[offset].depth;
                for z in (z_lo..z_hi).rev() {
                    let depth = z + 1;
                    if depth <= current {
                        break;
                    }
                    let p = view.pixel_center(size, pos::<N>(x, y, z));
                    let v = tape.eval(
                        [p.x, p.y, p.z],
                        &mut self.regs[..n],
                        choices,
                    );
                    if v <= 0.0 {
                        let d = tape.eval(
                            Dual::position(p.x, p.y, p.z),
                            &mut self.duals[..n],
                            choices,
                        );
                        let normal = d.normal();
                        self.out.push((offset, Pixel { depth, normal }));
                        break;
                    }
                }
            }
        }
    }
}

/// Final stage of the pipeline, writing pixels into the image
pub struct PixelEvaluator<const N: usize> {
    lanes: Vec<PixelLane>,
    /// Number of pixels written by the most recent run
    written: usize,
}

impl<const N: usize> PixelEvaluator<N> {
    /// Builds a new evaluator, preallocating `lanes` lanes
    pub(crate) fn new(
        subtile_size: u32,
        lanes: usize,
        max_tape_len: usize,
    ) -> Self {
        let lanes = (0..lanes.max(1))
            .map(|_| PixelLane::new(max_tape_len, subtile_size))
            .collect();
        Self { lanes, written: 0 }
    }

    /// Returns the number of pixels written by per-pixel evaluation in the
    /// most recent run
    pub fn written(&self) -> usize {
        self.written
    }

    /// Rasterizes every filled cell of a grid into the image
    ///
    /// Each covered pixel takes the cell's normal; in 3D, its depth is the top
    /// of the cell and it is only written if above the current depth.
    pub(crate) fn draw_filled(&self, grid: &TileGrid<N>, image: &mut Image) {
        for &i in grid.filled() {
            let (lo, hi) = grid.bounds(i as usize);
            let cell = grid.get(i as usize);
            let depth = if N == 3 { hi[N - 1] } else { 1 };
            let p = Pixel {
                depth,
                normal: cell.normal,
            };
            for y in lo[1]..hi[1] {
                for x in lo[0]..hi[0] {
                    image.blend(image.offset(x, y), p);
                }
            }
        }
    }

    /// Evaluates every pixel within the ambiguous subtiles
    pub(crate) fn run(
        &mut self,
        tape: &Tape,
        subtiles: &TileGrid<N>,
        store: &SubtapeStore,
        view: &View,
        image: &mut Image,
    ) -> Result<(), Error> {
        self.written = 0;
        for batch in subtiles.active().chunks(self.lanes.len()) {
            let img = &*image;
            self.lanes[..batch.len()]
                .par_iter_mut()
                .zip(batch.par_iter())
                .for_each(|(lane, &s)| {
                    let s = s as usize;
                    let t = store.view(tape, subtiles.get(s).tape);
                    lane.render(t, subtiles, s, view, img);
                });
            for lane in &self.lanes[..batch.len()] {
                for &(offset, p) in &lane.out {
                    image.blend(offset, p);
                }
                self.written += lane.out.len();
            }
        }
        log::debug!(
            "pixels: {} written from {} subtiles",
            self.written,
            subtiles.active().len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{tape::TapeRef, tree::Tree};

    #[test]
    fn draw_filled_3d_keeps_top() {
        let mut grid = TileGrid::<3>::new(16, 8);
        let eval = PixelEvaluator::<3>::new(8, 1, 1);
        let mut image = Image::new(16);

        // Lower cell, then upper cell in the same column
        grid.set_filled(0, None, TapeRef::Root, [1.0, 0.0, 0.0]);
        grid.set_filled(4, None, TapeRef::Root, [0.0, 0.0, 1.0]);
        eval.draw_filled(&grid, &mut image);
        assert_eq!(image[(0, 0)].depth, 16);
        assert_eq!(image[(7, 7)].normal, [0.0, 0.0, 1.0]);
        assert!(!image[(8, 0)].filled());
    }

    #[test]
    fn render_columns() {
        // Half-space below z = 0 (world coordinates, default view)
        let tape = Tape::new(&Tree::z()).unwrap();
        let grid = TileGrid::<3>::new(16, 8);
        let image = Image::new(16);
        let mut lane = PixelLane::new(tape.len(), 8);
        let view = View::default();

        // Cell 4 is the upper half in z, which is entirely empty
        lane.render(tape.view(), &grid, 4, &view, &image);
        assert!(lane.out.is_empty());

        // Cell 0 spans z in [-1, 0), so the top voxel of each column is hit
        lane.render(tape.view(), &grid, 0, &view, &image);
        assert_eq!(lane.out.len(), 64);
        for (_, p) in &lane.out {
            assert_eq!(p.depth, 8);
            assert_eq!(p.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn render_occluded() {
        let tape = Tape::new(&Tree::z()).unwrap();
        let grid = TileGrid::<3>::new(16, 8);
        let mut image = Image::new(16);
        for x in 0..16 {
            for y in 0..16 {
                let p = Pixel {
                    depth: 12,
                    normal: [0.0; 3],
                };
                image.blend(image.offset(x, y), p);
            }
        }
        let mut lane = PixelLane::new(tape.len(), 8);
        lane.render(tape.view(), &grid, 0, &View::default(), &image);
        assert!(lane.out.is_empty());
    }

    #[test]
    fn render_2d() {
        let (x, y, _z) = Tree::axes();
        let tape = Tape::new(&(x + y)).unwrap();
        let grid = TileGrid::<2>::new(8, 8);
        let image = Image::new(8);
        let mut lane = PixelLane::new(tape.len(), 8);
        lane.render(tape.view(), &grid, 0, &View::default(), &image);
        // Pixel centers on the diagonal land exactly on the surface
        let s = 1.0 / 2f32.sqrt();
        assert_eq!(lane.out.len(), 36);
        for (offset, p) in &lane.out {
            let (px, py) = (offset % 8, offset / 8);
            assert!(px <= py, "bad pixel at {px}, {py}");
            assert_eq!(p.depth, 1);
            approx::assert_relative_eq!(p.normal[0], s, epsilon = 1e-6);
            approx::assert_relative_eq!(p.normal[1], s, epsilon = 1e-6);
        }
    }
}
