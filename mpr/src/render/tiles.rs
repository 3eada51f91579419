//! Spatial index of cells at a single granularity
use crate::tape::TapeRef;

/// Classification of a single cell
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CellState {
    /// Not yet visited during the current frame
    #[default]
    Unprocessed,
    /// Entirely outside the shape
    Empty,
    /// Entirely inside the shape
    Filled,
    /// Possibly containing the surface
    Ambiguous,
}

/// Per-cell record
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Cell {
    /// Classification for the current frame
    pub state: CellState,
    /// Tape used to evaluate this cell's contents
    ///
    /// For an ambiguous cell, this is the subtape derived from its own
    /// choices; otherwise, it's the tape that the cell was evaluated with.
    pub tape: TapeRef,
    /// Surface normal, only meaningful for filled cells
    pub normal: [f32; 3],
    /// Index of the enclosing cell in the previous (coarser) stage
    pub parent: Option<u32>,
}

/// A dense grid of cells covering an `N`-dimensional image
///
/// Cells are indexed with `x` varying fastest, then `y`, then `z`.  When the
/// image size is not a multiple of the cell size, cells on the far edges are
/// clamped to the image.
#[derive(Clone, Debug)]
pub struct TileGrid<const N: usize> {
    image_size: u32,
    cell_size: u32,
    per_side: u32,
    cells: Vec<Cell>,
    active: Vec<u32>,
    filled: Vec<u32>,
}

impl<const N: usize> TileGrid<N> {
    /// Builds a new grid, allocating one slot per cell
    pub fn new(image_size: u32, cell_size: u32) -> Self {
        let per_side = image_size.div_ceil(cell_size);
        let len = (per_side as usize).pow(N as u32);
        Self {
            image_size,
            cell_size,
            per_side,
            cells: vec![Cell::default(); len],
            active: Vec::with_capacity(len),
            filled: Vec::with_capacity(len),
        }
    }

    /// Returns the total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Checks whether the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell size, in pixels
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Returns the number of cells along each axis
    pub fn per_side(&self) -> u32 {
        self.per_side
    }

    /// Returns the image size, in pixels
    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    /// Returns the lower corner of a cell, in pixel coordinates
    pub fn corner(&self, index: usize) -> [u32; N] {
        let mut i = index as u32;
        std::array::from_fn(|_| {
            let v = (i % self.per_side) * self.cell_size;
            i /= self.per_side;
            v
        })
    }

    /// Returns the index of the cell containing a pixel position
    pub fn index_of(&self, pos: [u32; N]) -> usize {
        pos.iter()
            .rev()
            .fold(0, |acc, p| acc * self.per_side + p / self.cell_size)
            as usize
    }

    /// Returns the pixel bounds `[lo, hi)` of a cell, clamped to the image
    pub fn bounds(&self, index: usize) -> ([u32; N], [u32; N]) {
        let lo = self.corner(index);
        let hi = lo.map(|v| (v + self.cell_size).min(self.image_size));
        (lo, hi)
    }

    /// Resets every cell to [`CellState::Unprocessed`]
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.active.clear();
        self.filled.clear();
    }

    /// Borrows a cell
    pub fn get(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    /// Marks a cell as empty
    pub fn set_empty(&mut self, index: usize, parent: Option<u32>) {
        self.cells[index] = Cell {
            state: CellState::Empty,
            parent,
            ..Cell::default()
        };
    }

    /// Marks a cell as filled, adding it to the filled list
    pub fn set_filled(
        &mut self,
        index: usize,
        parent: Option<u32>,
        tape: TapeRef,
        normal: [f32; 3],
    ) {
        self.cells[index] = Cell {
            state: CellState::Filled,
            tape,
            normal,
            parent,
        };
        self.filled.push(index as u32);
    }

    /// Marks a cell as ambiguous, adding it to the active list
    pub fn set_ambiguous(
        &mut self,
        index: usize,
        parent: Option<u32>,
        tape: TapeRef,
    ) {
        self.cells[index] = Cell {
            state: CellState::Ambiguous,
            tape,
            normal: [0.0; 3],
            parent,
        };
        self.active.push(index as u32);
    }

    /// Returns ambiguous cells, in the order they were classified
    pub fn active(&self) -> &[u32] {
        &self.active
    }

    /// Returns filled cells, in the order they were classified
    pub fn filled(&self) -> &[u32] {
        &self.filled
    }

    /// Returns the indices of cells in this grid within a pixel-space box
    ///
    /// This is used to find the children of a coarser cell, given its
    /// [`bounds`](Self::bounds).
    pub fn children_of(
        &self,
        lo: [u32; N],
        hi: [u32; N],
    ) -> impl Iterator<Item = usize> + '_ {
        let start = lo.map(|v| v / self.cell_size);
        let extent: [u32; N] = std::array::from_fn(|i| {
            hi[i].div_ceil(self.cell_size).saturating_sub(start[i])
        });
        let count = extent.iter().product::<u32>() as usize;
        (0..count).map(move |mut k| {
            let mut index = 0;
            let mut stride = 1;
            for i in 0..N {
                let e = extent[i] as usize;
                index += (start[i] as usize + k % e) * stride;
                k /= e;
                stride *= self.per_side as usize;
            }
            index
        })
    }
}
