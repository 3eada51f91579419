//! Render configuration and compile-time defaults
use crate::Error;

/// Default number of tiles evaluated per parallel dispatch
pub const TILE_LANES: usize = 128;

/// Default number of subtiles evaluated per parallel dispatch
pub const SUBTILE_LANES: usize = 1024;

/// Default number of subtiles rendered per-pixel in each parallel dispatch
pub const PIXEL_LANES: usize = 256;

/// Default per-lane register budget, i.e. the longest tape that can be
/// rendered
pub const MAX_TAPE_LEN: usize = 4096;

/// Default size of the per-frame subtape store, in clauses
pub const SUBTAPE_CAPACITY: usize = 1 << 20;

/// Number of threads to use during evaluation
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ThreadCount {
    /// Perform all evaluation in a single worker
    One,

    /// Spawn some number of worker threads for evaluation
    Many(std::num::NonZeroUsize),
}

impl From<std::num::NonZeroUsize> for ThreadCount {
    fn from(v: std::num::NonZeroUsize) -> Self {
        match v.get() {
            1 => ThreadCount::One,
            _ => ThreadCount::Many(v),
        }
    }
}

/// Single-threaded mode is shown as `-`; otherwise, an integer
impl std::fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadCount::One => write!(f, "-"),
            ThreadCount::Many(n) => write!(f, "{n}"),
        }
    }
}

impl ThreadCount {
    /// Gets the thread count
    pub fn get(&self) -> usize {
        match self {
            ThreadCount::One => 1,
            ThreadCount::Many(v) => v.get(),
        }
    }
}

impl Default for ThreadCount {
    fn default() -> Self {
        std::thread::available_parallelism()
            .map(ThreadCount::from)
            .unwrap_or(ThreadCount::One)
    }
}

/// Tile sizes used during rendering, in pixels (or voxels)
///
/// The coarse `tile` size must be strictly larger than, and evenly divisible
/// by, the `subtile` size.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TileSizes {
    tile: u32,
    subtile: u32,
}

impl Default for TileSizes {
    fn default() -> Self {
        Self {
            tile: 64,
            subtile: 8,
        }
    }
}

impl TileSizes {
    /// Builds a new tile size pair, checking invariants
    pub fn new(tile: u32, subtile: u32) -> Result<Self, Error> {
        if subtile == 0 {
            return Err(Error::BadTileSize(tile, subtile));
        } else if tile <= subtile {
            return Err(Error::BadTileOrder(tile, subtile));
        } else if tile % subtile != 0 {
            return Err(Error::BadTileSize(tile, subtile));
        }
        Ok(Self { tile, subtile })
    }

    /// Returns the coarse tile size
    pub fn tile(&self) -> u32 {
        self.tile
    }

    /// Returns the subtile size
    pub fn subtile(&self) -> u32 {
        self.subtile
    }
}

/// Settings for building a [`Renderable`](crate::render::Renderable)
///
/// `N` is the render dimension, which must be 2 or 3.  In 3D, the image is a
/// cube of `image_size` voxels per side, projected into a square heightmap.
#[derive(Clone, Debug)]
pub struct RenderConfig<const N: usize> {
    /// Image size (in pixels per side)
    pub image_size: u32,

    /// Tile sizes to use during evaluation
    pub tile_sizes: TileSizes,

    /// Number of worker threads
    pub threads: ThreadCount,

    /// Number of tiles evaluated per parallel dispatch
    pub tile_lanes: usize,

    /// Number of subtiles evaluated per parallel dispatch
    pub subtile_lanes: usize,

    /// Number of subtiles rendered per-pixel in each parallel dispatch
    pub pixel_lanes: usize,

    /// Register budget for each lane; longer tapes are rejected at build time
    pub max_tape_len: usize,

    /// Total capacity of the per-frame subtape store, in clauses
    pub subtape_capacity: usize,
}

impl<const N: usize> Default for RenderConfig<N> {
    fn default() -> Self {
        Self {
            image_size: 256,
            tile_sizes: TileSizes::default(),
            threads: ThreadCount::default(),
            tile_lanes: TILE_LANES,
            subtile_lanes: SUBTILE_LANES,
            pixel_lanes: PIXEL_LANES,
            max_tape_len: MAX_TAPE_LEN,
            subtape_capacity: SUBTAPE_CAPACITY,
        }
    }
}

impl<const N: usize> RenderConfig<N> {
    /// Checks that this configuration can be used for rendering
    pub fn validate(&self) -> Result<(), Error> {
        if N != 2 && N != 3 {
            return Err(Error::BadDimension(N));
        }
        if self.image_size == 0 {
            return Err(Error::BadImageSize);
        }
        for (lanes, name) in [
            (self.tile_lanes, "tile"),
            (self.subtile_lanes, "subtile"),
            (self.pixel_lanes, "pixel"),
        ] {
            if lanes == 0 {
                return Err(Error::NoLanes(name));
            }
        }
        TileSizes::new(self.tile_sizes.tile, self.tile_sizes.subtile)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tile_sizes() {
        assert!(TileSizes::new(64, 8).is_ok());
        assert!(matches!(
            TileSizes::new(8, 8),
            Err(Error::BadTileOrder(8, 8))
        ));
        assert!(matches!(
            TileSizes::new(64, 12),
            Err(Error::BadTileSize(64, 12))
        ));
        assert!(matches!(
            TileSizes::new(64, 0),
            Err(Error::BadTileSize(64, 0))
        ));
    }

    #[test]
    fn validate() {
        assert!(RenderConfig::<2>::default().validate().is_ok());
        assert!(RenderConfig::<3>::default().validate().is_ok());
        assert!(matches!(
            RenderConfig::<4>::default().validate(),
            Err(Error::BadDimension(4))
        ));
        let cfg = RenderConfig::<2> {
            image_size: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::BadImageSize)));
        let cfg = RenderConfig::<2> {
            subtile_lanes: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::NoLanes("subtile"))));
    }

    #[test]
    fn thread_count() {
        let n = std::num::NonZeroUsize::new(1).unwrap();
        assert_eq!(ThreadCount::from(n), ThreadCount::One);
        let n = std::num::NonZeroUsize::new(4).unwrap();
        assert_eq!(ThreadCount::from(n).get(), 4);
        assert_eq!(ThreadCount::from(n).to_string(), "4");
        assert_eq!(ThreadCount::One.to_string(), "-");
    }
}
