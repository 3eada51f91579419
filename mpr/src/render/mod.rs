//! Hierarchical rendering of implicit surfaces
//!
//! A [`Renderable`] runs three stages per frame, each one a series of
//! parallel dispatches over preallocated lanes:
//!
//! - The [`TileEvaluator`] classifies coarse tiles with interval arithmetic,
//!   deriving a pruned subtape for every ambiguous tile
//! - The [`SubtileEvaluator`] repeats that process for the subtiles of each
//!   ambiguous tile, starting from the tile's subtape
//! - The [`PixelEvaluator`] fills in the image, drawing filled cells directly
//!   and evaluating the pixels (or voxel columns) of ambiguous subtiles
//!
//! Rendering takes place in a square (2D) or cubical (3D) region of world
//! space spanning `±1` on each axis; a [`View`] maps that region into model
//! coordinates.
mod config;
mod device;
mod image;
mod pixel;
mod renderable;
mod subtile;
pub(crate) mod tile;
mod tiles;
mod view;

pub use config::{
    MAX_TAPE_LEN, PIXEL_LANES, RenderConfig, SUBTAPE_CAPACITY, SUBTILE_LANES,
    TILE_LANES, ThreadCount, TileSizes,
};
pub use device::Device;
pub use image::{Image, Pixel, Texture, shade};
pub use pixel::PixelEvaluator;
pub use renderable::{FrameStats, Renderable};
pub use subtile::SubtileEvaluator;
pub use tile::TileEvaluator;
pub use tiles::{Cell, CellState, TileGrid};
pub use view::View;
