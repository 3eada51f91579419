use super::{
    Device, Image, PixelEvaluator, RenderConfig, SubtileEvaluator, Texture,
    TileEvaluator, TileGrid, View,
};
use crate::{
    Error,
    tape::{SubtapeStore, Tape},
    tree::Tree,
};

/// Summary of the most recent frame
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FrameStats {
    /// Number of tiles classified as filled
    pub tiles_filled: usize,
    /// Number of tiles classified as ambiguous
    pub tiles_ambiguous: usize,
    /// Number of subtiles visited (i.e. within ambiguous tiles)
    pub subtiles_visited: usize,
    /// Number of subtiles classified as filled
    pub subtiles_filled: usize,
    /// Number of subtiles classified as ambiguous
    pub subtiles_ambiguous: usize,
    /// Number of pixels written by per-pixel evaluation
    pub pixels_evaluated: usize,
    /// Number of filled pixels in the final image
    pub pixels_filled: usize,
    /// Number of clauses in the subtape store at the end of the frame
    pub store_len: usize,
}

/// A compiled shape, along with every buffer needed to render it
///
/// All per-frame storage (lane scratch space, tile grids, the subtape store,
/// and the image) is allocated once in [`build`](Self::build) and reused by
/// every call to [`run`](Self::run).
///
/// ```
/// use mpr::{render::{RenderConfig, Renderable, View}, tree::Tree};
///
/// let (x, y, _z) = Tree::axes();
/// let circle = (x.square() + y.square()).sqrt() - 0.5;
/// let cfg = RenderConfig::<2> {
///     image_size: 64,
///     ..RenderConfig::default()
/// };
/// let mut r = Renderable::build(&circle, cfg)?;
/// r.run(&View::default())?;
/// assert!(r.image()[(32, 32)].filled());
/// assert!(!r.image()[(0, 0)].filled());
///
/// let mut tex = r.register_texture();
/// r.copy_to_texture(&mut tex, false)?;
/// assert_eq!(tex.data()[0], [0; 4]);
/// # Ok::<(), mpr::Error>(())
/// ```
pub struct Renderable<const N: usize> {
    config: RenderConfig<N>,
    device: Device,
    tape: Tape,
    store: SubtapeStore,
    image: Image,
    tile_eval: TileEvaluator<N>,
    subtile_eval: SubtileEvaluator<N>,
    pixel_eval: PixelEvaluator<N>,
    complete: bool,
    stats: FrameStats,
}

impl<const N: usize> Renderable<N> {
    /// Compiles a tree and allocates render buffers
    pub fn build(tree: &Tree, config: RenderConfig<N>) -> Result<Self, Error> {
        config.validate()?;
        let tape = Tape::new(tree)?;
        Self::from_tape(tape, config)
    }

    /// Allocates render buffers for an existing tape
    ///
    /// Returns [`Error::TapeTooLong`] if the tape exceeds the configured
    /// register budget, or [`Error::SubtapeStoreTooSmall`] if the tape has
    /// choices and the subtape store is shorter than the tape.
    pub fn from_tape(
        tape: Tape,
        config: RenderConfig<N>,
    ) -> Result<Self, Error> {
        config.validate()?;
        if tape.len() > config.max_tape_len {
            return Err(Error::TapeTooLong(tape.len(), config.max_tape_len));
        }
        // Tapes without choices are never simplified, so nothing is stored
        if tape.choice_count() > 0 && config.subtape_capacity < tape.len() {
            return Err(Error::SubtapeStoreTooSmall(
                config.subtape_capacity,
                tape.len(),
            ));
        }
        let device = Device::new(config.threads)?;

        // Registers are sized to this tape, which is never longer than the
        // budget; subtapes are never longer than their parent.
        let regs = tape.len();
        let size = config.image_size;
        let sizes = config.tile_sizes;
        let tile_eval =
            TileEvaluator::new(size, sizes.tile(), config.tile_lanes, regs);
        let subtile_eval = SubtileEvaluator::new(
            size,
            sizes.subtile(),
            config.subtile_lanes,
            regs,
        );
        let pixel_eval =
            PixelEvaluator::new(sizes.subtile(), config.pixel_lanes, regs);
        log::debug!(
            "built {N}D renderable: {} clauses ({} choices), {} tiles, \
             {} subtiles, store capacity {}",
            tape.len(),
            tape.choice_count(),
            tile_eval.tiles().len(),
            subtile_eval.subtiles().len(),
            config.subtape_capacity,
        );

        Ok(Self {
            store: SubtapeStore::new(config.subtape_capacity),
            image: Image::new(size),
            device,
            tape,
            tile_eval,
            subtile_eval,
            pixel_eval,
            config,
            complete: false,
            stats: FrameStats::default(),
        })
    }

    /// Renders a frame with the given view
    ///
    /// Stages run in order (tiles, subtiles, then pixels), each one finishing
    /// before the next begins.  The image is only valid (and
    /// [`is_complete`](Self::is_complete) only returns `true`) if this
    /// function succeeds.
    pub fn run(&mut self, view: &View) -> Result<(), Error> {
        self.complete = false;
        let Self {
            device,
            tape,
            store,
            image,
            tile_eval,
            subtile_eval,
            pixel_eval,
            ..
        } = self;
        device.run(|| {
            store.clear();
            image.clear();
            tile_eval.run(tape, store, view)?;
            subtile_eval.run(tape, tile_eval.tiles(), store, view)?;
            pixel_eval.draw_filled(tile_eval.tiles(), image);
            pixel_eval.draw_filled(subtile_eval.subtiles(), image);
            pixel_eval.run(tape, subtile_eval.subtiles(), store, view, image)
        })?;

        let tiles = self.tile_eval.tiles();
        let subtiles = self.subtile_eval.subtiles();
        self.stats = FrameStats {
            tiles_filled: tiles.filled().len(),
            tiles_ambiguous: tiles.active().len(),
            subtiles_visited: self.subtile_eval.visited(),
            subtiles_filled: subtiles.filled().len(),
            subtiles_ambiguous: subtiles.active().len(),
            pixels_evaluated: self.pixel_eval.written(),
            pixels_filled: self
                .image
                .pixels()
                .iter()
                .filter(|p| p.filled())
                .count(),
            store_len: self.store.len(),
        };
        log::debug!("frame complete: {:?}", self.stats);
        self.complete = true;
        Ok(())
    }

    /// Returns the rendered image
    ///
    /// This is only meaningful after a successful call to [`run`](Self::run).
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Returns the root tape
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the tile grid from the most recent frame
    pub fn tiles(&self) -> &TileGrid<N> {
        self.tile_eval.tiles()
    }

    /// Returns the subtile grid from the most recent frame
    pub fn subtiles(&self) -> &TileGrid<N> {
        self.subtile_eval.subtiles()
    }

    /// Returns the subtape store from the most recent frame
    pub fn store(&self) -> &SubtapeStore {
        &self.store
    }

    /// Checks whether the most recent frame finished successfully
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns statistics for the most recent frame
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Returns the configuration used to build this renderable
    pub fn config(&self) -> &RenderConfig<N> {
        &self.config
    }

    /// Returns the device used for evaluation
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Builds a blank texture matching the image size
    pub fn register_texture(&self) -> Texture {
        let size = self.config.image_size;
        Texture::new(size, size)
    }

    /// Shades the most recent frame into a texture
    ///
    /// Filled pixels are colored by their normal.  If `append` is `true`,
    /// texels under unfilled pixels are left unchanged; otherwise, they are
    /// cleared.
    pub fn copy_to_texture(
        &self,
        texture: &mut Texture,
        append: bool,
    ) -> Result<(), Error> {
        if !self.complete {
            return Err(Error::FrameIncomplete);
        }
        let size = self.image.size();
        if texture.width() != size || texture.height() != size {
            return Err(Error::BadTextureSize(
                texture.width(),
                texture.height(),
                size,
            ));
        }
        texture.copy_from(&self.image, append);
        Ok(())
    }
}
