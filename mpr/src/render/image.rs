//! Output image and display texture types

/// A single pixel in a rendered image
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pixel {
    /// Depth of the topmost filled voxel plus one (or 1 for 2D images)
    ///
    /// A depth of 0 marks an unfilled pixel.
    pub depth: u32,
    /// Surface normal at this pixel
    ///
    /// This may be non-finite where the field's gradient is zero or
    /// undefined.
    pub normal: [f32; 3],
}

impl Pixel {
    /// Checks whether this pixel is inside the shape
    #[inline]
    pub fn filled(&self) -> bool {
        self.depth > 0
    }
}

/// Square image of [`Pixel`] records, stored in row-major order
///
/// Row 0 is the top of the image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image {
    size: u32,
    pixels: Vec<Pixel>,
}

impl Image {
    /// Builds a new (unfilled) image
    pub fn new(size: u32) -> Self {
        Self {
            size,
            pixels: vec![Pixel::default(); (size as usize).pow(2)],
        }
    }

    /// Returns the image size (in pixels per side)
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the image width
    pub fn width(&self) -> u32 {
        self.size
    }

    /// Returns the image height
    pub fn height(&self) -> u32 {
        self.size
    }

    /// Returns the pixel data
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Resets every pixel to unfilled
    pub fn clear(&mut self) {
        self.pixels.fill(Pixel::default());
    }

    /// Returns the data offset of a pixel position
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.size as usize
    }

    /// Writes a pixel if it is above the current depth at that position
    #[inline]
    pub(crate) fn blend(&mut self, offset: usize, p: Pixel) {
        if p.depth > self.pixels[offset].depth {
            self.pixels[offset] = p;
        }
    }

    /// Iterates over `(x, y, pixel)` tuples
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &Pixel)> + '_ {
        let size = self.size as usize;
        self.pixels
            .iter()
            .enumerate()
            .map(move |(i, p)| ((i % size) as u32, (i / size) as u32, p))
    }

    /// Checks whether two images are bit-identical
    ///
    /// Unlike `==`, this treats matching `NaN` normals as equal.
    pub fn bit_eq(&self, other: &Image) -> bool {
        self.size == other.size
            && self.pixels.iter().zip(&other.pixels).all(|(a, b)| {
                a.depth == b.depth
                    && a.normal.map(f32::to_bits) == b.normal.map(f32::to_bits)
            })
    }
}

impl std::ops::Index<(u32, u32)> for Image {
    type Output = Pixel;
    fn index(&self, (x, y): (u32, u32)) -> &Self::Output {
        &self.pixels[self.offset(x, y)]
    }
}

/// RGBA8 texture, standing in for an external display surface
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    data: Vec<[u8; 4]>,
}

impl Texture {
    /// Builds a new transparent texture
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![[0; 4]; width as usize * height as usize],
        }
    }

    /// Returns the texture width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the texture height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns texel data, in row-major order
    pub fn data(&self) -> &[[u8; 4]] {
        &self.data
    }

    /// Returns texel data as a flat byte slice
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_flattened()
    }

    /// Copies an image into the texture
    ///
    /// Filled pixels are shaded by normal; unfilled pixels are cleared, unless
    /// `append` is set, in which case the existing texel is kept.
    ///
    /// # Panics
    /// If the image and texture sizes differ
    pub(crate) fn copy_from(&mut self, image: &Image, append: bool) {
        assert_eq!(self.data.len(), image.pixels.len());
        for (t, p) in self.data.iter_mut().zip(&image.pixels) {
            if p.filled() {
                *t = shade(p.normal);
            } else if !append {
                *t = [0; 4];
            }
        }
    }
}

/// Converts a normal into an opaque color
///
/// Each component maps from `[-1, 1]` to `[0, 255]`; non-finite components
/// become 0.
pub fn shade(normal: [f32; 3]) -> [u8; 4] {
    let [r, g, b] = normal.map(|n| ((n * 0.5 + 0.5) * 255.0) as u8);
    [r, g, b, 255]
}
