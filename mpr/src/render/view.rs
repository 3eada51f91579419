use crate::types::Interval;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Object providing a world-to-model transform
///
/// Rendering happens in the ±1 square or cube; these are referred to as
/// _world_ coordinates.  A `View` maps from positions in world coordinates to
/// _model_ coordinates, where the shape is evaluated:
///
/// `model = rotation * (world * scale) + center`
///
/// Here's an example of using a `View` to focus on the region `[4, 6]`:
///
/// ```
/// # use nalgebra::{Vector3, Point3};
/// # use mpr::render::View;
/// let view = View::from_center_and_scale(Vector3::new(5.0, 5.0, 0.0), 1.0);
///
/// let a = view.transform_point(&Point3::new(0.0, 0.0, 0.0));
/// assert_eq!(a, Point3::new(5.0, 5.0, 0.0));
///
/// let b = view.transform_point(&Point3::new(1.0, -1.0, 0.0));
/// assert_eq!(b, Point3::new(6.0, 4.0, 0.0));
/// ```
///
/// Screen coordinates (pixels or voxels) are converted to world coordinates
/// with [`View::screen_to_world`]; 2D images sit in the `z = 0` plane.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct View {
    center: Vector3<f32>,
    scale: f32,
    rotation: UnitQuaternion<f32>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            center: Vector3::zeros(),
            scale: 1.0,
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl View {
    /// Builds a view from its parts
    pub fn new(
        center: Vector3<f32>,
        scale: f32,
        rotation: UnitQuaternion<f32>,
    ) -> Self {
        Self {
            center,
            scale,
            rotation,
        }
    }

    /// Builds a camera from a center (in model coordinates) and a scale
    ///
    /// The resulting camera will point at the center, and the viewport will be
    /// ± `scale` in size.
    pub fn from_center_and_scale(center: Vector3<f32>, scale: f32) -> Self {
        Self {
            center,
            scale,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Returns the view center
    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    /// Returns the view scale
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns the view rotation
    pub fn rotation(&self) -> UnitQuaternion<f32> {
        self.rotation
    }

    /// Transform a point from world to model space
    pub fn transform_point(&self, p: &Point3<f32>) -> Point3<f32> {
        Point3::from(self.rotation * (p.coords * self.scale) + self.center)
    }

    /// Applies a translation (in model units) to the current camera position
    pub fn translate(&mut self, dt: Vector3<f32>) {
        self.center += dt;
    }

    /// Zooms the camera about a particular position (in world space)
    pub fn zoom(&mut self, amount: f32, pos: Option<Point3<f32>>) {
        match pos {
            Some(before) => {
                let pos_before = self.transform_point(&before);
                self.scale *= amount;
                let pos_after = self.transform_point(&before);
                self.center += pos_before - pos_after;
            }
            None => {
                self.scale *= amount;
            }
        }
    }

    /// Applies an additional rotation about the view center
    pub fn rotate(&mut self, r: UnitQuaternion<f32>) {
        self.rotation = r * self.rotation;
    }

    /// Converts a screen-space position into world coordinates
    ///
    /// Pixel `x` maps to `-1 + 2x / size`, row `y` maps to `1 - 2y / size`
    /// (so row 0 is the top of the image), and voxel `z` maps to
    /// `-1 + 2z / size`.  In 2D, the world `z` coordinate is 0.
    pub fn screen_to_world<const N: usize>(
        image_size: u32,
        p: [f32; N],
    ) -> Point3<f32> {
        let s = image_size as f32;
        let z = if N == 3 { -1.0 + 2.0 * p[N - 1] / s } else { 0.0 };
        Point3::new(-1.0 + 2.0 * p[0] / s, 1.0 - 2.0 * p[1] / s, z)
    }

    /// Converts a screen-space position into model coordinates
    pub fn screen_to_model<const N: usize>(
        &self,
        image_size: u32,
        p: [f32; N],
    ) -> Point3<f32> {
        self.transform_point(&Self::screen_to_world(image_size, p))
    }

    /// Returns the model-space position of a pixel (or voxel) center
    pub fn pixel_center<const N: usize>(
        &self,
        image_size: u32,
        pos: [u32; N],
    ) -> Point3<f32> {
        self.screen_to_model(image_size, pos.map(|v| v as f32 + 0.5))
    }

    /// Returns model-space bounds of a screen-space box
    ///
    /// The box spans from `lo` to `hi` (exclusive, in pixel units).  Bounds
    /// are the axis-aligned box around every transformed corner, which remains
    /// conservative under rotation.
    pub fn cell_bounds<const N: usize>(
        &self,
        image_size: u32,
        lo: [u32; N],
        hi: [u32; N],
    ) -> [Interval; 3] {
        let mut min = Point3::from([f32::INFINITY; 3]);
        let mut max = Point3::from([f32::NEG_INFINITY; 3]);
        for c in 0..(1 << N) {
            let corner: [f32; N] = std::array::from_fn(|i| {
                let v = if c & (1 << i) == 0 { lo[i] } else { hi[i] };
                v as f32
            });
            let p = self.screen_to_model(image_size, corner);
            min = min.inf(&p);
            max = max.sup(&p);
        }
        [0, 1, 2].map(|i| Interval::new(min[i], max[i]))
    }
}
