//! Massively parallel rendering of complex closed-form implicit surfaces
//!
//! A shape is described as a [`Tree`](tree::Tree), which is compiled into a
//! linear [`Tape`](tape::Tape).  Rendering is hierarchical: coarse tiles are
//! evaluated with [interval arithmetic](types::Interval), and the results
//! are used both to skip empty and filled regions and to prune the tape
//! before evaluating finer regions.  Pixels are evaluated with `f32`
//! arithmetic, and surface normals are found with
//! [automatic differentiation](types::Dual).
//!
//! ```
//! use mpr::{
//!     render::{RenderConfig, Renderable, View},
//!     tree::Tree,
//! };
//!
//! let (x, y, z) = Tree::axes();
//! let sphere = (x.square() + y.square() + z.square()).sqrt() - 0.75;
//!
//! let cfg = RenderConfig::<3> {
//!     image_size: 64,
//!     ..RenderConfig::default()
//! };
//! let mut r = Renderable::build(&sphere, cfg)?;
//! r.run(&View::default())?;
//!
//! // The center of the heightmap is the top of the sphere
//! let p = r.image()[(32, 32)];
//! assert!(p.filled());
//! assert!(p.normal[2] > 0.99);
//! # Ok::<(), mpr::Error>(())
//! ```
#![warn(missing_docs)]

pub mod render;
pub mod tape;
pub mod tree;
pub mod types;

mod error;
pub use error::Error;
