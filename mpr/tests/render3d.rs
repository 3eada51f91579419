//! Integration tests for 3D (heightmap) rendering
use mpr::{
    render::{CellState, RenderConfig, Renderable, TileSizes, View},
    tree::Tree,
};
use nalgebra::{UnitQuaternion, Vector3};

fn sphere(r: f64) -> Tree {
    let (x, y, z) = Tree::axes();
    (x.square() + y.square() + z.square()).sqrt() - r
}

fn config(size: u32, tile: u32, subtile: u32) -> RenderConfig<3> {
    RenderConfig {
        image_size: size,
        tile_sizes: TileSizes::new(tile, subtile).unwrap(),
        ..RenderConfig::default()
    }
}

#[test]
fn sphere_depth() {
    let size = 32;
    for scale in [1.0, 0.5] {
        let view = View::from_center_and_scale(Vector3::zeros(), scale);
        for r in [0.5, 0.75] {
            let mut shape =
                Renderable::build(&sphere(r as f64), config(size, 16, 4))
                    .unwrap();
            shape.run(&view).unwrap();

            // Max error of one voxel (top to bottom) in world units, scaled
            // into model units, with a factor of two for margin
            let epsilon = 2.0 / size as f32 * scale * 2.0;
            for (x, y, p) in shape.image().iter() {
                if p.depth == size {
                    // Skip saturated columns
                    continue;
                }
                if p.filled() {
                    let pos = view.pixel_center(size, [x, y, p.depth - 1]);
                    let v = pos.coords.norm();
                    let err = (r - v).abs();
                    assert!(
                        err < epsilon,
                        "too much error {err} at ({x}, {y}, {}) \
                         (scale = {scale}); radius is {v}, expected {r}",
                        p.depth
                    );
                } else {
                    let pos = view.pixel_center(size, [x, y]);
                    let v = pos.coords.norm();
                    assert!(
                        v + epsilon > r,
                        "got empty column inside the sphere at ({x}, {y}); \
                         radius is {v}"
                    );
                }
            }
        }
    }
}

#[test]
fn top_normal() {
    let mut r = Renderable::build(&sphere(0.75), config(64, 16, 4)).unwrap();
    r.run(&View::default()).unwrap();
    let p = r.image()[(32, 32)];
    assert!(p.filled());
    assert!(p.normal[2] > 0.99, "bad normal {:?}", p.normal);

    // Off to the side, the normal leans outwards
    let p = r.image()[(48, 32)];
    assert!(p.filled());
    assert!(p.normal[0] > 0.5, "bad normal {:?}", p.normal);
}

#[test]
fn filled_tiles_occlude() {
    // A slab filling the bottom half of the volume, with a bump on top
    let (x, y, z) = Tree::axes();
    let bump = ((x.square() + y.square() + (z.clone() - 0.1).square()).sqrt()
        - 0.2)
        .min(z);
    let mut r = Renderable::build(&bump, config(64, 16, 4)).unwrap();
    r.run(&View::default()).unwrap();

    let tiles = r.tiles();
    assert!(!tiles.filled().is_empty());
    assert!(
        (0..tiles.len()).any(|i| tiles.get(i).state == CellState::Empty)
    );

    // Far from the bump, the slab's top is at z = 0, which is the top of
    // voxel 31
    for (x, y) in [(2, 2), (60, 5), (10, 58)] {
        let p = r.image()[(x, y)];
        assert_eq!(p.depth, 32, "bad depth at ({x}, {y})");
        assert_eq!(p.normal, [0.0, 0.0, 1.0]);
    }
    // The bump sticks up above the slab
    assert!(r.image()[(32, 32)].depth > 32);
    assert!(r.stats().store_len > 0);
}

#[test]
fn rotation_is_deterministic() {
    let (x, y, z) = Tree::axes();
    let shape = (x.square() / 0.4 + y.square() + z.square() / 0.2).sqrt() - 0.5;
    let mut view = View::default();
    view.rotate(UnitQuaternion::from_euler_angles(0.3, -0.2, 0.1));

    let mut r = Renderable::build(&shape, config(48, 16, 4)).unwrap();
    r.run(&view).unwrap();
    let first = r.image().clone();
    assert!(first.pixels().iter().any(|p| p.filled()));
    r.run(&view).unwrap();
    assert!(first.bit_eq(r.image()));
}
