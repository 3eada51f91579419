//! Integration tests for the 2D rendering pipeline
use mpr::{
    Error,
    render::{
        CellState, RenderConfig, Renderable, ThreadCount, TileSizes, View,
    },
    tape::{Choice, Clause, Tape},
    tree::{Axis, Tree},
    types::Interval,
};
use nalgebra::{UnitQuaternion, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::num::NonZeroUsize;

fn circle(cx: f64, cy: f64, r: f64) -> Tree {
    let (x, y, _z) = Tree::axes();
    ((x - cx).square() + (y - cy).square()).sqrt() - r
}

fn config(size: u32, tile: u32, subtile: u32) -> RenderConfig<2> {
    RenderConfig {
        image_size: size,
        tile_sizes: TileSizes::new(tile, subtile).unwrap(),
        ..RenderConfig::default()
    }
}

#[test]
fn sphere_scenario() {
    let (x, y, z) = Tree::axes();
    let sphere = x.square() + y.square() + z.square() - 1.0;
    let view = View::from_center_and_scale(Vector3::zeros(), 2.0);
    let mut r = Renderable::build(&sphere, config(64, 16, 4)).unwrap();
    r.run(&view).unwrap();

    let nearest = |i: Interval| {
        if i.contains(0.0) {
            0.0
        } else {
            i.lower().abs().min(i.upper().abs())
        }
    };
    let farthest = |i: Interval| i.lower().abs().max(i.upper().abs());

    // Tiles are 1 unit across and subtiles 1/4 unit across, so only subtiles
    // fit within r = 0.5
    let (mut ambiguous, mut empty, mut filled) = (0, 0, 0);
    for (grid, is_tile) in [(r.tiles(), true), (r.subtiles(), false)] {
        for i in 0..grid.len() {
            let state = grid.get(i).state;
            if state == CellState::Unprocessed {
                assert!(!is_tile, "tile {i} was never classified");
                continue;
            }
            let (lo, hi) = grid.bounds(i);
            let [x, y, _z] = view.cell_bounds(64, lo, hi);
            let near = nearest(x).hypot(nearest(y));
            let far = farthest(x).hypot(farthest(y));
            if is_tile && x.contains(0.0) && y.contains(0.0) {
                assert_eq!(state, CellState::Ambiguous, "tile {i}");
                ambiguous += 1;
            }
            if near > 1.5 {
                assert_eq!(state, CellState::Empty, "cell {i} ({is_tile})");
                empty += 1;
            } else if far < 0.5 {
                assert_eq!(state, CellState::Filled, "cell {i} ({is_tile})");
                filled += 1;
            }
        }
    }
    assert_eq!(ambiguous, 4);
    assert!(empty > 0);
    assert!(filled > 0);
    assert!(r.stats().subtiles_filled > 0);

    // Every pixel agrees with a direct evaluation at its center
    let tape = r.tape();
    for (x, y, p) in r.image().iter() {
        let c = view.pixel_center(64, [x, y]);
        let v = tape.eval_f32(c.x, c.y, c.z);
        assert_eq!(p.filled(), v <= 0.0, "pixel ({x}, {y}) = {v}");
        if p.filled() {
            assert_eq!(p.depth, 1);
        }
    }
}

#[test]
fn classification_is_consistent() {
    let shape = circle(-0.3, 0.1, 0.4).min(circle(0.4, -0.2, 0.3));
    let view = View::new(
        Vector3::new(0.1, 0.0, 0.0),
        1.2,
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.3),
    );
    let mut r = Renderable::build(&shape, config(128, 32, 8)).unwrap();
    r.run(&view).unwrap();
    let tape = r.tape();

    let mut rng = StdRng::seed_from_u64(123);
    for grid in [r.tiles(), r.subtiles()] {
        for i in 0..grid.len() {
            let state = grid.get(i).state;
            let (lo, hi) = grid.bounds(i);
            for _ in 0..16 {
                let p = [0, 1]
                    .map(|j| rng.gen_range(lo[j] as f32..hi[j] as f32));
                let m = view.screen_to_model(128, p);
                let v = tape.eval_f32(m.x, m.y, m.z);
                match state {
                    CellState::Filled => assert!(v <= 0.0, "cell {i}: {v}"),
                    CellState::Empty => assert!(v > 0.0, "cell {i}: {v}"),
                    _ => (),
                }
            }
        }
    }
}

#[test]
fn union_uses_subtapes() {
    let shape = circle(-0.5, 0.0, 0.2).min(circle(0.5, 0.0, 0.2));
    let mut r = Renderable::build(&shape, config(128, 16, 4)).unwrap();
    r.run(&View::default()).unwrap();
    let s = r.stats();
    assert!(s.store_len > 0);
    assert!(s.pixels_filled > 0);

    // Each ambiguous subtile only sees one of the two circles
    let full = r.tape().len();
    let subtiles = r.subtiles();
    for &i in subtiles.active() {
        let v = r.store().view(r.tape(), subtiles.get(i as usize).tape);
        assert!(v.len() < full);
        assert_eq!(v.choice_count(), 0);
    }
}

#[test]
fn min_subtape() {
    let (x, y, _z) = Tree::axes();
    let tape = Tape::new(&x.min(y)).unwrap();
    let (v, choices) = tape.eval_interval(
        Interval::new(2.0, 3.0),
        Interval::new(-1.0, 0.0),
        Interval::from(0.0),
    );
    assert_eq!(v, Interval::new(-1.0, 0.0));
    assert_eq!(choices, vec![Choice::Right]);

    let sub = tape.simplify(&choices).unwrap();
    assert_eq!(sub.clauses(), &[Clause::Input(Axis::Y)]);
    assert_eq!(sub.choice_count(), 0);
}

#[test]
fn dual_matches_finite_differences() {
    let (x, y, z) = Tree::axes();
    let sphere = (x.square() + y.square() + z.square()).sqrt() - 1.0;
    let tape = Tape::new(&sphere).unwrap();

    let mut rng = StdRng::seed_from_u64(0);
    let h = 1e-2;
    for _ in 0..100 {
        let p: [f32; 3] = std::array::from_fn(|_| rng.gen_range(-2.0..2.0));
        if p.iter().map(|v| v * v).sum::<f32>() < 0.25 {
            continue;
        }
        let d = tape.eval_dual(p[0], p[1], p[2]);
        assert_eq!(d.v, tape.eval_f32(p[0], p[1], p[2]));
        for (i, g) in d.gradient().into_iter().enumerate() {
            let mut a = p;
            let mut b = p;
            a[i] += h;
            b[i] -= h;
            let fd = (tape.eval_f32(a[0], a[1], a[2])
                - tape.eval_f32(b[0], b[1], b[2]))
                / (2.0 * h);
            assert!((fd - g).abs() < 1e-3, "axis {i} at {p:?}: {fd} != {g}");
        }
    }
}

#[test]
fn frames_are_deterministic() {
    let shape = circle(-0.3, 0.1, 0.4).min(circle(0.4, -0.2, 0.3));
    let view = View::from_center_and_scale(Vector3::new(0.05, 0.0, 0.0), 1.1);

    let mut images = vec![];
    let four = NonZeroUsize::new(4).unwrap();
    for threads in [ThreadCount::One, ThreadCount::Many(four)] {
        let cfg = RenderConfig {
            threads,
            subtile_lanes: 7,
            pixel_lanes: 5,
            ..config(96, 32, 8)
        };
        let mut r = Renderable::build(&shape, cfg).unwrap();
        r.run(&view).unwrap();
        let first = r.image().clone();
        r.run(&view).unwrap();
        assert!(first.bit_eq(r.image()));
        images.push(first);
    }
    assert!(images[0].bit_eq(&images[1]));
}

#[test]
fn build_errors() {
    let shape = circle(0.0, 0.0, 0.5);
    let r = Renderable::build(
        &shape,
        RenderConfig::<2> {
            max_tape_len: 3,
            ..RenderConfig::default()
        },
    );
    assert!(matches!(r, Err(Error::TapeTooLong(_, 3))));

    let r = Renderable::build(&shape, RenderConfig::<4>::default());
    assert!(matches!(r, Err(Error::BadDimension(4))));

    let r = Renderable::build(
        &shape,
        RenderConfig::<2> {
            pixel_lanes: 0,
            ..RenderConfig::default()
        },
    );
    assert!(matches!(r, Err(Error::NoLanes("pixel"))));

    let union = circle(-0.5, 0.0, 0.2).min(circle(0.5, 0.0, 0.2));
    let r = Renderable::build(
        &union,
        RenderConfig::<2> {
            subtape_capacity: 4,
            ..RenderConfig::default()
        },
    );
    assert!(matches!(r, Err(Error::SubtapeStoreTooSmall(4, _))));
}

#[test]
fn texture() {
    let mut r =
        Renderable::build(&circle(0.0, 0.0, 0.5), config(32, 16, 4)).unwrap();
    let mut tex = r.register_texture();
    assert!(matches!(
        r.copy_to_texture(&mut tex, false),
        Err(Error::FrameIncomplete)
    ));

    r.run(&View::default()).unwrap();
    r.copy_to_texture(&mut tex, false).unwrap();
    for (i, p) in r.image().pixels().iter().enumerate() {
        let t = tex.data()[i];
        if p.filled() {
            assert_eq!(t[3], 255);
        } else {
            assert_eq!(t, [0; 4]);
        }
    }
    // 2D normals lie in the XY plane; the right edge of the circle faces +X
    let t = tex.data()[r.image().offset(23, 16)];
    assert!(t[0] > 250, "bad texel {t:?}");
    assert_eq!(t[2], 127);
}
