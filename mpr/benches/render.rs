use criterion::{
    BenchmarkId, Criterion, black_box, criterion_group, criterion_main,
};
use mpr::{
    render::{RenderConfig, Renderable, ThreadCount, View},
    tree::Tree,
};

fn sphere() -> Tree {
    let (x, y, z) = Tree::axes();
    (x.square() + y.square() + z.square()).sqrt() - 0.8
}

/// Union of spheres, which gives subtape pruning something to do
fn spheres() -> Tree {
    let (x, y, z) = Tree::axes();
    let mut out: Option<Tree> = None;
    for i in 0..8 {
        let a = i as f64 * std::f64::consts::TAU / 8.0;
        let s = ((x.clone() - a.cos() * 0.6).square()
            + (y.clone() - a.sin() * 0.6).square()
            + z.square())
        .sqrt()
            - 0.2;
        out = Some(match out {
            Some(t) => t.min(s),
            None => s,
        });
    }
    out.unwrap()
}

pub fn size_sweep_2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("speed vs image size (2d)");
    for (name, shape) in [("sphere", sphere()), ("spheres", spheres())] {
        for size in [256, 512, 1024] {
            let cfg = RenderConfig::<2> {
                image_size: size,
                ..RenderConfig::default()
            };
            let mut r = Renderable::build(&shape, cfg).unwrap();
            let view = View::default();
            group.bench_function(BenchmarkId::new(name, size), |b| {
                b.iter(|| {
                    r.run(&view).unwrap();
                    black_box(r.image().pixels().len())
                })
            });
        }
    }
}

pub fn thread_sweep_3d(c: &mut Criterion) {
    let shape = spheres();
    let mut group = c.benchmark_group("speed vs threads (3d, 256^3)");
    for threads in [1, 2, 4, 8] {
        let cfg = RenderConfig::<3> {
            image_size: 256,
            threads: ThreadCount::from(
                std::num::NonZeroUsize::new(threads).unwrap(),
            ),
            ..RenderConfig::default()
        };
        let mut r = Renderable::build(&shape, cfg).unwrap();
        let view = View::default();
        group.bench_function(BenchmarkId::new("spheres", threads), |b| {
            b.iter(|| {
                r.run(&view).unwrap();
                black_box(r.image().pixels().len())
            })
        });
    }
}

criterion_group!(benches, size_sweep_2d, thread_sweep_3d);
criterion_main!(benches);
