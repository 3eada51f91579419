use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;
use nalgebra::Vector3;

use mpr::{
    render::{RenderConfig, Renderable, ThreadCount, TileSizes, View},
    tree::Tree,
};

/// Renders built-in implicit surfaces to PNG files
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Shape to render
    #[clap(long, value_enum, default_value_t = Shape::Sphere)]
    shape: Shape,

    /// Render dimension
    #[clap(short, long, default_value_t = 2,
           value_parser = clap::value_parser!(u8).range(2..=3))]
    dim: u8,

    /// Image size
    #[clap(short, long, default_value_t = 256)]
    size: u32,

    /// View scale (the image spans ±scale in model units)
    #[clap(long, default_value_t = 1.0)]
    scale: f32,

    /// Tile size, in pixels
    #[clap(long, default_value_t = 64)]
    tile: u32,

    /// Subtile size, in pixels
    #[clap(long, default_value_t = 8)]
    subtile: u32,

    /// Number of threads to use
    #[clap(short, long)]
    threads: Option<NonZeroUsize>,

    /// Number of times to render (for benchmarking)
    #[clap(short = 'N', default_value_t = 1)]
    n: usize,

    /// In 3D, write a grayscale heightmap instead of shaded normals
    #[clap(long)]
    heightmap: bool,

    /// Name of a `.png` file to write
    #[clap(short, long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone)]
enum Shape {
    /// A single sphere (or circle in 2D)
    Sphere,
    /// Ring of spheres combined with `min`
    Union,
    /// Two spheres with a smooth (exponential) blend
    Blend,
}

impl Shape {
    fn tree(self) -> Tree {
        let ball = |cx: f64, cy: f64, r: f64| {
            let (x, y, z) = Tree::axes();
            ((x - cx).square() + (y - cy).square() + z.square()).sqrt() - r
        };
        match self {
            Shape::Sphere => ball(0.0, 0.0, 0.8),
            Shape::Union => (0..12)
                .map(|i| {
                    let a = i as f64 * std::f64::consts::TAU / 12.0;
                    ball(a.cos() * 0.6, a.sin() * 0.6, 0.15)
                })
                .fold(ball(0.0, 0.0, 0.3), |acc, b| acc.min(b)),
            Shape::Blend => {
                // -ln(exp(-k * a) + exp(-k * b)) / k
                let k = 8.0;
                let a = ball(-0.3, 0.0, 0.4);
                let b = ball(0.35, 0.1, 0.3);
                let sum = (a * -k).exp() + (b * -k).exp();
                sum.ln() / -k
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

fn run<const N: usize>(tree: &Tree, args: &Args) -> Result<Vec<u8>> {
    let cfg = RenderConfig::<N> {
        image_size: args.size,
        tile_sizes: TileSizes::new(args.tile, args.subtile)?,
        threads: args.threads.map(ThreadCount::from).unwrap_or_default(),
        ..RenderConfig::default()
    };
    let start = Instant::now();
    let mut r = Renderable::build(tree, cfg)?;
    info!(
        "Built {} clause tape with {} threads in {:?}",
        r.tape().len(),
        r.device().thread_count(),
        start.elapsed()
    );

    let view = View::from_center_and_scale(Vector3::zeros(), args.scale);
    let start = Instant::now();
    for _ in 0..args.n {
        r.run(&view)?;
    }
    info!(
        "Rendered {}x at {:?} ms/frame",
        args.n,
        start.elapsed().as_micros() as f64 / 1000.0 / (args.n as f64)
    );
    info!("{:?}", r.stats());

    let out = if N == 3 && args.heightmap {
        let image = r.image();
        let z_max = image.pixels().iter().map(|p| p.depth).max();
        let z_max = z_max.unwrap_or(1).max(1);
        image
            .pixels()
            .iter()
            .flat_map(|p| {
                if p.filled() {
                    let z = (p.depth * 255 / z_max) as u8;
                    [z, z, z, 255]
                } else {
                    [0, 0, 0, 0]
                }
            })
            .collect()
    } else {
        let mut tex = r.register_texture();
        r.copy_to_texture(&mut tex, false)?;
        tex.as_bytes().to_vec()
    };
    Ok(out)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();
    let tree = args.shape.tree();
    let buffer = match args.dim {
        2 => run::<2>(&tree, &args)?,
        3 => run::<3>(&tree, &args)?,
        d => anyhow::bail!("invalid dimension {d}"),
    };

    if let Some(out) = &args.out {
        image::save_buffer(
            out,
            &buffer,
            args.size,
            args.size,
            image::ColorType::Rgba8,
        )?;
        info!("Saved image to {out:?}");
    }
    Ok(())
}
