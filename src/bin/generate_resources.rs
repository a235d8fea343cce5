//! Generate the demo's image resources procedurally
//!
//! Writes `wood.png`, `toy_box_normal.png`, `toy_box_disp.png` and `spheremap-3.jpg`
//! into `resources/images` (or the directory given as the first argument).

use anyhow::{Context, Result};
use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

const SIZE: u32 = 512;
/// Raised tiles per side of the toy box pattern
const TILES: u32 = 4;
const BEVEL: f32 = 0.08;
const NORMAL_STRENGTH: f32 = 6.0;

/// Toy box surface height in `[0, 1]`: raised square tiles with beveled edges
fn toy_box_height(u: f32, v: f32) -> f32 {
    let tile = |t: f32| {
        let f = (t * TILES as f32).fract();
        let edge = f.min(1.0 - f);
        (edge / BEVEL).clamp(0.0, 1.0)
    };
    tile(u).min(tile(v))
}

fn displacement_map() -> GrayImage {
    // stored as depth: white is furthest below the surface
    GrayImage::from_fn(SIZE, SIZE, |x, y| {
        let h = toy_box_height(x as f32 / SIZE as f32, y as f32 / SIZE as f32);
        Luma([((1.0 - h) * 255.0).round() as u8])
    })
}

fn normal_map() -> RgbaImage {
    let texel = 1.0 / SIZE as f32;
    RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        let (u, v) = (x as f32 * texel, y as f32 * texel);
        let dx = toy_box_height(u + texel, v) - toy_box_height(u - texel, v);
        let dy = toy_box_height(u, v + texel) - toy_box_height(u, v - texel);

        let (nx, ny, nz) = (-dx * NORMAL_STRENGTH, dy * NORMAL_STRENGTH, 1.0);
        let len = (nx * nx + ny * ny + nz * nz).sqrt();
        let encode = |c: f32| ((c / len * 0.5 + 0.5) * 255.0).round() as u8;
        Rgba([encode(nx), encode(ny), encode(nz), 255])
    })
}

fn wood_texture() -> RgbaImage {
    let light = [196.0, 148.0, 96.0];
    let dark = [120.0, 78.0, 42.0];
    RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        let u = x as f32 / SIZE as f32 - 0.5;
        let v = y as f32 / SIZE as f32 + 0.3;
        let wobble = 0.02 * (v * 9.0 * PI).sin() + 0.01 * (u * 23.0 * PI).sin();
        let rings = ((u * u + 0.15 * v * v).sqrt() * 40.0 + wobble * 40.0).fract();
        let t = (rings * 2.0 - 1.0).abs().powf(2.5);
        let mix = |i: usize| (light[i] * (1.0 - t) + dark[i] * t) as u8;
        Rgba([mix(0), mix(1), mix(2), 255])
    })
}

fn sphere_map() -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |x, y| {
        let u = 2.0 * x as f32 / SIZE as f32 - 1.0;
        let v = 1.0 - 2.0 * y as f32 / SIZE as f32;
        let r2 = u * u + v * v;
        if r2 > 1.0 {
            return Rgb([20, 20, 24]);
        }
        // reflection of a sky over a dark ground
        let z = (1.0 - r2).sqrt();
        let up = v * z * 2.0;
        let sky = (0.5 + 0.5 * up).clamp(0.0, 1.0);
        let highlight = (1.0 - ((u + 0.4).powi(2) + (v - 0.4).powi(2)) * 8.0).max(0.0);
        let channel = |base: f32| ((base * sky + highlight) * 255.0).min(255.0) as u8;
        Rgb([channel(0.55), channel(0.65), channel(0.85)])
    })
}

fn save(dir: &Path, name: &str, save: impl FnOnce(&Path) -> image::ImageResult<()>) -> Result<()> {
    let path = dir.join(name);
    save(&path).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("  wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/images"));

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    println!("Generating resources in {}", dir.display());

    save(&dir, "wood.png", |p| wood_texture().save(p))?;
    save(&dir, "toy_box_normal.png", |p| normal_map().save(p))?;
    save(&dir, "toy_box_disp.png", |p| displacement_map().save(p))?;
    save(&dir, "spheremap-3.jpg", |p| sphere_map().save(p))?;

    println!("Done");
    Ok(())
}
