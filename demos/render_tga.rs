//! Draws a TGA image onto a checkered background and saves the frame as PPM.
//!
//! Usage: `render_tga <image.tga> <out.ppm>`

use std::{env, fs::File, io::BufWriter, path::Path};

use anyhow::{bail, Context as _};
use rml_skia::{
    glam::{vec2, Vec2},
    ppm, Color, Context, LocalFiles, PremultipliedColor, Rect, RenderInterface, Vertex,
};
use simple_logger::SimpleLogger;

const WIDTH: u32 = 490;
const HEIGHT: u32 = 500;

fn quad(size: Vec2, color: PremultipliedColor) -> ([Vertex; 4], [i32; 6]) {
    let corner = |offset: Vec2| Vertex {
        position: offset * size,
        color,
        tex_coord: offset,
    };
    (
        [
            corner(vec2(0., 0.)),
            corner(vec2(1., 0.)),
            corner(vec2(1., 1.)),
            corner(vec2(0., 1.)),
        ],
        [0, 1, 2, 0, 2, 3],
    )
}

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()
        .unwrap();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        bail!("usage: {} <image.tga> <out.ppm>", args[0]);
    }
    let image = Path::new(&args[1]);
    let dir = image.parent().unwrap_or_else(|| Path::new("."));
    let name = image
        .file_name()
        .and_then(|n| n.to_str())
        .context("image path has no file name")?;

    let mut cx = Context::builder()
        .size(WIDTH, HEIGHT)
        .background(Color::rgb(40, 40, 48))
        .file_interface(LocalFiles::new(dir))
        .build()?;

    let (texture, size) = cx
        .load_texture(name)
        .with_context(|| format!("failed to load '{}'", image.display()))?;

    cx.begin_frame();

    let tile = 25.;
    let (vertices, indices) = quad(Vec2::splat(tile), Color::rgb(64, 64, 72).premultiply());
    let checker = cx.compile_geometry(&vertices, &indices)?;
    for y in 0..(HEIGHT / tile as u32) {
        for x in (y % 2..(WIDTH / tile as u32)).step_by(2) {
            cx.render_geometry(checker, vec2(x as f32, y as f32) * tile, None);
        }
    }
    cx.release_geometry(checker);

    let size = size.as_vec2();
    let origin = ((vec2(WIDTH as f32, HEIGHT as f32) - size) / 2.).floor();
    let (vertices, indices) = quad(size, Color::WHITE.premultiply());
    let image_quad = cx.compile_geometry(&vertices, &indices)?;

    let margin = Rect::from_ltrb(20., 20., WIDTH as f32 - 20., HEIGHT as f32 - 20.);
    cx.set_scissor_region(margin);
    cx.enable_scissor_region(true);
    cx.render_geometry(image_quad, origin, Some(texture));
    cx.enable_scissor_region(false);

    cx.end_frame();
    cx.release_geometry(image_quad);
    cx.release_texture(texture);

    let out = BufWriter::new(File::create(&args[2])?);
    ppm::write_ppm(cx.surface(), out)?;
    log::info!("Wrote {}", args[2]);

    Ok(())
}
