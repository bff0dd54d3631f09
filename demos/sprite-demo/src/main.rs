use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use retro_sprites::*;

const FRAME_W: usize = 12;
const FRAME_H: usize = 8;
const SHADES: &[u8] = b" .:-=+*#%@";

/// Configure a handful of sprites and print the rendered frame.
#[derive(Parser)]
#[command(version, about = "retro-sprites terminal demo")]
struct Cli {
    /// Engine configuration JSON (width, height, num_sprites).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Rotation of the middle sprite, in degrees.
    #[arg(long, default_value_t = 30.0)]
    angle: f32,

    /// Scale of the right-hand sprite.
    #[arg(long, default_value_t = 1.5)]
    scale: f32,

    /// Mirror every sprite horizontally.
    #[arg(long)]
    flip: bool,
}

/// Two frames: an arrow pointing right and a hollow box.
fn build_spriteset() -> anyhow::Result<Rc<Spriteset>> {
    let mut bitmap = Bitmap::new(FRAME_W * 2, FRAME_H, PixelFormat::Indexed8)?;
    for y in 0..FRAME_H as i32 {
        let half = FRAME_H as i32 / 2;
        let reach = FRAME_W as i32 - (y - half).abs() * 2;
        for x in 0..reach {
            bitmap.put_pixel(x, y, &[1 + (x as u8 % 9)]);
        }
        for x in 0..FRAME_W as i32 {
            let edge = x == 0 || y == 0 || x == FRAME_W as i32 - 1 || y == FRAME_H as i32 - 1;
            if edge {
                bitmap.put_pixel(FRAME_W as i32 + x, y, &[9]);
            }
        }
    }

    let palette = Palette::from_colors(
        (0..10u8).map(|i| Color::rgb(i * 28, i * 28, i * 28)).collect(),
    );
    let manifest = SpritesetManifest::from_json(&format!(
        r#"{{ "frames": [
            {{ "name": "arrow", "x": 0, "y": 0, "w": {w}, "h": {h} }},
            {{ "name": "box", "x": {w}, "y": 0, "w": {w}, "h": {h} }}
        ] }}"#,
        w = FRAME_W,
        h = FRAME_H
    ))?;
    Ok(Rc::new(Spriteset::from_manifest(bitmap, &manifest, Some(Rc::new(palette)))?))
}

fn print_ascii(fb: &Framebuffer) {
    for row in fb.pixels().chunks(fb.width()) {
        let line: String = row
            .iter()
            .map(|&argb| {
                let level = (argb & 0xFF) as usize * (SHADES.len() - 1) / 255;
                if argb == 0 { '~' } else { SHADES[level] as char }
            })
            .collect();
        println!("{}", line);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::from_json(&json).context("parsing engine config")?
        }
        None => EngineConfig { width: 72, height: 24, num_sprites: 8 },
    };

    let mut engine = SpriteEngine::new(config);
    let spriteset = build_spriteset()?;
    let flags = if cli.flip { SpriteFlags::FLIP_X } else { SpriteFlags::NONE };

    let plain = engine.get_available_sprite().context("no free sprite")?;
    engine.configure_sprite(plain, &spriteset, flags)?;
    engine.set_sprite_position(plain, -3, 2)?;

    let rotated = engine.get_available_sprite().context("no free sprite")?;
    engine.configure_sprite(rotated, &spriteset, flags)?;
    engine.set_sprite_position(rotated, 26, 8)?;
    engine.set_sprite_rotation(rotated, cli.angle)?;

    let scaled = engine.get_available_sprite().context("no free sprite")?;
    engine.configure_sprite(scaled, &spriteset, flags)?;
    engine.set_sprite_picture_by_name(scaled, "box")?;
    engine.set_sprite_position(scaled, 52, 10)?;
    engine.set_sprite_scaling(scaled, cli.scale, cli.scale)?;
    engine.set_sprite_blend_mode(scaled, BlendMode::Add)?;

    for id in [plain, rotated, scaled] {
        let sprite = engine.sprite(id)?;
        log::info!(
            "sprite {}: mode={:?} dst={:?} blitter={}",
            id,
            sprite.mode(),
            sprite.dstrect(),
            sprite.blitter().index()
        );
    }

    let mut fb = Framebuffer::for_config(engine.config());
    engine.render(&mut fb);
    print_ascii(&fb);
    Ok(())
}
