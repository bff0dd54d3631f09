//! Tiled `.tsx` tileset loading.
//!
//! The XML is read with quick-xml's serde deserializer into a
//! [`TilesetDescriptor`]; the tiles themselves are then cut from a bitmap
//! the caller decodes (image decoding is not this crate's job).

use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;
use thiserror::Error;

use crate::assets::bitmap::{Bitmap, PixelFormat, PixelView};
use crate::assets::palette::Palette;
use crate::core::error::SpriteError;

/// Failure while loading a tileset.
#[derive(Debug, Error)]
pub enum TilesetError {
    #[error("Tileset I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed tileset: {0}")]
    Xml(#[from] quick_xml::DeError),
    /// The tileset names no `<image>` source.
    #[error("Tileset has no image source")]
    MissingImage,
    /// Tile width or height is zero.
    #[error("Invalid tile size {width}x{height}")]
    InvalidTileSize { width: usize, height: usize },
    #[error("Tileset bitmap: {0}")]
    Bitmap(#[from] SpriteError),
}

/// Per-tile gameplay attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileAttributes {
    pub tile_type: u8,
    /// Drawn in front of sprites.
    pub priority: bool,
}

/// One step of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceFrame {
    /// Tile shown during this step.
    pub index: usize,
    /// Duration in 60 Hz frames.
    pub delay: u32,
}

/// A named tile animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
    /// Tile the animation replaces.
    pub target: usize,
    pub frames: Vec<SequenceFrame>,
}

/// The animations of one tileset, looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencePack {
    sequences: Vec<Sequence>,
}

impl SequencePack {
    pub fn push(&mut self, sequence: Sequence) {
        self.sequences.push(sequence);
    }

    pub fn find(&self, name: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.iter()
    }
}

// Raw `.tsx` layout. Unknown attributes and elements are ignored.

#[derive(Debug, Deserialize)]
struct TsxTileset {
    #[serde(rename = "@tilewidth")]
    tile_width: usize,
    #[serde(rename = "@tileheight")]
    tile_height: usize,
    #[serde(rename = "@spacing", default)]
    spacing: usize,
    #[serde(rename = "@margin", default)]
    margin: usize,
    #[serde(rename = "@tilecount", default)]
    tile_count: usize,
    #[serde(default)]
    image: Option<TsxImage>,
    #[serde(default)]
    tile: Vec<TsxTile>,
}

#[derive(Debug, Deserialize)]
struct TsxImage {
    #[serde(rename = "@source")]
    source: String,
}

#[derive(Debug, Deserialize)]
struct TsxTile {
    #[serde(rename = "@id")]
    id: usize,
    #[serde(default)]
    properties: Option<TsxProperties>,
    #[serde(default)]
    animation: Option<TsxAnimation>,
}

#[derive(Debug, Deserialize)]
struct TsxProperties {
    #[serde(default)]
    property: Vec<TsxProperty>,
}

#[derive(Debug, Deserialize)]
struct TsxProperty {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@value", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct TsxAnimation {
    #[serde(default)]
    frame: Vec<TsxFrame>,
}

#[derive(Debug, Deserialize)]
struct TsxFrame {
    #[serde(rename = "@tileid")]
    tile_id: usize,
    #[serde(rename = "@duration")]
    duration: u32,
}

/// Everything a `.tsx` file says about a tileset, before any pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetDescriptor {
    pub tile_width: usize,
    pub tile_height: usize,
    pub spacing: usize,
    pub margin: usize,
    /// Image path as written in the file.
    pub image_source: String,
    /// Attributes indexed by tile id, `tilecount` entries.
    pub attributes: Vec<TileAttributes>,
    pub sequences: SequencePack,
}

impl TilesetDescriptor {
    pub fn from_tsx(xml: &str) -> Result<Self, TilesetError> {
        let raw: TsxTileset = quick_xml::de::from_str(xml)?;
        let image_source = raw
            .image
            .map(|i| i.source)
            .filter(|s| !s.is_empty())
            .ok_or(TilesetError::MissingImage)?;
        if raw.tile_width == 0 || raw.tile_height == 0 {
            return Err(TilesetError::InvalidTileSize {
                width: raw.tile_width,
                height: raw.tile_height,
            });
        }

        let mut attributes = vec![TileAttributes::default(); raw.tile_count];
        let mut sequences = SequencePack::default();
        for tile in &raw.tile {
            if let Some(props) = &tile.properties {
                match attributes.get_mut(tile.id) {
                    Some(attr) => apply_properties(attr, tile.id, &props.property),
                    None => log::warn!(
                        "tile {} has properties but tilecount is {}",
                        tile.id,
                        raw.tile_count
                    ),
                }
            }
            if let Some(anim) = &tile.animation {
                sequences.push(Sequence {
                    name: tile.id.to_string(),
                    target: tile.id,
                    frames: anim
                        .frame
                        .iter()
                        .map(|f| SequenceFrame {
                            index: f.tile_id,
                            delay: (f.duration as u64 * 60 / 1000) as u32,
                        })
                        .collect(),
                });
            }
        }

        Ok(Self {
            tile_width: raw.tile_width,
            tile_height: raw.tile_height,
            spacing: raw.spacing,
            margin: raw.margin,
            image_source,
            attributes,
            sequences,
        })
    }

    /// Tiles per row and per column that fit in a `width × height` image.
    pub fn grid_size(&self, width: usize, height: usize) -> (usize, usize) {
        let fit = |extent: usize, tile: usize| {
            (extent + self.spacing).saturating_sub(self.margin * 2) / (tile + self.spacing)
        };
        (fit(width, self.tile_width), fit(height, self.tile_height))
    }
}

fn apply_properties(attr: &mut TileAttributes, id: usize, props: &[TsxProperty]) {
    for prop in props {
        if prop.name.eq_ignore_ascii_case("type") {
            match prop.value.trim().parse() {
                Ok(v) => attr.tile_type = v,
                Err(_) => log::warn!("tile {}: unparseable type '{}'", id, prop.value),
            }
        } else if prop.name.eq_ignore_ascii_case("priority") {
            attr.priority = prop.value.trim().eq_ignore_ascii_case("true");
        }
    }
}

/// Decoded tileset image handed back by the caller's image loader.
#[derive(Debug)]
pub struct TilesetImage {
    pub bitmap: Bitmap,
    pub palette: Option<Palette>,
}

/// Tiles cut from an image, stacked vertically in one bitmap.
///
/// Tile ids start at 1; id 0 is the empty tile.
#[derive(Debug)]
pub struct Tileset {
    tile_width: usize,
    tile_height: usize,
    count: usize,
    tiles: Bitmap,
    palette: Option<Rc<Palette>>,
    attributes: Vec<TileAttributes>,
    sequences: SequencePack,
}

impl Tileset {
    /// Cut the tiles described by `desc` out of `image`.
    pub fn from_descriptor(desc: TilesetDescriptor, image: TilesetImage) -> Result<Self, TilesetError> {
        let (tw, th) = (desc.tile_width, desc.tile_height);
        let (htiles, vtiles) = desc.grid_size(image.bitmap.width(), image.bitmap.height());
        let count = htiles * vtiles;
        let format = image.bitmap.format();
        let mut tiles = Bitmap::new(tw, th * (count + 1), format)?;

        let (dx, dy) = (tw + desc.spacing, th + desc.spacing);
        let mut id = 1;
        for ty in 0..vtiles {
            for tx in 0..htiles {
                let view = image
                    .bitmap
                    .view(desc.margin + tx * dx, desc.margin + ty * dy, tw, th)
                    .ok_or(SpriteError::InvalidReference("tileset image"))?;
                copy_tile(&mut tiles, id * th, &image.bitmap, &view);
                id += 1;
            }
        }

        log::debug!(
            "tileset: {} tiles of {}x{} ({} sequences)",
            count,
            tw,
            th,
            desc.sequences.len()
        );
        Ok(Self {
            tile_width: tw,
            tile_height: th,
            count,
            tiles,
            palette: image.palette.map(Rc::new),
            attributes: desc.attributes,
            sequences: desc.sequences,
        })
    }

    /// Load a `.tsx` file. The image it names is resolved relative to the
    /// file and decoded by `load_image`.
    pub fn load<F>(path: impl AsRef<Path>, load_image: F) -> Result<Self, TilesetError>
    where
        F: FnOnce(&Path) -> Result<TilesetImage, TilesetError>,
    {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let desc = TilesetDescriptor::from_tsx(&xml)?;
        let image_path: PathBuf = match path.parent() {
            Some(dir) => dir.join(&desc.image_source),
            None => PathBuf::from(&desc.image_source),
        };
        log::debug!("loading tileset {} (image {})", path.display(), image_path.display());
        let image = load_image(&image_path)?;
        Self::from_descriptor(desc, image)
    }

    pub fn tile_width(&self) -> usize {
        self.tile_width
    }

    pub fn tile_height(&self) -> usize {
        self.tile_height
    }

    /// Number of real tiles (not counting the empty tile 0).
    pub fn tile_count(&self) -> usize {
        self.count
    }

    pub fn format(&self) -> PixelFormat {
        self.tiles.format()
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.tiles
    }

    /// Pixels of tile `id`, `None` past the last tile.
    pub fn tile_view(&self, id: usize) -> Option<PixelView> {
        if id > self.count {
            return None;
        }
        self.tiles.view(0, id * self.tile_height, self.tile_width, self.tile_height)
    }

    pub fn palette(&self) -> Option<&Rc<Palette>> {
        self.palette.as_ref()
    }

    /// Attributes of the tile at zero-based position `index` in the file.
    pub fn attributes(&self, index: usize) -> TileAttributes {
        self.attributes.get(index).copied().unwrap_or_default()
    }

    pub fn sequences(&self) -> &SequencePack {
        &self.sequences
    }
}

fn copy_tile(tiles: &mut Bitmap, first_row: usize, src: &Bitmap, view: &PixelView) {
    for row in 0..view.height {
        let (Some(from), Some(to)) = (src.view_row(view, row), tiles.row_mut(first_row + row)) else {
            return;
        };
        to.copy_from_slice(from);
    }
}
