pub mod bitmap;
pub mod manifest;
pub mod palette;
pub mod spriteset;
#[cfg(feature = "tileset")]
pub mod tileset;
