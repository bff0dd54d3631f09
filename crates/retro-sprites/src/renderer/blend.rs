//! Per-channel blend lookup tables.
//!
//! A table maps `(src, dst)` channel pairs to the blended channel value:
//! `table[(src << 8) | dst]`. Building them once per engine keeps the
//! per-pixel cost to three lookups.

use std::rc::Rc;

use crate::core::error::SpriteError;

/// Blend mode of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Opaque: source pixels replace the destination.
    #[default]
    None,
    /// 25% source, 75% destination.
    Mix25,
    /// Even mix of source and destination.
    Mix50,
    /// 75% source, 25% destination.
    Mix75,
    /// Saturating addition.
    Add,
    /// Destination minus source, clamped at zero.
    Sub,
    /// Multiplicative modulation.
    Mod,
    /// Caller-supplied table.
    Custom,
}

impl BlendMode {
    /// Built-in modes that own a table.
    pub const BUILTIN: [BlendMode; 6] = [
        BlendMode::Mix25,
        BlendMode::Mix50,
        BlendMode::Mix75,
        BlendMode::Add,
        BlendMode::Sub,
        BlendMode::Mod,
    ];

    fn apply(self, src: u8, dst: u8) -> u8 {
        let (s, d) = (src as u32, dst as u32);
        let v = match self {
            BlendMode::None | BlendMode::Custom => s,
            BlendMode::Mix25 => (s + 3 * d) / 4,
            BlendMode::Mix50 => (s + d) / 2,
            BlendMode::Mix75 => (3 * s + d) / 4,
            BlendMode::Add => (s + d).min(255),
            BlendMode::Sub => d.saturating_sub(s),
            BlendMode::Mod => s * d / 255,
        };
        v as u8
    }
}

/// 64 KiB channel lookup table.
#[derive(Clone, PartialEq, Eq)]
pub struct BlendTable {
    data: Box<[u8]>,
}

impl BlendTable {
    pub const SIZE: usize = 256 * 256;

    /// Table for a built-in mode.
    pub fn for_mode(mode: BlendMode) -> Self {
        Self::from_fn(|s, d| mode.apply(s, d))
    }

    /// Table computed from an arbitrary channel function.
    pub fn from_fn(f: impl Fn(u8, u8) -> u8) -> Self {
        let mut data = vec![0u8; Self::SIZE].into_boxed_slice();
        for s in 0..=255u8 {
            for d in 0..=255u8 {
                data[(s as usize) << 8 | d as usize] = f(s, d);
            }
        }
        Self { data }
    }

    #[inline]
    pub fn blend(&self, src: u8, dst: u8) -> u8 {
        self.data[(src as usize) << 8 | dst as usize]
    }

    /// Blend two `0xAARRGGBB` pixels channel by channel; the result is opaque.
    #[inline]
    pub fn blend_argb(&self, src: u32, dst: u32) -> u32 {
        let r = self.blend((src >> 16) as u8, (dst >> 16) as u8) as u32;
        let g = self.blend((src >> 8) as u8, (dst >> 8) as u8) as u32;
        let b = self.blend(src as u8, dst as u8) as u32;
        0xFF00_0000 | r << 16 | g << 8 | b
    }
}

impl std::fmt::Debug for BlendTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlendTable").field("len", &self.data.len()).finish()
    }
}

/// Shared tables for every mode, owned by the engine.
#[derive(Debug)]
pub struct BlendTables {
    builtin: Vec<(BlendMode, Rc<BlendTable>)>,
    custom: Option<Rc<BlendTable>>,
}

impl BlendTables {
    pub fn new() -> Self {
        Self {
            builtin: BlendMode::BUILTIN
                .iter()
                .map(|&m| (m, Rc::new(BlendTable::for_mode(m))))
                .collect(),
            custom: None,
        }
    }

    pub fn set_custom(&mut self, table: BlendTable) {
        self.custom = Some(Rc::new(table));
    }

    /// Table for `mode`, `None` meaning opaque. Fails for `Custom` until a
    /// custom table is installed.
    pub fn get(&self, mode: BlendMode) -> Result<Option<Rc<BlendTable>>, SpriteError> {
        match mode {
            BlendMode::None => Ok(None),
            BlendMode::Custom => self
                .custom
                .clone()
                .map(Some)
                .ok_or(SpriteError::InvalidReference("custom blend table")),
            _ => Ok(self
                .builtin
                .iter()
                .find(|(m, _)| *m == mode)
                .map(|(_, t)| Rc::clone(t))),
        }
    }
}

impl Default for BlendTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix50_averages() {
        let t = BlendTable::for_mode(BlendMode::Mix50);
        assert_eq!(t.blend(200, 100), 150);
        assert_eq!(t.blend(0, 255), 127);
    }

    #[test]
    fn add_and_sub_saturate() {
        let add = BlendTable::for_mode(BlendMode::Add);
        let sub = BlendTable::for_mode(BlendMode::Sub);
        assert_eq!(add.blend(200, 100), 255);
        assert_eq!(sub.blend(200, 100), 0);
        assert_eq!(sub.blend(50, 100), 50);
    }

    #[test]
    fn blend_argb_per_channel() {
        let t = BlendTable::for_mode(BlendMode::Mix50);
        assert_eq!(t.blend_argb(0xFF20_4060, 0xFF00_0000), 0xFF10_2030);
    }

    #[test]
    fn custom_requires_table() {
        let mut tables = BlendTables::new();
        assert!(tables.get(BlendMode::Custom).is_err());
        tables.set_custom(BlendTable::from_fn(|s, _| s ^ 0xFF));
        let t = tables.get(BlendMode::Custom).unwrap().unwrap();
        assert_eq!(t.blend(0, 7), 0xFF);
    }

    #[test]
    fn none_is_opaque() {
        let tables = BlendTables::new();
        assert!(tables.get(BlendMode::None).unwrap().is_none());
        assert!(tables.get(BlendMode::Mod).unwrap().is_some());
    }
}
