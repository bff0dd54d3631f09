use bitflags::bitflags;

bitflags! {
    /// Per-sprite flag bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpriteFlags: u16 {
        /// Mirror horizontally.
        const FLIP_X = 0x8000;
        /// Mirror vertically.
        const FLIP_Y = 0x4000;
    }
}

impl SpriteFlags {
    pub const NONE: SpriteFlags = SpriteFlags::empty();

    pub const fn flip_x(self) -> bool {
        self.contains(Self::FLIP_X)
    }

    pub const fn flip_y(self) -> bool {
        self.contains(Self::FLIP_Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_combination() {
        let f = SpriteFlags::FLIP_X | SpriteFlags::FLIP_Y;
        assert!(f.flip_x());
        assert!(f.flip_y());
        assert!(!SpriteFlags::NONE.flip_x());
        assert_eq!(f & SpriteFlags::FLIP_Y, SpriteFlags::FLIP_Y);
    }

    #[test]
    fn raw_bits_round_trip_and_unknown_bits_drop() {
        assert_eq!(SpriteFlags::FLIP_X.bits(), 0x8000);
        assert_eq!(SpriteFlags::from_bits_truncate(0xC001), SpriteFlags::all());
        assert_eq!(SpriteFlags::from_bits(0x0001), None);
        assert_eq!(SpriteFlags::default(), SpriteFlags::NONE);
    }
}
