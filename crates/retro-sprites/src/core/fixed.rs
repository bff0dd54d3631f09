//! 16.16 fixed-point scalars and vectors for incremental scan math.
//!
//! All per-pixel stepping (scaled blits, rotation splats) accumulates in
//! this representation so that long runs of additions never drift the way
//! repeated float additions do.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use glam::{IVec2, Vec2};

/// Number of fractional bits in a [`Fix`].
pub const FIX_BITS: u32 = 16;

/// Fixed-point 16.16 number.
///
/// Upper 16 bits are the integer part, lower 16 bits are fractional, so
/// only integers in `[-32768, 32767]` are representable. [`Fix::from_int`]
/// wraps outside that range; frame sizes are bounded by [`Fix::MAX_INT`]
/// when a spriteset is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Fix(pub i32);

impl Fix {
    pub const ZERO: Fix = Fix(0);
    pub const ONE: Fix = Fix(1 << FIX_BITS);
    pub const HALF: Fix = Fix(1 << (FIX_BITS - 1));
    /// Largest integer part.
    pub const MAX_INT: i32 = i32::MAX >> FIX_BITS;

    /// Promote an integer, or `None` if it does not fit the integer part.
    #[inline]
    pub const fn checked_from_int(n: i32) -> Option<Self> {
        if n > Self::MAX_INT || n < -Self::MAX_INT - 1 {
            None
        } else {
            Some(Fix(n << FIX_BITS))
        }
    }

    /// Promote an integer. Wraps outside `[-32768, 32767]`.
    #[inline]
    pub const fn from_int(n: i32) -> Self {
        Fix(n << FIX_BITS)
    }

    /// Convert a float, truncating toward zero in the last fractional bit.
    #[inline]
    pub fn from_f32(v: f32) -> Self {
        Fix((v * Self::ONE.0 as f32) as i32)
    }

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Fix(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Integer part, rounded toward negative infinity (arithmetic shift).
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> FIX_BITS
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / Self::ONE.0 as f32
    }

    /// Multiply two fixed values.
    #[inline]
    pub fn mul_fix(self, other: Fix) -> Fix {
        Fix(((self.0 as i64 * other.0 as i64) >> FIX_BITS) as i32)
    }

    /// Divide two fixed values. Returns zero for a zero divisor.
    #[inline]
    pub fn div_fix(self, other: Fix) -> Fix {
        if other.0 == 0 {
            return Fix::ZERO;
        }
        Fix((((self.0 as i64) << FIX_BITS) / other.0 as i64) as i32)
    }
}

impl Add for Fix {
    type Output = Fix;
    #[inline]
    fn add(self, other: Fix) -> Fix {
        Fix(self.0 + other.0)
    }
}

impl Sub for Fix {
    type Output = Fix;
    #[inline]
    fn sub(self, other: Fix) -> Fix {
        Fix(self.0 - other.0)
    }
}

impl AddAssign for Fix {
    #[inline]
    fn add_assign(&mut self, other: Fix) {
        self.0 += other.0;
    }
}

impl SubAssign for Fix {
    #[inline]
    fn sub_assign(&mut self, other: Fix) {
        self.0 -= other.0;
    }
}

impl Neg for Fix {
    type Output = Fix;
    #[inline]
    fn neg(self) -> Fix {
        Fix(-self.0)
    }
}

/// Scale by a whole number of pixels.
impl Mul<i32> for Fix {
    type Output = Fix;
    #[inline]
    fn mul(self, n: i32) -> Fix {
        Fix(self.0 * n)
    }
}

/// Split into `n` equal steps; integer division truncates toward zero.
impl Div<i32> for Fix {
    type Output = Fix;
    #[inline]
    fn div(self, n: i32) -> Fix {
        Fix(self.0 / n)
    }
}

/// 2D point or displacement with [`Fix`] components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixVec2 {
    pub x: Fix,
    pub y: Fix,
}

impl FixVec2 {
    pub const ZERO: FixVec2 = FixVec2 { x: Fix::ZERO, y: Fix::ZERO };
    pub const ONE: FixVec2 = FixVec2 { x: Fix::ONE, y: Fix::ONE };

    #[inline]
    pub const fn new(x: Fix, y: Fix) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn from_ivec2(v: IVec2) -> Self {
        Self::new(Fix::from_int(v.x), Fix::from_int(v.y))
    }

    #[inline]
    pub fn from_vec2(v: Vec2) -> Self {
        Self::new(Fix::from_f32(v.x), Fix::from_f32(v.y))
    }

    /// Integer coordinates (floor of each component).
    #[inline]
    pub fn to_ivec2(self) -> IVec2 {
        IVec2::new(self.x.to_int(), self.y.to_int())
    }
}

impl Add for FixVec2 {
    type Output = FixVec2;
    #[inline]
    fn add(self, other: FixVec2) -> FixVec2 {
        FixVec2::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for FixVec2 {
    #[inline]
    fn add_assign(&mut self, other: FixVec2) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// A position that advances by a constant step, used to walk one edge of
/// a quad in `len` equal increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanVector {
    pub pos: FixVec2,
    pub step: FixVec2,
}

impl ScanVector {
    /// Start at `from` and reach `to` after `len` advances.
    ///
    /// `len` must be positive; a zero `len` yields a stationary vector.
    pub fn between(from: IVec2, to: IVec2, len: i32) -> Self {
        let delta = FixVec2::from_ivec2(to - from);
        let step = if len > 0 {
            FixVec2::new(delta.x / len, delta.y / len)
        } else {
            FixVec2::ZERO
        };
        Self {
            pos: FixVec2::from_ivec2(from),
            step,
        }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.pos += self.step;
    }

    /// Current position as integer pixel coordinates.
    #[inline]
    pub fn pixel(&self) -> IVec2 {
        self.pos.to_ivec2()
    }
}
