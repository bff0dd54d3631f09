use crate::core::fixed::Fix;

/// Axis-aligned half-open rectangle `[x1, x2) × [y1, y2)`.
///
/// Destination rectangles use `Rect<i32>` (screen pixels); source
/// rectangles use `Rect<Fix>` so that scaled sprites can carry fractional
/// source edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect<T = i32> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T> Rect<T> {
    pub const fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl Rect<i32> {
    /// Rectangle from an origin and a size.
    pub const fn from_size(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, x.saturating_add(w), y.saturating_add(h))
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// True when the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// True when `other` lies entirely inside `self` (empty rectangles
    /// count as inside when their corner does).
    pub fn contains_rect(&self, other: &Rect<i32>) -> bool {
        other.x1 >= self.x1
            && other.y1 >= self.y1
            && other.x2 <= self.x2
            && other.y2 <= self.y2
            && other.x1 <= other.x2
            && other.y1 <= other.y2
    }

    /// Whether scanline `y` crosses this rectangle.
    pub fn covers_line(&self, y: i32) -> bool {
        y >= self.y1 && y < self.y2
    }

    /// Promote every edge to fixed point.
    pub fn to_fix(self) -> Rect<Fix> {
        Rect::new(
            Fix::from_int(self.x1),
            Fix::from_int(self.y1),
            Fix::from_int(self.x2),
            Fix::from_int(self.y2),
        )
    }
}

impl Rect<Fix> {
    pub fn width(&self) -> Fix {
        self.x2 - self.x1
    }

    pub fn height(&self) -> Fix {
        self.y2 - self.y1
    }

    /// Integer part of every edge.
    pub fn to_int(self) -> Rect<i32> {
        Rect::new(self.x1.to_int(), self.y1.to_int(), self.x2.to_int(), self.y2.to_int())
    }
}
