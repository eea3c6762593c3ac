use glam::{vec2, Vec2};

/// A rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Rect {
    /// The position of the top-left corner
    /// of this rectangle.
    pub pos: Vec2,
    /// The side lengths of this rectangle.
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Creates a rectangle from its left, top, right and bottom edges.
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            pos: vec2(left, top),
            size: vec2(right - left, bottom - top),
        }
    }

    pub fn offset(self, offset: Vec2) -> Self {
        Self {
            pos: self.pos + offset,
            size: self.size,
        }
    }

    pub fn contains(self, pos: Vec2) -> bool {
        pos.x >= self.pos.x
            && pos.y >= self.pos.y
            && pos.x < (self.pos.x + self.size.x)
            && pos.y < (self.pos.y + self.size.y)
    }

    pub fn is_empty(self) -> bool {
        self.size.x <= 0. || self.size.y <= 0.
    }

    /// Returns `None` for empty or non-finite rectangles.
    pub(crate) fn to_skia(self) -> Option<tiny_skia::Rect> {
        if self.is_empty() {
            return None;
        }
        tiny_skia::Rect::from_xywh(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ltrb() {
        let rect = Rect::from_ltrb(1., 2., 4., 8.);
        assert_eq!(rect.pos, vec2(1., 2.));
        assert_eq!(rect.size, vec2(3., 6.));
        assert!(rect.contains(vec2(1., 2.)));
        assert!(!rect.contains(vec2(4., 2.)));
    }

    #[test]
    fn empty_rects_have_no_skia_rect() {
        assert!(Rect::from_ltrb(5., 5., 5., 10.).to_skia().is_none());
        assert!(Rect::from_ltrb(5., 5., 2., 10.).to_skia().is_none());
        assert!(Rect::from_ltrb(0., 0., 2., 2.).to_skia().is_some());
    }
}
