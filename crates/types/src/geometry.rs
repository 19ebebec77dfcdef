//! Millipoint geometry. The y axis grows downwards, from the top edge of the
//! containing area.

use crate::units::Mpt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: Mpt,
    pub y: Mpt,
    pub width: Mpt,
    pub height: Mpt,
}

impl Rect {
    pub fn new(x: Mpt, y: Mpt, width: Mpt, height: Mpt) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> Mpt {
        self.x + self.width
    }

    pub fn bottom(&self) -> Mpt {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The same rectangle expressed in the coordinate system `transform` maps into.
    pub fn transformed(&self, transform: Transform) -> Rect {
        Rect {
            x: self.x + transform.dx,
            y: self.y + transform.dy,
            ..*self
        }
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: Mpt,
    pub height: Mpt,
}

impl Size {
    pub fn new(width: Mpt, height: Mpt) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: Mpt,
    pub y: Mpt,
}

/// Translation from an area's parent coordinate system to the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transform {
    pub dx: Mpt,
    pub dy: Mpt,
}

impl Transform {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn translate(dx: Mpt, dy: Mpt) -> Self {
        Self { dx, dy }
    }

    /// Composes this transform with the origin of a child rectangle.
    pub fn then(&self, origin: &Rect) -> Transform {
        Transform {
            dx: self.dx + origin.x,
            dy: self.dy + origin.y,
        }
    }

    pub fn apply(&self, point: Point) -> Point {
        Point {
            x: point.x + self.dx,
            y: point.y + self.dy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_compose_by_origin() {
        let outer = Rect::new(10_000, 20_000, 100_000, 100_000);
        let inner = Rect::new(5_000, 5_000, 10_000, 10_000);
        let t = Transform::identity().then(&outer);
        let abs = inner.transformed(t);
        assert_eq!(abs, Rect::new(15_000, 25_000, 10_000, 10_000));
        assert!(outer.contains(&abs));
        assert_eq!(t.then(&inner).apply(Point::default()), Point { x: 15_000, y: 25_000 });
    }
}
