//! Canvas geometry primitives.
//!
//! Coordinates are pixels with the origin at the top-left of the canvas.
//! All clamping helpers resolve a min/max conflict in favor of the minimum so
//! that degenerate containers still produce finite, positive geometry.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self { Self { width, height } }

    pub fn is_degenerate(&self) -> bool { self.width <= 0.0 || self.height <= 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 { self.x + self.width }

    pub fn max_y(&self) -> f64 { self.y + self.height }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap; rectangles that merely share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    pub fn round(self) -> Self {
        Self {
            x: self.x.round(),
            y: self.y.round(),
            width: self.width.round(),
            height: self.height.round(),
        }
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    pub fn at(self, x: f64, y: f64) -> Self { Self { x, y, ..self } }

    pub fn with_size(self, size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            ..self
        }
    }
}

/// Clamp a dimension between `min` and `max`. When the container cannot offer
/// `min` (i.e. `max < min`), the minimum wins so the result stays usable.
pub fn clamp_dim(preferred: f64, min: f64, max: f64) -> f64 {
    preferred.max(min).min(max.max(min))
}

/// Clamp a coordinate to `[min, max]`, with the minimum winning when the
/// interval is inverted.
pub fn clamp_pos(value: f64, min: f64, max: f64) -> f64 { value.min(max.max(min)).max(min) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.max_x(), 110.0);
        assert_eq!(r.max_y(), 70.0);
    }

    #[test]
    fn test_intersects_overlapping() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_intersects_disjoint() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(200.0, 0.0, 100.0, 100.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(100.0, 0.0, 100.0, 100.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_contains_point() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains_point(Point::new(10.0, 10.0)));
        assert!(r.contains_point(Point::new(29.9, 29.9)));
        assert!(!r.contains_point(Point::new(30.0, 30.0)));
    }

    #[test]
    fn test_clamp_dim_prefers_min_on_inverted_range() {
        assert_eq!(clamp_dim(420.0, 320.0, 576.0), 420.0);
        assert_eq!(clamp_dim(420.0, 320.0, 100.0), 320.0);
        assert_eq!(clamp_dim(420.0, 320.0, -50.0), 320.0);
        assert_eq!(clamp_dim(100.0, 320.0, 576.0), 320.0);
    }

    #[test]
    fn test_clamp_pos_prefers_min_on_inverted_range() {
        assert_eq!(clamp_pos(48.0, 32.0, 248.0), 48.0);
        assert_eq!(clamp_pos(500.0, 32.0, 248.0), 248.0);
        assert_eq!(clamp_pos(100.0, 32.0, -10.0), 32.0);
    }

    #[test]
    fn test_degenerate_size() {
        assert!(Size::new(0.0, 100.0).is_degenerate());
        assert!(Size::new(100.0, -1.0).is_degenerate());
        assert!(!Size::new(1.0, 1.0).is_degenerate());
    }
}
