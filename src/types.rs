//! Core types for mathvis.
//!
//! These types define the foundation that everything builds on.
//! They flow through the reactive step pipeline and define what the
//! rendering backend understands.

use bitflags::bitflags;

// =============================================================================
// Points
// =============================================================================

/// A point or displacement in logical (unit) space.
///
/// Logical space is the application-defined coordinate system, independent
/// of screen resolution. Y grows upward.
pub type Point = (f64, f64);

/// A point or displacement in physical (pixel) space.
///
/// Physical space is the pixel grid of the rendering surface. Y grows
/// downward, matching screen convention.
pub type PhysPoint = (f64, f64);

/// Euclidean distance between two points.
///
/// Works in either space; callers must not mix units within one call.
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

// =============================================================================
// Rect
// =============================================================================

/// An axis-aligned rectangle in physical space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin, e.g. a viewport.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, p: PhysPoint) -> bool {
        p.0 >= self.x && p.0 <= self.right() && p.1 >= self.y && p.1 <= self.bottom()
    }

    /// Corners in clockwise order starting top-left.
    pub fn corners(&self) -> [PhysPoint; 4] {
        [
            (self.x, self.y),
            (self.right(), self.y),
            (self.right(), self.bottom()),
            (self.x, self.bottom()),
        ]
    }

    /// Edges as segments in scan order: top, right, bottom, left.
    ///
    /// Edge `i` connects `corners[i]` to `corners[(i + 1) % 4]`, so the
    /// corner shared by edges `i` and `i + 1` is `corners[(i + 1) % 4]`.
    pub fn edges(&self) -> [(PhysPoint, PhysPoint); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// The same rectangle grown by `margin` on every side.
    pub fn inflated(&self, margin: f64) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Using integers for exact comparison - no floating point epsilon needed
/// in snapshot diffing. Alpha 255 = fully opaque, 0 = fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    // Standard colors
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Check if color is fully transparent.
    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

// =============================================================================
// Line style
// =============================================================================

/// Stroke style for outline primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

// =============================================================================
// Positioning
// =============================================================================

/// How an entity's positional inputs are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    /// Positions are logical units, subject to the coordinate transform.
    #[default]
    Logical,
    /// Positions are already physical pixels.
    Physical,
}

// =============================================================================
// Capabilities
// =============================================================================

bitflags! {
    /// Interaction capabilities of an entity.
    ///
    /// Each flag mirrors membership in the corresponding scene set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Capabilities: u8 {
        /// Whole-entity drag moves its position.
        const MOVABLE = 1 << 0;
        /// Click-to-select participation.
        const SELECTABLE = 1 << 1;
        /// A sub-part (thumb) can be dragged independently.
        const STROKABLE = 1 << 2;
    }
}

// =============================================================================
// View changes
// =============================================================================

/// What kind of viewport change a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChangeKind {
    Pan,
    Zoom,
}

/// Payload delivered to view-change observers, once per pan or zoom step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewChange {
    pub kind: ViewChangeKind,
    pub scale: f64,
    pub origin: Point,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(distance((0.0, 0.0), (3.0, 4.0)), 5.0);
        assert_eq!(distance((1.0, 1.0), (1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::sized(800.0, 600.0);
        assert!(r.contains((0.0, 0.0)));
        assert!(r.contains((800.0, 600.0)));
        assert!(!r.contains((801.0, 300.0)));
        assert!(!r.contains((400.0, -1.0)));
    }

    #[test]
    fn test_rect_edges_share_corners() {
        let r = Rect::sized(10.0, 20.0);
        let c = r.corners();
        let e = r.edges();
        for i in 0..4 {
            assert_eq!(e[i].0, c[i]);
            assert_eq!(e[i].1, c[(i + 1) % 4]);
        }
    }

    #[test]
    fn test_rect_inflated() {
        let r = Rect::sized(10.0, 10.0).inflated(5.0);
        assert_eq!(r, Rect::new(-5.0, -5.0, 20.0, 20.0));
    }

    #[test]
    fn test_capabilities_flags() {
        let mut caps = Capabilities::default();
        assert!(caps.is_empty());
        caps |= Capabilities::MOVABLE;
        caps |= Capabilities::SELECTABLE;
        assert!(caps.contains(Capabilities::MOVABLE));
        assert!(!caps.contains(Capabilities::STROKABLE));
        caps.remove(Capabilities::MOVABLE);
        assert!(!caps.contains(Capabilities::MOVABLE));
    }
}
