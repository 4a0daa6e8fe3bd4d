//! CoordinateSpace - logical ↔ physical transform.
//!
//! Stateless math over three pieces of state: `scale` (pixels per logical
//! unit), `origin` (the logical point mapped to the viewport center), and
//! the attached viewport size. Logical Y grows upward, physical Y grows
//! downward, so every transform inverts Y.
//!
//! # API
//!
//! - `logical_to_physical` / `physical_to_logical` - point transforms
//! - `translate_logical_to_physical` / `translate_physical_to_logical` -
//!   displacement transforms (scale only, no origin offset)
//! - `pan_by` - shift the origin by a physical drag delta
//! - `zoom_by_wheel` - multiply the scale by a clamped wheel factor
//!
//! Point transforms before a viewport is attached return the input
//! unchanged. This is a deliberate soft fallback so entities can be
//! constructed headless, before the interaction surface exists.

use crate::types::{PhysPoint, Point};

/// Raw wheel factor clamp bounds: one event never zooms more than ±20%.
const ZOOM_FACTOR_MIN: f64 = 0.8;
const ZOOM_FACTOR_MAX: f64 = 1.2;

// =============================================================================
// CoordinateSpace
// =============================================================================

/// Bidirectional transform between logical units and physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSpace {
    scale: f64,
    origin: Point,
    viewport: Option<(f64, f64)>,
}

impl Default for CoordinateSpace {
    fn default() -> Self {
        Self {
            scale: 1.0,
            origin: (0.0, 0.0),
            viewport: None,
        }
    }
}

impl CoordinateSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or resize) the viewport, in physical pixels.
    pub fn attach_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Some((width, height));
    }

    /// Detach the viewport, returning to the headless pass-through state.
    pub fn detach_viewport(&mut self) {
        self.viewport = None;
    }

    pub fn viewport(&self) -> Option<(f64, f64)> {
        self.viewport
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale. Must be positive; non-positive values are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if scale > 0.0 {
            self.scale = scale;
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    // -------------------------------------------------------------------------
    // Point transforms
    // -------------------------------------------------------------------------

    /// Map a logical point to physical pixels.
    ///
    /// `x' = (x - ox) * scale + w/2`, `y' = h/2 - (y - oy) * scale`.
    /// Headless fallback: returns `p` unchanged when no viewport is attached.
    pub fn logical_to_physical(&self, p: Point) -> PhysPoint {
        let Some((w, h)) = self.viewport else {
            return p;
        };
        (
            (p.0 - self.origin.0) * self.scale + w / 2.0,
            h / 2.0 - (p.1 - self.origin.1) * self.scale,
        )
    }

    /// Exact inverse of [`logical_to_physical`](Self::logical_to_physical).
    pub fn physical_to_logical(&self, p: PhysPoint) -> Point {
        let Some((w, h)) = self.viewport else {
            return p;
        };
        (
            (p.0 - w / 2.0) / self.scale + self.origin.0,
            (h / 2.0 - p.1) / self.scale + self.origin.1,
        )
    }

    // -------------------------------------------------------------------------
    // Displacement transforms
    // -------------------------------------------------------------------------

    /// Scale a logical displacement into physical pixels.
    ///
    /// No origin offset: displacements (drag deltas) must not move with the
    /// viewport origin.
    pub fn translate_logical_to_physical(&self, d: Point) -> PhysPoint {
        (d.0 * self.scale, -d.1 * self.scale)
    }

    /// Scale a physical displacement into logical units.
    pub fn translate_physical_to_logical(&self, d: PhysPoint) -> Point {
        (d.0 / self.scale, -d.1 / self.scale)
    }

    // -------------------------------------------------------------------------
    // Viewport gestures
    // -------------------------------------------------------------------------

    /// Pan the view by a physical drag delta.
    ///
    /// Dragging the background moves the content with the pointer, so the
    /// origin moves against the delta.
    pub fn pan_by(&mut self, delta: PhysPoint) {
        let d = self.translate_physical_to_logical(delta);
        self.origin = (self.origin.0 - d.0, self.origin.1 - d.1);
    }

    /// Zoom by a raw wheel delta. Returns the factor actually applied.
    ///
    /// The raw factor is `1 + delta/100` (one ±100-unit tick maps to ±20%),
    /// clamped so a single oversized event cannot run the zoom away.
    pub fn zoom_by_wheel(&mut self, wheel_delta: f64) -> f64 {
        let factor = (1.0 + wheel_delta / 100.0).clamp(ZOOM_FACTOR_MIN, ZOOM_FACTOR_MAX);
        self.scale *= factor;
        factor
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn space_800x600() -> CoordinateSpace {
        let mut space = CoordinateSpace::new();
        space.attach_viewport(800.0, 600.0);
        space.set_scale(200.0);
        space.set_origin((0.0, 0.0));
        space
    }

    #[test]
    fn test_logical_to_physical_concrete() {
        // (0, 1) at scale 200, origin (0, 0), viewport 800x600 → (400, 100)
        let space = space_800x600();
        assert_eq!(space.logical_to_physical((0.0, 1.0)), (400.0, 100.0));
        assert_eq!(space.logical_to_physical((0.0, 0.0)), (400.0, 300.0));
        assert_eq!(space.logical_to_physical((1.0, 0.0)), (600.0, 300.0));
    }

    #[test]
    fn test_round_trip_law() {
        let mut space = space_800x600();
        space.set_origin((0.7, -2.3));
        space.set_scale(137.5);
        for p in [(0.0, 0.0), (12.5, -88.25), (-3.0, 4.0), (400.0, 300.0)] {
            let back = space.physical_to_logical(space.logical_to_physical(p));
            assert!((back.0 - p.0).abs() < 1e-9);
            assert!((back.1 - p.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_headless_passthrough() {
        let space = CoordinateSpace::new();
        assert_eq!(space.logical_to_physical((3.0, 4.0)), (3.0, 4.0));
        assert_eq!(space.physical_to_logical((3.0, 4.0)), (3.0, 4.0));
    }

    #[test]
    fn test_displacement_ignores_origin() {
        let mut space = space_800x600();
        space.set_origin((100.0, -50.0));
        // Displacements depend only on scale and the Y flip.
        assert_eq!(space.translate_logical_to_physical((1.0, 1.0)), (200.0, -200.0));
        assert_eq!(space.translate_physical_to_logical((200.0, -200.0)), (1.0, 1.0));
    }

    #[test]
    fn test_pan_moves_origin_against_delta() {
        let mut space = space_800x600();
        space.pan_by((200.0, 0.0));
        assert_eq!(space.origin(), (-1.0, 0.0));
        // Physical drag down is logical -Y, so the origin moves up.
        space.set_origin((0.0, 0.0));
        space.pan_by((0.0, 200.0));
        assert_eq!(space.origin(), (0.0, 1.0));
    }

    #[test]
    fn test_zoom_factor_clamped() {
        let mut space = space_800x600();
        assert_eq!(space.zoom_by_wheel(10.0), 1.1);
        assert!((space.scale() - 220.0).abs() < 1e-9);

        // One oversized event is clamped to ±20%.
        let mut space = space_800x600();
        assert_eq!(space.zoom_by_wheel(500.0), 1.2);
        let mut space = space_800x600();
        assert_eq!(space.zoom_by_wheel(-500.0), 0.8);
    }

    #[test]
    fn test_set_scale_rejects_non_positive() {
        let mut space = space_800x600();
        space.set_scale(0.0);
        assert_eq!(space.scale(), 200.0);
        space.set_scale(-5.0);
        assert_eq!(space.scale(), 200.0);
    }
}
