//! Built-in shape kinds: disc, segment, label.
//!
//! These are the primitive plumbing kinds, not widgets. Each one is a thin
//! `Behavior`: the reactive machinery all lives in the entity core.

use crate::backend::Primitive;
use crate::geometry;
use crate::types::{distance, PhysPoint, Rect};

use super::behavior::{Behavior, Frame};

/// Extra pixels of forgiveness when hit-testing thin geometry.
const PICK_SLACK: f64 = 3.0;

// =============================================================================
// Disc
// =============================================================================

/// A filled/stroked circle at `pos` with a reactive `radius`.
///
/// Degenerates to an invisible zero-radius circle when fully off-viewport
/// and to a clipped polygon when the physical radius exceeds twice the
/// viewport width.
pub struct Disc;

impl Behavior for Disc {
    fn kind(&self) -> &'static str {
        "disc"
    }

    fn positional_params(&self) -> &'static [&'static str] {
        &["pos"]
    }

    fn value_params(&self) -> &'static [&'static str] {
        &["radius"]
    }

    fn build(&self, frame: &Frame<'_>) -> Primitive {
        let center = frame.position(0);
        let radius = frame.length_to_physical(frame.scalar(0));
        let circle = |radius| Primitive::Circle {
            radius,
            color: frame.style.color,
            stroke: frame.style.width,
            style: frame.style.style,
        };

        let Some((w, h)) = frame.viewport else {
            return circle(radius);
        };
        let viewport = Rect::sized(w, h);
        if geometry::circle_outside_viewport(center, radius, viewport) {
            // Nothing visible; the backend treats a degenerate circle as
            // invisible.
            return circle(0.0);
        }
        if geometry::needs_polygon(radius, viewport) {
            if let Some(points) = geometry::clip_circle(center, radius, viewport) {
                return Primitive::Polygon {
                    points,
                    color: frame.style.color,
                    stroke: frame.style.width,
                    style: frame.style.style,
                };
            }
        }
        circle(radius)
    }

    fn hit_test(&self, frame: &Frame<'_>, point: PhysPoint, _size: (f64, f64)) -> bool {
        let radius = frame.length_to_physical(frame.scalar(0));
        distance(point, frame.position(0)) <= radius
    }
}

// =============================================================================
// Segment
// =============================================================================

/// A line from `pos` to `end`, hit-tested by distance to the segment.
pub struct Segment;

impl Behavior for Segment {
    fn kind(&self) -> &'static str {
        "segment"
    }

    fn positional_params(&self) -> &'static [&'static str] {
        &["pos", "end"]
    }

    fn build(&self, frame: &Frame<'_>) -> Primitive {
        let from = frame.position(0);
        let to = frame.position(1);
        Primitive::Line {
            // Drawables are origin-relative; the anchor supplies `from`.
            to: (to.0 - from.0, to.1 - from.1),
            color: frame.style.color,
            stroke: frame.style.width,
            style: frame.style.style,
        }
    }

    fn hit_test(&self, frame: &Frame<'_>, point: PhysPoint, _size: (f64, f64)) -> bool {
        let slack = frame.style.width / 2.0 + PICK_SLACK;
        point_segment_distance(point, frame.position(0), frame.position(1)) <= slack
    }
}

/// Distance from `p` to the closed segment `a`-`b`.
fn point_segment_distance(p: PhysPoint, a: PhysPoint, b: PhysPoint) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return distance(p, a);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
    distance(p, (a.0 + t * dx, a.1 + t * dy))
}

// =============================================================================
// Label
// =============================================================================

/// A text label anchored at `pos`, hit-tested against the backend-measured
/// text box.
pub struct Label;

impl Behavior for Label {
    fn kind(&self) -> &'static str {
        "label"
    }

    fn positional_params(&self) -> &'static [&'static str] {
        &["pos"]
    }

    fn value_params(&self) -> &'static [&'static str] {
        &["text"]
    }

    fn build(&self, frame: &Frame<'_>) -> Primitive {
        Primitive::Text {
            content: frame.text(0).to_string(),
            size: frame.style.size,
            color: frame.style.color,
        }
    }

    fn hit_test(&self, frame: &Frame<'_>, point: PhysPoint, size: (f64, f64)) -> bool {
        let anchor = frame.position(0);
        Rect::new(anchor.0, anchor.1, size.0, size.1).contains(point)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::behavior::{ParamValue, StyleValues};
    use crate::types::Positioning;

    fn frame<'a>(
        positions: &'a [PhysPoint],
        values: &'a [ParamValue],
        style: &'a StyleValues,
        viewport: Option<(f64, f64)>,
    ) -> Frame<'a> {
        Frame {
            positions,
            values,
            style,
            positioning: Positioning::Physical,
            scale: 1.0,
            viewport,
        }
    }

    #[test]
    fn test_disc_builds_plain_circle() {
        let positions = [(400.0, 300.0)];
        let values = [ParamValue::Scalar(50.0)];
        let style = StyleValues::default();
        let primitive = Disc.build(&frame(&positions, &values, &style, Some((800.0, 600.0))));
        assert!(matches!(primitive, Primitive::Circle { radius, .. } if radius == 50.0));
    }

    #[test]
    fn test_disc_degenerates_off_viewport() {
        let positions = [(5000.0, 300.0)];
        let values = [ParamValue::Scalar(50.0)];
        let style = StyleValues::default();
        let primitive = Disc.build(&frame(&positions, &values, &style, Some((800.0, 600.0))));
        assert!(matches!(primitive, Primitive::Circle { radius, .. } if radius == 0.0));
    }

    #[test]
    fn test_disc_polygon_when_oversized() {
        let positions = [(400.0, 2000.0)];
        let values = [ParamValue::Scalar(1700.0)];
        let style = StyleValues::default();
        let primitive = Disc.build(&frame(&positions, &values, &style, Some((800.0, 600.0))));
        match primitive {
            Primitive::Polygon { points, .. } => {
                assert_eq!(points.first(), points.last());
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_disc_headless_keeps_circle() {
        let positions = [(0.0, 0.0)];
        let values = [ParamValue::Scalar(1e6)];
        let style = StyleValues::default();
        let primitive = Disc.build(&frame(&positions, &values, &style, None));
        assert!(matches!(primitive, Primitive::Circle { radius, .. } if radius == 1e6));
    }

    #[test]
    fn test_disc_hit_test() {
        let positions = [(100.0, 100.0)];
        let values = [ParamValue::Scalar(10.0)];
        let style = StyleValues::default();
        let f = frame(&positions, &values, &style, None);
        assert!(Disc.hit_test(&f, (105.0, 100.0), (0.0, 0.0)));
        assert!(!Disc.hit_test(&f, (111.0, 100.0), (0.0, 0.0)));
    }

    #[test]
    fn test_segment_build_is_anchor_relative() {
        let positions = [(10.0, 10.0), (40.0, 50.0)];
        let style = StyleValues::default();
        let primitive = Segment.build(&frame(&positions, &[], &style, None));
        assert!(matches!(primitive, Primitive::Line { to, .. } if to == (30.0, 40.0)));
    }

    #[test]
    fn test_segment_hit_test_distance() {
        let positions = [(0.0, 0.0), (100.0, 0.0)];
        let style = StyleValues::default(); // width 2 → slack 4
        let f = frame(&positions, &[], &style, None);
        assert!(Segment.hit_test(&f, (50.0, 3.0), (0.0, 0.0)));
        assert!(!Segment.hit_test(&f, (50.0, 6.0), (0.0, 0.0)));
        // Beyond the endpoint measures to the endpoint, not the line.
        assert!(!Segment.hit_test(&f, (110.0, 0.0), (0.0, 0.0)));
    }

    #[test]
    fn test_label_hit_test_uses_measured_size() {
        let positions = [(10.0, 10.0)];
        let values = [ParamValue::Text("hi".into())];
        let style = StyleValues::default();
        let f = frame(&positions, &values, &style, None);
        assert!(Label.hit_test(&f, (20.0, 15.0), (24.0, 20.0)));
        assert!(!Label.hit_test(&f, (40.0, 15.0), (24.0, 20.0)));
        // Zero-size drawable (not yet measured) hits nothing but the anchor.
        assert!(!Label.hit_test(&f, (20.0, 15.0), (0.0, 0.0)));
    }
}
