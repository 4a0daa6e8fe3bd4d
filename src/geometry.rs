//! GeometryClipper - circle vs. viewport rectangle.
//!
//! Exact circle rendering becomes unreliable once the physical radius far
//! exceeds the viewport, so an oversized circle is approximated by a closed
//! polygon: the visible arc traced as near-circle samples, closed off along
//! the *outside* of the viewport through inflated corner vertices.
//!
//! The routine is a best-effort approximation, not a general polygon clip.
//! Ambiguous edges (zero or two intersections) are discarded, the corner
//! walk is bounded, and every failure mode falls back to "draw the plain
//! circle" rather than erroring.

use tracing::trace;

use crate::types::{PhysPoint, Rect};

/// Corner vertices are pushed this far outside the viewport so the closing
/// run of the polygon never cuts across visible pixels.
const CORNER_MARGIN: f64 = 100.0;

/// Interior radial samples used to trace the visible arc.
const ARC_SAMPLES: usize = 20;

/// Hard bound on the corner-stitching walk. If the two boundary sides have
/// not met by then, the boundary set is malformed and the walk truncates.
const MAX_CORNER_STEPS: usize = 20;

const EPSILON: f64 = 1e-9;

// =============================================================================
// Predicates
// =============================================================================

/// Whether the circle's bounding box misses the viewport entirely.
///
/// Such a circle is rendered as a degenerate (zero-radius) circle, which the
/// backend treats as invisible.
pub fn circle_outside_viewport(center: PhysPoint, radius: f64, viewport: Rect) -> bool {
    center.0 + radius < viewport.x
        || center.0 - radius > viewport.right()
        || center.1 + radius < viewport.y
        || center.1 - radius > viewport.bottom()
}

/// Whether the circle is too large to hand to the backend as-is.
pub fn needs_polygon(radius: f64, viewport: Rect) -> bool {
    radius > 2.0 * viewport.width
}

// =============================================================================
// Clipping
// =============================================================================

/// Clip an oversized circle against the viewport.
///
/// Returns a closed polygon ring (first point repeated at the end),
/// translated to be center-relative, or `None` when fewer than two viewport
/// edges yield a single unambiguous intersection - the caller falls back to
/// the plain circle in that case.
pub fn clip_circle(center: PhysPoint, radius: f64, viewport: Rect) -> Option<Vec<PhysPoint>> {
    // 1. One boundary point per edge that the circle crosses exactly once.
    //    Edges with zero or two in-segment intersections are ambiguous
    //    (fully outside, fully spanned, or tangent) and are discarded.
    let edges = viewport.edges();
    let mut boundary: Vec<(usize, PhysPoint)> = Vec::new();
    for (side, (a, b)) in edges.iter().enumerate() {
        let hits = circle_segment_intersections(center, radius, *a, *b);
        if hits.len() == 1 {
            boundary.push((side, hits[0]));
        }
    }
    if boundary.len() < 2 {
        return None;
    }

    let (first_side, first) = boundary[0];
    let (last_side, last) = boundary[boundary.len() - 1];

    // 2. Trace the visible arc: walk interpolated points along the chord
    //    from first to last and project each from the center back onto the
    //    circle, so the polygon follows the arc instead of the chord.
    let mut points: Vec<PhysPoint> = Vec::with_capacity(ARC_SAMPLES + MAX_CORNER_STEPS + 3);
    points.push(first);
    for i in 1..ARC_SAMPLES {
        let t = i as f64 / ARC_SAMPLES as f64;
        let chord = (
            first.0 + (last.0 - first.0) * t,
            first.1 + (last.1 - first.1) * t,
        );
        let v = (chord.0 - center.0, chord.1 - center.1);
        let len = (v.0 * v.0 + v.1 * v.1).sqrt();
        if len < EPSILON {
            continue;
        }
        points.push((
            center.0 + v.0 / len * radius,
            center.1 + v.1 / len * radius,
        ));
    }
    points.push(last);

    // 3. Close along the outside of the viewport: append inflated corner
    //    vertices from the side holding the last boundary point around to
    //    the side holding the first. Walk direction comes from the signed
    //    area of the first three collected points - empirically tuned, and
    //    bounded in case the boundary set is malformed.
    let clockwise = match points.get(2) {
        Some(&third) => cross(points[0], points[1], third) > 0.0,
        None => false,
    };
    let corners = viewport.inflated(CORNER_MARGIN).corners();
    let mut side = last_side;
    let mut steps = 0;
    while side != first_side {
        if steps >= MAX_CORNER_STEPS {
            trace!(first_side, last_side, "corner walk truncated");
            break;
        }
        if clockwise {
            points.push(corners[(side + 1) % 4]);
            side = (side + 1) % 4;
        } else {
            points.push(corners[side]);
            side = (side + 3) % 4;
        }
        steps += 1;
    }

    // 4. Close the ring and make everything center-relative, since the
    //    consuming polygon drawable is defined relative to its own origin.
    points.push(first);
    Some(
        points
            .into_iter()
            .map(|p| (p.0 - center.0, p.1 - center.1))
            .collect(),
    )
}

// =============================================================================
// Circle / segment intersection
// =============================================================================

/// Intersections of a circle with a line segment, in circle-relative math,
/// filtered to points actually on the segment.
///
/// Uses the determinant form: with endpoints relative to the center,
/// `D = x1*y2 - x2*y1`, discriminant `r²·dr² - D²`.
fn circle_segment_intersections(
    center: PhysPoint,
    radius: f64,
    a: PhysPoint,
    b: PhysPoint,
) -> Vec<PhysPoint> {
    let (x1, y1) = (a.0 - center.0, a.1 - center.1);
    let (x2, y2) = (b.0 - center.0, b.1 - center.1);
    let (dx, dy) = (x2 - x1, y2 - y1);
    let dr2 = dx * dx + dy * dy;
    let d = x1 * y2 - x2 * y1;
    let disc = radius * radius * dr2 - d * d;
    // Tangent (disc == 0) counts as ambiguous and yields nothing.
    if disc <= EPSILON || dr2 < EPSILON {
        return Vec::new();
    }

    let sq = disc.sqrt();
    let sign_dy = if dy < 0.0 { -1.0 } else { 1.0 };
    let mut hits = Vec::new();
    for pm in [1.0, -1.0] {
        let x = (d * dy + pm * sign_dy * dx * sq) / dr2;
        let y = (-d * dx + pm * dy.abs() * sq) / dr2;
        if on_segment((x, y), (x1, y1), (x2, y2)) {
            hits.push((x + center.0, y + center.1));
        }
    }
    hits
}

/// Whether `p`, known to lie on the infinite line through `a`-`b`, lies
/// within the segment.
fn on_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> bool {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 < EPSILON {
        return false;
    }
    let t = ((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2;
    (-EPSILON..=1.0 + EPSILON).contains(&t)
}

/// Cross product of `(a - o) × (b - o)`; the sign gives the turn direction.
fn cross(o: PhysPoint, a: PhysPoint, b: PhysPoint) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

// =============================================================================
// TESTS
// =============================================================================
