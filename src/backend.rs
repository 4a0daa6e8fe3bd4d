//! Rendering backend interface.
//!
//! The toolkit never draws; it asks an external backend to create and
//! replace drawable handles. The trait here is the entire contract: create a
//! drawable per primitive kind, destroy it, move it, toggle visibility,
//! rotate, scale, and report its physical size.
//!
//! [`RecordingBackend`] is the in-memory implementation used headless and in
//! every test: it records each operation so assertions can inspect exactly
//! what the scene asked for.

use std::collections::HashMap;

use crate::types::{LineStyle, PhysPoint, Rect, Rgba};

// =============================================================================
// Drawable handles and primitives
// =============================================================================

/// Opaque handle to a backend drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableId(pub u64);

/// The primitive kinds the backend must know how to draw.
///
/// Geometry is defined relative to the drawable's own origin; the scene
/// positions the drawable with [`RenderBackend::set_position`].
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        width: f64,
        height: f64,
        color: Rgba,
        stroke: f64,
        style: LineStyle,
    },
    Circle {
        radius: f64,
        color: Rgba,
        stroke: f64,
        style: LineStyle,
    },
    Ellipse {
        rx: f64,
        ry: f64,
        color: Rgba,
        stroke: f64,
        style: LineStyle,
    },
    Polygon {
        points: Vec<PhysPoint>,
        color: Rgba,
        stroke: f64,
        style: LineStyle,
    },
    Line {
        to: PhysPoint,
        color: Rgba,
        stroke: f64,
        style: LineStyle,
    },
    Text {
        content: String,
        size: f64,
        color: Rgba,
    },
    Image {
        source: String,
        subframe: Option<Rect>,
    },
}

// =============================================================================
// Backend trait
// =============================================================================

/// Capability the external renderer provides to the scene core.
pub trait RenderBackend {
    /// Create a drawable for `primitive`. Initially visible, unpositioned.
    fn create(&mut self, primitive: Primitive) -> DrawableId;

    /// Destroy a drawable, releasing its resources.
    fn destroy(&mut self, id: DrawableId);

    /// Place the drawable's origin at a physical position.
    fn set_position(&mut self, id: DrawableId, position: PhysPoint);

    fn set_visible(&mut self, id: DrawableId, visible: bool);

    fn set_rotation(&mut self, id: DrawableId, radians: f64);

    fn set_scale(&mut self, id: DrawableId, factor: f64);

    /// Current visibility flag; preserved across drawable swaps.
    fn visible(&self, id: DrawableId) -> bool;

    /// Physical width and height of the drawable, e.g. measured text.
    fn size(&self, id: DrawableId) -> (f64, f64);
}

// =============================================================================
// RecordingBackend
// =============================================================================

/// Full state of one recorded drawable.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableRecord {
    pub primitive: Primitive,
    pub position: PhysPoint,
    pub visible: bool,
    pub rotation: f64,
    pub scale: f64,
}

/// In-memory backend that records every drawable and operation.
///
/// Text is measured with a fixed-advance approximation (0.6 em per char),
/// which is all hit-testing needs in headless runs.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    drawables: HashMap<DrawableId, DrawableRecord>,
    next_id: u64,
    created: usize,
    destroyed: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drawables currently alive.
    pub fn live_count(&self) -> usize {
        self.drawables.len()
    }

    /// Total drawables ever created.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Total drawables destroyed.
    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    pub fn record(&self, id: DrawableId) -> Option<&DrawableRecord> {
        self.drawables.get(&id)
    }
}

impl RenderBackend for RecordingBackend {
    fn create(&mut self, primitive: Primitive) -> DrawableId {
        let id = DrawableId(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.drawables.insert(
            id,
            DrawableRecord {
                primitive,
                position: (0.0, 0.0),
                visible: true,
                rotation: 0.0,
                scale: 1.0,
            },
        );
        id
    }

    fn destroy(&mut self, id: DrawableId) {
        if self.drawables.remove(&id).is_some() {
            self.destroyed += 1;
        }
    }

    fn set_position(&mut self, id: DrawableId, position: PhysPoint) {
        if let Some(record) = self.drawables.get_mut(&id) {
            record.position = position;
        }
    }

    fn set_visible(&mut self, id: DrawableId, visible: bool) {
        if let Some(record) = self.drawables.get_mut(&id) {
            record.visible = visible;
        }
    }

    fn set_rotation(&mut self, id: DrawableId, radians: f64) {
        if let Some(record) = self.drawables.get_mut(&id) {
            record.rotation = radians;
        }
    }

    fn set_scale(&mut self, id: DrawableId, factor: f64) {
        if let Some(record) = self.drawables.get_mut(&id) {
            record.scale = factor;
        }
    }

    fn visible(&self, id: DrawableId) -> bool {
        self.drawables.get(&id).map(|r| r.visible).unwrap_or(true)
    }

    fn size(&self, id: DrawableId) -> (f64, f64) {
        let Some(record) = self.drawables.get(&id) else {
            return (0.0, 0.0);
        };
        match &record.primitive {
            Primitive::Rect { width, height, .. } => (*width, *height),
            Primitive::Circle { radius, .. } => (radius * 2.0, radius * 2.0),
            Primitive::Ellipse { rx, ry, .. } => (rx * 2.0, ry * 2.0),
            Primitive::Polygon { points, .. } => {
                let xs = points.iter().map(|p| p.0);
                let ys = points.iter().map(|p| p.1);
                let min_x = xs.clone().fold(f64::INFINITY, f64::min);
                let max_x = xs.fold(f64::NEG_INFINITY, f64::max);
                let min_y = ys.clone().fold(f64::INFINITY, f64::min);
                let max_y = ys.fold(f64::NEG_INFINITY, f64::max);
                if points.is_empty() {
                    (0.0, 0.0)
                } else {
                    (max_x - min_x, max_y - min_y)
                }
            }
            Primitive::Line { to, .. } => (to.0.abs(), to.1.abs()),
            Primitive::Text { content, size, .. } => {
                (content.chars().count() as f64 * size * 0.6, *size)
            }
            Primitive::Image { subframe, .. } => subframe
                .map(|f| (f.width, f.height))
                .unwrap_or((0.0, 0.0)),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
