//! Behavior - the per-kind contract every visual entity supplies.
//!
//! A `Behavior` is the vtable of an entity kind: its declared parameter
//! schema, drawable construction, hit-testing, translation, and the
//! interaction hooks. The entity core and the interaction controller operate
//! purely on this contract; they never know concrete kinds.

use crate::backend::Primitive;
use crate::space::CoordinateSpace;
use crate::types::{LineStyle, PhysPoint, Point, Positioning, Rgba};
use crate::value::Value;

use super::core::Inputs;

// =============================================================================
// Resolved parameter values
// =============================================================================

/// A resolved non-positional parameter, compared by value in snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    Text(String),
    Point(Point),
}

impl ParamValue {
    pub fn scalar(&self) -> f64 {
        match self {
            ParamValue::Scalar(v) => *v,
            _ => 0.0,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ParamValue::Text(s) => s,
            _ => "",
        }
    }

    pub fn point(&self) -> Point {
        match self {
            ParamValue::Point(p) => *p,
            _ => (0.0, 0.0),
        }
    }
}

/// A non-positional input: a reactive value of one of the parameter shapes.
#[derive(Debug, Clone)]
pub enum Input {
    Point(Value<Point>),
    Scalar(Value<f64>),
    Text(Value<String>),
}

impl Input {
    pub fn is_dynamic(&self) -> bool {
        match self {
            Input::Point(v) => v.is_dynamic(),
            Input::Scalar(v) => v.is_dynamic(),
            Input::Text(v) => v.is_dynamic(),
        }
    }

    pub fn resolve(&self) -> ParamValue {
        match self {
            Input::Point(v) => ParamValue::Point(v.get()),
            Input::Scalar(v) => ParamValue::Scalar(v.get()),
            Input::Text(v) => ParamValue::Text(v.get()),
        }
    }
}

impl From<f64> for Input {
    fn from(v: f64) -> Self {
        Input::Scalar(Value::Static(v))
    }
}

impl From<(f64, f64)> for Input {
    fn from(p: (f64, f64)) -> Self {
        Input::Point(Value::Static(p))
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Text(Value::Static(s.to_string()))
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Text(Value::Static(s))
    }
}

impl From<Value<f64>> for Input {
    fn from(v: Value<f64>) -> Self {
        Input::Scalar(v)
    }
}

impl From<Value<Point>> for Input {
    fn from(v: Value<Point>) -> Self {
        Input::Point(v)
    }
}

impl From<Value<String>> for Input {
    fn from(v: Value<String>) -> Self {
        Input::Text(v)
    }
}

// =============================================================================
// Standard styling
// =============================================================================

/// Resolved standard inputs, shared by every entity kind.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleValues {
    /// Em size for text, marker size for points.
    pub size: f64,
    /// Stroke width in physical pixels.
    pub width: f64,
    pub color: Rgba,
    pub style: LineStyle,
}

impl Default for StyleValues {
    fn default() -> Self {
        Self {
            size: 20.0,
            width: 2.0,
            color: Rgba::BLACK,
            style: LineStyle::Solid,
        }
    }
}

// =============================================================================
// Frame - the resolved per-step view handed to behaviors
// =============================================================================

/// Everything a behavior may read while building or hit-testing:
/// resolved physical positions, resolved values, resolved style, and the
/// transform context captured at resolve time.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub positions: &'a [PhysPoint],
    pub values: &'a [ParamValue],
    pub style: &'a StyleValues,
    pub positioning: Positioning,
    /// Pixels per logical unit at resolve time.
    pub scale: f64,
    /// Attached viewport size, if any.
    pub viewport: Option<(f64, f64)>,
}

impl Frame<'_> {
    /// Resolved physical position `i`, `(0, 0)` when absent.
    pub fn position(&self, i: usize) -> PhysPoint {
        self.positions.get(i).copied().unwrap_or((0.0, 0.0))
    }

    pub fn scalar(&self, i: usize) -> f64 {
        self.values.get(i).map(ParamValue::scalar).unwrap_or(0.0)
    }

    pub fn text(&self, i: usize) -> &str {
        self.values.get(i).map(ParamValue::text).unwrap_or("")
    }

    /// Convert a length expressed in the entity's input units to pixels.
    ///
    /// Logical entities measure lengths in logical units; physical entities
    /// already speak pixels.
    pub fn length_to_physical(&self, length: f64) -> f64 {
        match self.positioning {
            Positioning::Logical => length * self.scale,
            Positioning::Physical => length,
        }
    }
}

// =============================================================================
// Behavior trait
// =============================================================================

/// The per-kind vtable.
///
/// `build` must be a pure function of the frame; the entity core decides
/// *when* to call it (snapshot diff or force), the behavior only decides
/// *what* a drawable looks like.
pub trait Behavior {
    /// Kind name used in errors and logs.
    fn kind(&self) -> &'static str;

    /// Declared positional parameter names, bound 1:1 to the leading
    /// construction arguments. The first one anchors the drawable.
    fn positional_params(&self) -> &'static [&'static str];

    /// Declared non-positional parameter names, bound to the trailing
    /// construction arguments.
    fn value_params(&self) -> &'static [&'static str] {
        &[]
    }

    /// Build a new drawable description from the resolved frame.
    fn build(&self, frame: &Frame<'_>) -> Primitive;

    /// Whether a physical point hits this entity. `drawable_size` is the
    /// backend-reported size of the current drawable (e.g. measured text).
    fn hit_test(&self, frame: &Frame<'_>, point: PhysPoint, drawable_size: (f64, f64)) -> bool;

    /// Move the entity by a physical delta.
    ///
    /// The default translates every static positional input; the controller
    /// calls this unconditionally on any movable entity, so a kind that
    /// cannot sensibly move overrides this as a no-op rather than omitting
    /// it.
    fn apply_translation(&mut self, inputs: &mut Inputs, delta: PhysPoint, space: &CoordinateSpace) {
        inputs.translate_static_positions(delta, space);
    }

    /// Whether `point` is over this entity's strokable sub-part (thumb).
    fn can_stroke(&self, _frame: &Frame<'_>, _point: PhysPoint) -> bool {
        false
    }

    /// Drag the strokable sub-part.
    fn stroke(&mut self, _frame: &Frame<'_>, _point: PhysPoint, _delta: PhysPoint) {}

    /// Selection state changed.
    fn on_select(&mut self, _selected: bool) {}

    /// Pointer pressed over this entity.
    fn on_pointer_down(&mut self) {}

    /// Pointer released after a press on this entity.
    fn on_pointer_up(&mut self) {}
}
