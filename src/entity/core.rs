//! Entity core - the reactive rebuild engine.
//!
//! An entity owns its reactive inputs, resolves them each step, diffs the
//! resolved triple (physical positions, values, style) against a cached
//! snapshot, and rebuilds its drawable only on change - or when forced,
//! which happens once at construction and whenever the global view pans or
//! zooms, since physical positions depend on the transform even when logical
//! values do not.

use tracing::trace;

use crate::backend::{DrawableId, RenderBackend};
use crate::error::Error;
use crate::space::CoordinateSpace;
use crate::types::{Capabilities, LineStyle, PhysPoint, Point, Positioning, Rgba};
use crate::value::Value;

use super::behavior::{Behavior, Frame, Input, ParamValue, StyleValues};

// =============================================================================
// Inputs
// =============================================================================

/// Reactive standard inputs, one per styling knob.
#[derive(Debug, Clone, Default)]
pub struct StyleInputs {
    pub size: Value<f64>,
    pub width: Value<f64>,
    pub color: Value<Rgba>,
    pub style: Value<LineStyle>,
}

impl StyleInputs {
    fn defaulted() -> Self {
        let defaults = StyleValues::default();
        Self {
            size: Value::Static(defaults.size),
            width: Value::Static(defaults.width),
            color: Value::Static(defaults.color),
            style: Value::Static(defaults.style),
        }
    }

    fn is_dynamic(&self) -> bool {
        self.size.is_dynamic()
            || self.width.is_dynamic()
            || self.color.is_dynamic()
            || self.style.is_dynamic()
    }

    fn resolve(&self) -> StyleValues {
        StyleValues {
            size: self.size.get(),
            width: self.width.get(),
            color: self.color.get(),
            style: self.style.get(),
        }
    }
}

/// The full input set of one entity: positional inputs (always points),
/// kind-specific value inputs, and standard styling.
pub struct Inputs {
    pub positioning: Positioning,
    positional: Vec<(&'static str, Value<Point>)>,
    values: Vec<(&'static str, Input)>,
    style: StyleInputs,
}

impl Inputs {
    pub fn has_dynamic_position(&self) -> bool {
        self.positional.iter().any(|(_, v)| v.is_dynamic())
    }

    fn is_dynamic(&self) -> bool {
        self.has_dynamic_position()
            || self.values.iter().any(|(_, i)| i.is_dynamic())
            || self.style.is_dynamic()
    }

    /// Look up a positional input by its declared name.
    pub fn position(&self, name: &str) -> Option<&Value<Point>> {
        self.positional
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn position_mut(&mut self, name: &str) -> Option<&mut Value<Point>> {
        self.positional
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Shift every static positional input by a physical delta.
    ///
    /// Logical positions receive the delta converted through the
    /// displacement transform; physical ones receive it as-is. Dynamic
    /// positions are computed elsewhere and are left alone.
    pub fn translate_static_positions(&mut self, delta: PhysPoint, space: &CoordinateSpace) {
        for (_, value) in &mut self.positional {
            let Some(&(x, y)) = value.as_static() else {
                continue;
            };
            let d = match self.positioning {
                Positioning::Logical => space.translate_physical_to_logical(delta),
                Positioning::Physical => delta,
            };
            value.set_static((x + d.0, y + d.1));
        }
    }

    fn resolve(&self, space: &CoordinateSpace) -> Snapshot {
        let positions = self
            .positional
            .iter()
            .map(|(_, v)| {
                let raw = v.get();
                match self.positioning {
                    Positioning::Logical => space.logical_to_physical(raw),
                    Positioning::Physical => raw,
                }
            })
            .collect();
        let values = self.values.iter().map(|(_, i)| i.resolve()).collect();
        Snapshot {
            positions,
            values,
            style: self.style.resolve(),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// The last-resolved input triple, compared by value to detect change.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub positions: Vec<PhysPoint>,
    pub values: Vec<ParamValue>,
    pub style: StyleValues,
}

impl Snapshot {
    /// The drawable anchor: the first resolved position.
    fn anchor(&self) -> PhysPoint {
        self.positions.first().copied().unwrap_or((0.0, 0.0))
    }
}

// =============================================================================
// Construction options
// =============================================================================

/// Keyword-style options accepted at entity construction.
///
/// Unset standard inputs fall back to kind-independent defaults.
#[derive(Clone, Default)]
pub struct EntityOptions {
    pub positioning: Positioning,
    pub size: Option<Value<f64>>,
    pub width: Option<Value<f64>>,
    pub color: Option<Value<Rgba>>,
    pub style: Option<Value<LineStyle>>,
}

// =============================================================================
// Entity
// =============================================================================

/// A visual entity: a behavior plus its reactive inputs and cached state.
pub struct Entity {
    behavior: Box<dyn Behavior>,
    inputs: Inputs,
    /// One-way promotion: true once any input was dynamic at construction.
    dynamic: bool,
    snapshot: Option<Snapshot>,
    /// Rebuild unconditionally on the next step (touch).
    force_next: bool,
    capabilities: Capabilities,
    selected: bool,
    pointer_down: bool,
    drawable: Option<DrawableId>,
}

impl Entity {
    /// Bind construction arguments to the behavior's declared schema.
    ///
    /// The leading arguments bind 1:1 to the positional parameters and must
    /// be points; the trailing arguments bind to the value parameters. Any
    /// count mismatch is a configuration error.
    pub(crate) fn new(
        behavior: Box<dyn Behavior>,
        args: Vec<Input>,
        options: EntityOptions,
    ) -> Result<Self, Error> {
        let positional_names = behavior.positional_params();
        let value_names = behavior.value_params();
        let expected = positional_names.len() + value_names.len();
        if args.len() != expected {
            return Err(Error::ArgumentCount {
                kind: behavior.kind(),
                expected,
                given: args.len(),
            });
        }

        let mut args = args.into_iter();
        let mut positional = Vec::with_capacity(positional_names.len());
        for (index, name) in positional_names.iter().enumerate() {
            match args.next() {
                Some(Input::Point(v)) => positional.push((*name, v)),
                Some(_) => {
                    return Err(Error::PositionalKind {
                        kind: behavior.kind(),
                        index,
                    });
                }
                None => unreachable!("argument count checked above"),
            }
        }
        let values = value_names
            .iter()
            .zip(args)
            .map(|(name, input)| (*name, input))
            .collect();

        let defaults = StyleInputs::defaulted();
        let inputs = Inputs {
            positioning: options.positioning,
            positional,
            values,
            style: StyleInputs {
                size: options.size.unwrap_or(defaults.size),
                width: options.width.unwrap_or(defaults.width),
                color: options.color.unwrap_or(defaults.color),
                style: options.style.unwrap_or(defaults.style),
            },
        };
        let dynamic = inputs.is_dynamic();

        Ok(Self {
            behavior,
            inputs,
            dynamic,
            snapshot: None,
            force_next: false,
            capabilities: Capabilities::empty(),
            selected: false,
            pointer_down: false,
            drawable: None,
        })
    }

    pub fn kind(&self) -> &'static str {
        self.behavior.kind()
    }

    /// Whether this entity must be polled every frame.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub(crate) fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn drawable(&self) -> Option<DrawableId> {
        self.drawable
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut Inputs {
        &mut self.inputs
    }

    pub fn has_dynamic_position(&self) -> bool {
        self.inputs.has_dynamic_position()
    }

    /// Request an unconditional rebuild on the next step.
    pub fn touch(&mut self) {
        self.force_next = true;
    }

    /// Whether the next unforced step can do anything: the entity has a
    /// dynamic input to poll or a pending touch.
    pub(crate) fn needs_step(&self) -> bool {
        self.dynamic || self.force_next
    }

    // -------------------------------------------------------------------------
    // Step - resolve, diff, rebuild
    // -------------------------------------------------------------------------

    /// Resolve all inputs and rebuild the drawable if anything changed.
    ///
    /// Returns whether a rebuild happened. At most one rebuild per step,
    /// however many inputs changed. The snapshot is only written when the
    /// resolve actually differs.
    pub fn step(
        &mut self,
        space: &CoordinateSpace,
        backend: &mut dyn RenderBackend,
        force: bool,
    ) -> bool {
        let force = force || self.force_next;
        self.force_next = false;

        let next = self.inputs.resolve(space);
        let changed = self.snapshot.as_ref() != Some(&next);
        if !changed && !force {
            return false;
        }
        if changed {
            self.snapshot = Some(next);
        }
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };

        let frame = Frame {
            positions: &snapshot.positions,
            values: &snapshot.values,
            style: &snapshot.style,
            positioning: self.inputs.positioning,
            scale: space.scale(),
            viewport: space.viewport(),
        };
        let primitive = self.behavior.build(&frame);
        let new_id = backend.create(primitive);
        backend.set_position(new_id, snapshot.anchor());

        // Swap wholesale, preserving the old drawable's visibility flag.
        if let Some(old) = self.drawable.take() {
            let visible = backend.visible(old);
            backend.set_visible(new_id, visible);
            backend.destroy(old);
        }
        self.drawable = Some(new_id);
        trace!(kind = self.behavior.kind(), changed, force, "rebuilt drawable");
        true
    }

    /// Release the drawable. Called on destruction.
    pub(crate) fn release(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(id) = self.drawable.take() {
            backend.destroy(id);
        }
    }

    // -------------------------------------------------------------------------
    // Interaction surface
    // -------------------------------------------------------------------------

    /// Hit-test against the last-resolved snapshot. An entity that has
    /// never stepped cannot be hit.
    pub fn hit_test(
        &self,
        point: PhysPoint,
        space: &CoordinateSpace,
        backend: &dyn RenderBackend,
    ) -> bool {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };
        let drawable_size = self
            .drawable
            .map(|id| backend.size(id))
            .unwrap_or((0.0, 0.0));
        let frame = Frame {
            positions: &snapshot.positions,
            values: &snapshot.values,
            style: &snapshot.style,
            positioning: self.inputs.positioning,
            scale: space.scale(),
            viewport: space.viewport(),
        };
        self.behavior.hit_test(&frame, point, drawable_size)
    }

    /// Whether `point` is over the strokable sub-part.
    pub fn can_stroke(&self, point: PhysPoint, space: &CoordinateSpace) -> bool {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };
        let frame = Frame {
            positions: &snapshot.positions,
            values: &snapshot.values,
            style: &snapshot.style,
            positioning: self.inputs.positioning,
            scale: space.scale(),
            viewport: space.viewport(),
        };
        self.behavior.can_stroke(&frame, point)
    }

    /// Drag the strokable sub-part; forces a rebuild on the next step.
    pub fn stroke(&mut self, point: PhysPoint, delta: PhysPoint, space: &CoordinateSpace) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return;
        };
        let frame = Frame {
            positions: &snapshot.positions,
            values: &snapshot.values,
            style: &snapshot.style,
            positioning: self.inputs.positioning,
            scale: space.scale(),
            viewport: space.viewport(),
        };
        self.behavior.stroke(&frame, point, delta);
        self.force_next = true;
    }

    /// Move the entity by a physical delta; forces a rebuild on the next
    /// step. Called unconditionally by the controller on captured entities.
    pub fn apply_translation(&mut self, delta: PhysPoint, space: &CoordinateSpace) {
        self.behavior.apply_translation(&mut self.inputs, delta, space);
        self.force_next = true;
    }

    /// Set the selection flag; fires the behavior hook only on change, so
    /// repeated selection is idempotent.
    pub(crate) fn set_selected(&mut self, selected: bool) {
        if self.selected == selected {
            return;
        }
        self.selected = selected;
        self.behavior.on_select(selected);
        self.force_next = true;
    }

    pub(crate) fn pointer_pressed(&mut self) {
        self.pointer_down = true;
        self.behavior.on_pointer_down();
    }

    pub(crate) fn pointer_released(&mut self) {
        self.pointer_down = false;
        self.behavior.on_pointer_up();
    }
}

// =============================================================================
// TESTS
// =============================================================================
