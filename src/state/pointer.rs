//! Pointer interaction - the select/drag/stroke/pan/zoom state machine.
//!
//! The host feeds raw pointer events into [`InteractionController::dispatch`];
//! the controller resolves them against the scene's interaction sets and
//! mutates entities and the coordinate space. Pointer position and button
//! state are exposed as signals so entity getters can depend on them and
//! rebuild reactively.
//!
//! Gesture resolution on press, in priority order:
//!
//! 1. a strokable entity's thumb under the pointer starts a stroke,
//! 2. otherwise the first movable entity hit starts a whole-entity drag,
//! 3. otherwise dragging pans the view.
//!
//! The controller never rebuilds drawables itself; it marks entities and
//! lets the next scene step pick the changes up.

use std::rc::Rc;

use spark_signals::{signal, Signal};
use tracing::{debug, trace};

use crate::backend::RenderBackend;
use crate::error::Error;
use crate::scene::{EntityId, Scene};
use crate::types::{Capabilities, PhysPoint, ViewChange, ViewChangeKind};

use super::keyboard::KeyDispatcher;

/// A raw pointer event in physical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    /// A completed press-release on one spot, as recognized by the host.
    Click { x: f64, y: f64 },
    Wheel { x: f64, y: f64, delta: f64 },
}

/// Observer of pan/zoom changes.
pub type ViewHandler = Rc<dyn Fn(&ViewChange)>;

// =============================================================================
// InteractionController
// =============================================================================

/// Pointer and keyboard state for one scene.
pub struct InteractionController {
    mouse_x: Signal<f64>,
    mouse_y: Signal<f64>,
    mouse_down: Signal<bool>,
    /// Entity being whole-entity dragged, captured on press.
    captured: Option<EntityId>,
    /// Entity whose thumb is being dragged, captured on press.
    stroked: Option<EntityId>,
    /// Entity that received the press, for the release hook.
    down_object: Option<EntityId>,
    /// Most recently selected entity.
    selected: Option<EntityId>,
    view_handlers: Vec<(usize, ViewHandler)>,
    next_handler_id: usize,
    keyboard: KeyDispatcher,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            mouse_x: signal(0.0),
            mouse_y: signal(0.0),
            mouse_down: signal(false),
            captured: None,
            stroked: None,
            down_object: None,
            selected: None,
            view_handlers: Vec::new(),
            next_handler_id: 0,
            keyboard: KeyDispatcher::new(),
        }
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer X as a signal, for reactive entity inputs.
    pub fn mouse_x(&self) -> Signal<f64> {
        self.mouse_x.clone()
    }

    pub fn mouse_y(&self) -> Signal<f64> {
        self.mouse_y.clone()
    }

    pub fn mouse_down(&self) -> Signal<bool> {
        self.mouse_down.clone()
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn captured(&self) -> Option<EntityId> {
        self.captured
    }

    pub fn stroked(&self) -> Option<EntityId> {
        self.stroked
    }

    pub fn keyboard(&self) -> &KeyDispatcher {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyDispatcher {
        &mut self.keyboard
    }

    // -------------------------------------------------------------------------
    // View-change observers
    // -------------------------------------------------------------------------

    /// Observe pan/zoom changes; returns the id to remove the observer with.
    pub fn add_view_notification(&mut self, handler: impl Fn(&ViewChange) + 'static) -> usize {
        let id = self.next_handler_id;
        self.next_handler_id += 1;
        self.view_handlers.push((id, Rc::new(handler)));
        id
    }

    pub fn remove_view_notification(&mut self, id: usize) -> Result<(), Error> {
        let before = self.view_handlers.len();
        self.view_handlers.retain(|(h, _)| *h != id);
        if self.view_handlers.len() == before {
            return Err(Error::UnknownListener(id));
        }
        Ok(())
    }

    fn notify_view_change(&self, scene: &Scene, kind: ViewChangeKind) {
        let change = ViewChange {
            kind,
            scale: scene.space().scale(),
            origin: scene.space().origin(),
        };
        for (_, handler) in &self.view_handlers {
            handler(&change);
        }
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Feed one pointer event through the state machine.
    pub fn dispatch(
        &mut self,
        scene: &mut Scene,
        backend: &mut dyn RenderBackend,
        event: PointerEvent,
    ) {
        match event {
            PointerEvent::Down { x, y } => self.on_down(scene, backend, (x, y)),
            PointerEvent::Up { x, y } => self.on_up(scene, (x, y)),
            PointerEvent::Move { x, y } => self.on_move(scene, (x, y)),
            PointerEvent::Click { x, y } => self.on_click(scene, backend, (x, y)),
            PointerEvent::Wheel { delta, .. } => self.on_wheel(scene, delta),
        }
    }

    fn on_down(&mut self, scene: &mut Scene, backend: &mut dyn RenderBackend, p: PhysPoint) {
        self.mouse_x.set(p.0);
        self.mouse_y.set(p.1);
        self.mouse_down.set(true);
        self.captured = None;
        self.stroked = None;
        self.down_object = None;

        // Press hook fires on the first selectable under the pointer.
        if let Some(id) = scene.hit_first(&scene.selectable_ids(), p, &*backend) {
            self.down_object = Some(id);
            if let Some(entity) = scene.entity_mut(id) {
                entity.pointer_pressed();
            }
        }

        // Movable entities take priority over panning, but a strokable
        // control's thumb takes priority over moving the whole control.
        let space = *scene.space();
        for id in scene.movable_ids() {
            let Some(entity) = scene.entity(id) else { continue };
            if !entity.hit_test(p, &space, &*backend) {
                continue;
            }
            // Only a thumb that is actually registered strokable defers the
            // whole-entity capture.
            if entity.capabilities().contains(Capabilities::STROKABLE)
                && entity.can_stroke(p, &space)
            {
                continue;
            }
            trace!(id, "move capture");
            self.captured = Some(id);
            return;
        }
        for id in scene.strokable_ids() {
            let Some(entity) = scene.entity(id) else { continue };
            if entity.can_stroke(p, &space) {
                trace!(id, "stroke capture");
                self.stroked = Some(id);
                return;
            }
        }
    }

    fn on_up(&mut self, scene: &mut Scene, p: PhysPoint) {
        self.mouse_x.set(p.0);
        self.mouse_y.set(p.1);
        self.mouse_down.set(false);
        if let Some(id) = self.down_object.take() {
            if let Some(entity) = scene.entity_mut(id) {
                entity.pointer_released();
            }
        }
        self.captured = None;
        self.stroked = None;
    }

    fn on_move(&mut self, scene: &mut Scene, p: PhysPoint) {
        let delta = (p.0 - self.mouse_x.get(), p.1 - self.mouse_y.get());
        self.mouse_x.set(p.0);
        self.mouse_y.set(p.1);
        if !self.mouse_down.get() || delta == (0.0, 0.0) {
            return;
        }

        let space = *scene.space();
        if let Some(id) = self.stroked {
            if let Some(entity) = scene.entity_mut(id) {
                entity.stroke(p, delta, &space);
            }
            return;
        }
        if let Some(id) = self.captured {
            if let Some(entity) = scene.entity_mut(id) {
                entity.apply_translation(delta, &space);
            }
            return;
        }

        // Background drag pans the view; every entity's physical position
        // changes, so all of them must rebuild.
        scene.space_mut().pan_by(delta);
        scene.touch_all();
        self.notify_view_change(scene, ViewChangeKind::Pan);
    }

    fn on_click(&mut self, scene: &mut Scene, backend: &mut dyn RenderBackend, p: PhysPoint) {
        match scene.hit_first(&scene.selectable_ids(), p, &*backend) {
            Some(id) => {
                debug!(id, "select");
                if let Some(entity) = scene.entity_mut(id) {
                    entity.set_selected(true);
                }
                self.selected = Some(id);
            }
            None => {
                // Click on empty space clears the selection, exactly once.
                if let Some(id) = self.selected.take() {
                    debug!(id, "unselect");
                    if let Some(entity) = scene.entity_mut(id) {
                        entity.set_selected(false);
                    }
                }
            }
        }
    }

    fn on_wheel(&mut self, scene: &mut Scene, delta: f64) {
        let factor = scene.space_mut().zoom_by_wheel(delta);
        if factor == 1.0 {
            return;
        }
        scene.touch_all();
        self.notify_view_change(scene, ViewChangeKind::Zoom);
    }

    /// Forget all transient pointer state, observers, and key handlers.
    pub fn reset(&mut self) {
        self.mouse_x.set(0.0);
        self.mouse_y.set(0.0);
        self.mouse_down.set(false);
        self.captured = None;
        self.stroked = None;
        self.down_object = None;
        self.selected = None;
        self.view_handlers.clear();
        self.next_handler_id = 0;
        self.keyboard.reset();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Primitive, RecordingBackend};
    use crate::entity::behavior::{Behavior, Frame, Input};
    use crate::entity::core::EntityOptions;
    use crate::entity::shapes::Disc;
    use crate::types::{distance, LineStyle, Rgba};
    use std::cell::Cell;

    fn setup() -> (Scene, RecordingBackend, InteractionController) {
        let mut scene = Scene::new();
        scene.space_mut().attach_viewport(800.0, 600.0);
        scene.space_mut().set_scale(200.0);
        (scene, RecordingBackend::new(), InteractionController::new())
    }

    fn disc(scene: &mut Scene, backend: &mut RecordingBackend, pos: (f64, f64), r: f64) -> EntityId {
        scene
            .spawn(
                Box::new(Disc),
                vec![Input::from(pos), Input::from(r)],
                EntityOptions::default(),
                backend,
            )
            .unwrap()
    }

    /// Counts selection-hook invocations.
    struct SelectProbe(Rc<Cell<i32>>);

    impl Behavior for SelectProbe {
        fn kind(&self) -> &'static str {
            "probe"
        }
        fn positional_params(&self) -> &'static [&'static str] {
            &["pos"]
        }
        fn build(&self, _frame: &Frame<'_>) -> Primitive {
            Primitive::Circle {
                radius: 50.0,
                color: Rgba::BLACK,
                stroke: 1.0,
                style: LineStyle::Solid,
            }
        }
        fn hit_test(&self, frame: &Frame<'_>, point: (f64, f64), _size: (f64, f64)) -> bool {
            distance(point, frame.position(0)) <= 50.0
        }
        fn on_select(&mut self, _selected: bool) {
            self.0.set(self.0.get() + 1);
        }
    }

    /// A slider-like kind: the whole body is movable, but a thumb near the
    /// anchor can be stroked independently.
    struct Slider {
        strokes: Rc<Cell<i32>>,
    }

    impl Behavior for Slider {
        fn kind(&self) -> &'static str {
            "slider"
        }
        fn positional_params(&self) -> &'static [&'static str] {
            &["pos"]
        }
        fn build(&self, _frame: &Frame<'_>) -> Primitive {
            Primitive::Rect {
                width: 200.0,
                height: 20.0,
                color: Rgba::GRAY,
                stroke: 1.0,
                style: LineStyle::Solid,
            }
        }
        fn hit_test(&self, frame: &Frame<'_>, point: (f64, f64), _size: (f64, f64)) -> bool {
            let a = frame.position(0);
            point.0 >= a.0 && point.0 <= a.0 + 200.0 && (point.1 - a.1).abs() <= 10.0
        }
        fn can_stroke(&self, frame: &Frame<'_>, point: (f64, f64)) -> bool {
            distance(point, frame.position(0)) <= 10.0
        }
        fn stroke(&mut self, _frame: &Frame<'_>, _point: (f64, f64), _delta: (f64, f64)) {
            self.strokes.set(self.strokes.get() + 1);
        }
    }

    #[test]
    fn test_click_selects_first_registered() {
        let (mut scene, mut backend, mut controller) = setup();
        let a = disc(&mut scene, &mut backend, (0.0, 0.0), 0.5);
        let b = disc(&mut scene, &mut backend, (0.0, 0.0), 0.5);
        scene.set_selectable(a, true);
        scene.set_selectable(b, true);

        controller.dispatch(&mut scene, &mut backend, PointerEvent::Click { x: 400.0, y: 300.0 });
        assert_eq!(controller.selected(), Some(a));
        assert!(scene.entity(a).unwrap().is_selected());
        assert!(!scene.entity(b).unwrap().is_selected());
    }

    #[test]
    fn test_empty_click_unselects_exactly_once() {
        let (mut scene, mut backend, mut controller) = setup();
        let hooks = Rc::new(Cell::new(0));
        let id = scene
            .spawn(
                Box::new(SelectProbe(hooks.clone())),
                vec![Input::from((0.0, 0.0))],
                EntityOptions::default(),
                &mut backend,
            )
            .unwrap();
        scene.set_selectable(id, true);

        controller.dispatch(&mut scene, &mut backend, PointerEvent::Click { x: 400.0, y: 300.0 });
        assert_eq!(hooks.get(), 1);

        // Off-entity clicks: the first unselects, the second is a no-op.
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Click { x: 10.0, y: 10.0 });
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Click { x: 10.0, y: 10.0 });
        assert_eq!(hooks.get(), 2);
        assert_eq!(controller.selected(), None);
    }

    #[test]
    fn test_reselect_is_idempotent() {
        let (mut scene, mut backend, mut controller) = setup();
        let hooks = Rc::new(Cell::new(0));
        let id = scene
            .spawn(
                Box::new(SelectProbe(hooks.clone())),
                vec![Input::from((0.0, 0.0))],
                EntityOptions::default(),
                &mut backend,
            )
            .unwrap();
        scene.set_selectable(id, true);

        controller.dispatch(&mut scene, &mut backend, PointerEvent::Click { x: 400.0, y: 300.0 });
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Click { x: 400.0, y: 300.0 });
        assert_eq!(hooks.get(), 1);
    }

    #[test]
    fn test_drag_moves_captured_entity() {
        let (mut scene, mut backend, mut controller) = setup();
        let id = disc(&mut scene, &mut backend, (0.0, 0.0), 0.5);
        scene.set_movable(id, true);

        controller.dispatch(&mut scene, &mut backend, PointerEvent::Down { x: 400.0, y: 300.0 });
        assert_eq!(controller.captured(), Some(id));
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Move { x: 600.0, y: 300.0 });
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Up { x: 600.0, y: 300.0 });
        assert_eq!(controller.captured(), None);

        scene.step_all(&mut backend, false);
        let snapshot = scene.entity(id).unwrap().snapshot().unwrap();
        // 200 physical px right = +1 logical unit at scale 200.
        assert_eq!(snapshot.positions, vec![(600.0, 300.0)]);
        // The view itself did not pan.
        assert_eq!(scene.space().origin(), (0.0, 0.0));
    }

    #[test]
    fn test_thumb_beats_whole_entity_drag() {
        let (mut scene, mut backend, mut controller) = setup();
        let strokes = Rc::new(Cell::new(0));
        let id = scene
            .spawn(
                Box::new(Slider { strokes: strokes.clone() }),
                vec![Input::from((0.0, 0.0))],
                EntityOptions::default(),
                &mut backend,
            )
            .unwrap();
        scene.set_movable(id, true);
        scene.set_strokable(id, true);

        // Press on the thumb (the anchor, at physical (400, 300)).
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Down { x: 402.0, y: 300.0 });
        assert_eq!(controller.stroked(), Some(id));
        assert_eq!(controller.captured(), None);

        controller.dispatch(&mut scene, &mut backend, PointerEvent::Move { x: 450.0, y: 300.0 });
        assert_eq!(strokes.get(), 1);
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Up { x: 450.0, y: 300.0 });

        // Press on the body away from the thumb captures the whole entity.
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Down { x: 500.0, y: 300.0 });
        assert_eq!(controller.stroked(), None);
        assert_eq!(controller.captured(), Some(id));
    }

    #[test]
    fn test_thumb_without_strokable_registration_still_drags() {
        let (mut scene, mut backend, mut controller) = setup();
        let strokes = Rc::new(Cell::new(0));
        let id = scene
            .spawn(
                Box::new(Slider { strokes: strokes.clone() }),
                vec![Input::from((0.0, 0.0))],
                EntityOptions::default(),
                &mut backend,
            )
            .unwrap();
        // Movable only: the thumb area has no special meaning until the
        // entity is registered strokable.
        scene.set_movable(id, true);

        controller.dispatch(&mut scene, &mut backend, PointerEvent::Down { x: 402.0, y: 300.0 });
        assert_eq!(controller.captured(), Some(id));
        assert_eq!(controller.stroked(), None);

        // The drag moves the whole entity instead of panning the view.
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Move { x: 452.0, y: 300.0 });
        assert_eq!(strokes.get(), 0);
        assert_eq!(scene.space().origin(), (0.0, 0.0));
        scene.step_all(&mut backend, false);
        let snapshot = scene.entity(id).unwrap().snapshot().unwrap();
        assert_eq!(snapshot.positions, vec![(450.0, 300.0)]);
    }

    #[test]
    fn test_repeated_press_forgets_stale_down_object() {
        let (mut scene, mut backend, mut controller) = setup();
        let id = disc(&mut scene, &mut backend, (0.0, 0.0), 0.5);
        scene.set_selectable(id, true);

        controller.dispatch(&mut scene, &mut backend, PointerEvent::Down { x: 400.0, y: 300.0 });
        assert!(scene.entity(id).unwrap().is_pointer_down());

        // A second press off the entity, with no release in between, must
        // not leave the first press on record: the following release fires
        // no hook on the entity.
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Down { x: 10.0, y: 10.0 });
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Up { x: 10.0, y: 10.0 });
        assert!(scene.entity(id).unwrap().is_pointer_down());
    }

    #[test]
    fn test_background_drag_pans_and_notifies() {
        let (mut scene, mut backend, mut controller) = setup();
        disc(&mut scene, &mut backend, (0.0, 0.0), 0.5);

        let changes = Rc::new(Cell::new(0));
        let changes_clone = changes.clone();
        controller.add_view_notification(move |change| {
            assert_eq!(change.kind, ViewChangeKind::Pan);
            changes_clone.set(changes_clone.get() + 1);
        });

        controller.dispatch(&mut scene, &mut backend, PointerEvent::Down { x: 10.0, y: 10.0 });
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Move { x: 210.0, y: 10.0 });
        assert_eq!(changes.get(), 1);
        assert_eq!(scene.space().origin(), (-1.0, 0.0));

        // Every entity rebuilds on the step after a pan.
        assert_eq!(scene.step_all(&mut backend, false), 1);
    }

    #[test]
    fn test_move_without_press_only_tracks() {
        let (mut scene, mut backend, mut controller) = setup();
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Move { x: 123.0, y: 45.0 });
        assert_eq!(controller.mouse_x().get(), 123.0);
        assert_eq!(controller.mouse_y().get(), 45.0);
        assert_eq!(scene.space().origin(), (0.0, 0.0));
    }

    #[test]
    fn test_wheel_zooms_and_notifies() {
        let (mut scene, mut backend, mut controller) = setup();
        disc(&mut scene, &mut backend, (0.0, 0.0), 0.5);

        let last_scale = Rc::new(Cell::new(0.0));
        let last_scale_clone = last_scale.clone();
        controller.add_view_notification(move |change| {
            assert_eq!(change.kind, ViewChangeKind::Zoom);
            last_scale_clone.set(change.scale);
        });

        controller.dispatch(
            &mut scene,
            &mut backend,
            PointerEvent::Wheel { x: 400.0, y: 300.0, delta: 10.0 },
        );
        assert!((scene.space().scale() - 220.0).abs() < 1e-9);
        assert!((last_scale.get() - 220.0).abs() < 1e-9);
        assert_eq!(scene.step_all(&mut backend, false), 1);

        // A zero-delta wheel changes nothing and notifies nobody.
        last_scale.set(0.0);
        controller.dispatch(
            &mut scene,
            &mut backend,
            PointerEvent::Wheel { x: 400.0, y: 300.0, delta: 0.0 },
        );
        assert_eq!(last_scale.get(), 0.0);
    }

    #[test]
    fn test_view_notification_removal() {
        let (mut scene, mut backend, mut controller) = setup();
        let changes = Rc::new(Cell::new(0));
        let changes_clone = changes.clone();
        let id = controller.add_view_notification(move |_| {
            changes_clone.set(changes_clone.get() + 1);
        });

        controller.remove_view_notification(id).unwrap();
        assert_eq!(
            controller.remove_view_notification(id),
            Err(Error::UnknownListener(id))
        );

        controller.dispatch(
            &mut scene,
            &mut backend,
            PointerEvent::Wheel { x: 0.0, y: 0.0, delta: 10.0 },
        );
        assert_eq!(changes.get(), 0);
    }

    #[test]
    fn test_press_release_hooks() {
        let (mut scene, mut backend, mut controller) = setup();
        let id = disc(&mut scene, &mut backend, (0.0, 0.0), 0.5);
        scene.set_selectable(id, true);

        controller.dispatch(&mut scene, &mut backend, PointerEvent::Down { x: 400.0, y: 300.0 });
        assert!(scene.entity(id).unwrap().is_pointer_down());
        controller.dispatch(&mut scene, &mut backend, PointerEvent::Up { x: 400.0, y: 300.0 });
        assert!(!scene.entity(id).unwrap().is_pointer_down());
    }
}
