//! Scene - entity registry and frame driver.
//!
//! The scene owns every entity, the coordinate space, and the timer. It
//! hands out reusable numeric ids, keeps the interaction sets (movable,
//! selectable, strokable) in insertion order, and drives the per-frame
//! resolve/diff/rebuild step of each entity.
//!
//! # API
//!
//! - `spawn` / `destroy` - entity lifecycle
//! - `set_movable` / `set_selectable` / `set_strokable` - interaction sets
//! - `step_all` / `touch` / `touch_all` - frame stepping
//! - `hit_first` - insertion-order hit-testing over a set
//! - `tick` - advance the timer, then step

use std::collections::HashMap;

use tracing::debug;

use crate::backend::RenderBackend;
use crate::entity::behavior::{Behavior, Input};
use crate::entity::core::{Entity, EntityOptions};
use crate::error::Error;
use crate::space::CoordinateSpace;
use crate::timer::Timer;
use crate::types::Capabilities;

/// Scene-scoped entity handle. Ids are reused after destruction.
pub type EntityId = usize;

// =============================================================================
// Scene
// =============================================================================

/// The root context object: entity registry, coordinate space, timer.
#[derive(Default)]
pub struct Scene {
    entities: HashMap<EntityId, Entity>,
    /// Ids freed by destruction, reused before fresh ones.
    free_ids: Vec<EntityId>,
    next_id: EntityId,
    /// Every live entity, in spawn order. Drives stepping and default
    /// hit-test order.
    visual: Vec<EntityId>,
    movable: Vec<EntityId>,
    selectable: Vec<EntityId>,
    strokable: Vec<EntityId>,
    space: CoordinateSpace,
    timer: Timer,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    pub fn space_mut(&mut self) -> &mut CoordinateSpace {
        &mut self.space
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Create an entity from a behavior and its construction arguments,
    /// build its first drawable, and register it.
    pub fn spawn(
        &mut self,
        behavior: Box<dyn Behavior>,
        args: Vec<Input>,
        options: EntityOptions,
        backend: &mut dyn RenderBackend,
    ) -> Result<EntityId, Error> {
        let mut entity = Entity::new(behavior, args, options)?;
        entity.step(&self.space, backend, true);

        let id = self.free_ids.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });
        debug!(id, kind = entity.kind(), "spawn entity");
        self.entities.insert(id, entity);
        self.visual.push(id);
        Ok(id)
    }

    /// Destroy an entity: drop it from every set, release its drawable, and
    /// recycle its id. Unknown ids are ignored.
    pub fn destroy(&mut self, id: EntityId, backend: &mut dyn RenderBackend) {
        let Some(mut entity) = self.entities.remove(&id) else {
            return;
        };
        debug!(id, kind = entity.kind(), "destroy entity");
        entity.release(backend);
        set_remove(&mut self.visual, id);
        set_remove(&mut self.movable, id);
        set_remove(&mut self.selectable, id);
        set_remove(&mut self.strokable, id);
        self.free_ids.push(id);

        // An empty scene restarts id allocation from zero.
        if self.entities.is_empty() {
            self.free_ids.clear();
            self.next_id = 0;
        }
    }

    /// Destroy everything and reset the space and timer to their initial
    /// state.
    pub fn reset(&mut self, backend: &mut dyn RenderBackend) {
        for id in self.visual.clone() {
            self.destroy(id, backend);
        }
        self.space = CoordinateSpace::new();
        self.timer.reset();
    }

    // -------------------------------------------------------------------------
    // Interaction sets
    // -------------------------------------------------------------------------

    /// Allow or forbid whole-entity dragging.
    ///
    /// An entity whose position is computed (any dynamic positional input)
    /// cannot be moved by hand; enabling is silently refused for it.
    pub fn set_movable(&mut self, id: EntityId, movable: bool) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if movable && entity.has_dynamic_position() {
            debug!(id, "movable refused: position is computed");
            return;
        }
        entity.capabilities_mut().set(Capabilities::MOVABLE, movable);
        if movable {
            set_insert(&mut self.movable, id);
        } else {
            set_remove(&mut self.movable, id);
        }
    }

    pub fn set_selectable(&mut self, id: EntityId, selectable: bool) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        entity
            .capabilities_mut()
            .set(Capabilities::SELECTABLE, selectable);
        if selectable {
            set_insert(&mut self.selectable, id);
        } else {
            set_remove(&mut self.selectable, id);
        }
    }

    pub fn set_strokable(&mut self, id: EntityId, strokable: bool) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        entity
            .capabilities_mut()
            .set(Capabilities::STROKABLE, strokable);
        if strokable {
            set_insert(&mut self.strokable, id);
        } else {
            set_remove(&mut self.strokable, id);
        }
    }

    pub fn movable_ids(&self) -> Vec<EntityId> {
        self.movable.clone()
    }

    pub fn selectable_ids(&self) -> Vec<EntityId> {
        self.selectable.clone()
    }

    pub fn strokable_ids(&self) -> Vec<EntityId> {
        self.strokable.clone()
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    /// Step every entity in spawn order. Returns the number of rebuilds.
    ///
    /// `force` rebuilds unconditionally; the view gestures use it because
    /// resolved physical positions depend on the transform even when the
    /// logical inputs did not change.
    pub fn step_all(&mut self, backend: &mut dyn RenderBackend, force: bool) -> usize {
        let space = self.space;
        let mut rebuilt = 0;
        for id in self.visual.clone() {
            if let Some(entity) = self.entities.get_mut(&id) {
                // Static, untouched entities are not even polled.
                if !force && !entity.needs_step() {
                    continue;
                }
                if entity.step(&space, backend, force) {
                    rebuilt += 1;
                }
            }
        }
        rebuilt
    }

    /// Mark one entity for an unconditional rebuild on the next step.
    pub fn touch(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.touch();
        }
    }

    /// Mark every entity for an unconditional rebuild on the next step.
    pub fn touch_all(&mut self) {
        for entity in self.entities.values_mut() {
            entity.touch();
        }
    }

    /// Advance the timer to `now`, then step. Returns the number of timer
    /// callbacks fired.
    pub fn tick(&mut self, backend: &mut dyn RenderBackend, now: f64) -> usize {
        let fired = self.timer.tick(now);
        self.step_all(backend, false);
        fired
    }

    // -------------------------------------------------------------------------
    // Hit-testing
    // -------------------------------------------------------------------------

    /// First entity of `ids`, in the given order, hit by a physical point.
    pub fn hit_first(
        &self,
        ids: &[EntityId],
        point: crate::types::PhysPoint,
        backend: &dyn RenderBackend,
    ) -> Option<EntityId> {
        ids.iter()
            .copied()
            .find(|id| {
                self.entities
                    .get(id)
                    .is_some_and(|e| e.hit_test(point, &self.space, backend))
            })
    }
}

/// Insert into an insertion-ordered set; idempotent.
fn set_insert(set: &mut Vec<EntityId>, id: EntityId) {
    if !set.contains(&id) {
        set.push(id);
    }
}

fn set_remove(set: &mut Vec<EntityId>, id: EntityId) {
    set.retain(|&e| e != id);
}

// =============================================================================
// TESTS
// =============================================================================
