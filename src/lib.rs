//! mathvis - a declarative, reactive 2D scene toolkit.
//!
//! Entities are declared once from reactive inputs ([`Value`]: static,
//! signal, or getter) and kept on screen by a per-frame step that resolves
//! every input, diffs the result against the last snapshot, and rebuilds the
//! entity's drawable only on change. Rendering itself is delegated to a
//! [`RenderBackend`]; the crate ships a [`RecordingBackend`] for headless
//! use and tests.
//!
//! # Architecture
//!
//! - [`scene::Scene`] - entity registry, coordinate space, timer
//! - [`entity`] - the [`Behavior`] contract, the reactive entity core, and
//!   the built-in shape kinds
//! - [`space::CoordinateSpace`] - logical ↔ physical transform, pan, zoom
//! - [`state`] - pointer and keyboard interaction
//! - [`timer::Timer`] - discrete-event callback scheduler
//! - [`geometry`] - circle vs. viewport clipping for oversized circles
//!
//! # Example
//!
//! ```
//! use mathvis::{Disc, EntityOptions, Input, RecordingBackend, Scene};
//!
//! let mut scene = Scene::new();
//! scene.space_mut().attach_viewport(800.0, 600.0);
//! scene.space_mut().set_scale(200.0);
//!
//! let mut backend = RecordingBackend::new();
//! let disc = scene
//!     .spawn(
//!         Box::new(Disc),
//!         vec![Input::from((0.0, 0.0)), Input::from(0.5)],
//!         EntityOptions::default(),
//!         &mut backend,
//!     )
//!     .unwrap();
//! scene.set_movable(disc, true);
//!
//! // One frame: resolve, diff, rebuild what changed.
//! scene.tick(&mut backend, 0.0);
//! assert_eq!(backend.live_count(), 1);
//! ```

pub mod backend;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod scene;
pub mod space;
pub mod state;
pub mod timer;
pub mod types;
pub mod value;

pub use backend::{DrawableId, Primitive, RecordingBackend, RenderBackend};
pub use entity::{Behavior, Disc, Entity, EntityOptions, Frame, Input, Label, Segment};
pub use error::Error;
pub use scene::{EntityId, Scene};
pub use space::CoordinateSpace;
pub use state::{InteractionController, KeyDispatcher, KeyEvent, Modifiers, PointerEvent};
pub use timer::Timer;
pub use types::{Capabilities, LineStyle, Point, Positioning, Rect, Rgba, ViewChange, ViewChangeKind};
pub use value::Value;
