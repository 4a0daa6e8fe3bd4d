//! Visual entities: the behavior contract, the reactive core, and the
//! built-in shape kinds.

pub mod behavior;
pub mod core;
pub mod shapes;

pub use behavior::{Behavior, Frame, Input, ParamValue, StyleValues};
pub use core::{Entity, EntityOptions, Inputs, Snapshot, StyleInputs};
pub use shapes::{Disc, Label, Segment};
