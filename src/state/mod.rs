//! Interaction state: pointer and keyboard dispatch.

pub mod keyboard;
pub mod pointer;

pub use keyboard::{KeyDispatcher, KeyEvent, KeyHandler, Modifiers};
pub use pointer::{InteractionController, PointerEvent, ViewHandler};
