//! Value - reactive input wrapper.
//!
//! Every entity parameter is a `Value<T>`: a static literal, a reactive
//! signal, or a zero-argument getter re-evaluated each step. The dynamic
//! variants are what make an entity's geometry track other live objects
//! (a circle whose radius is a getter over two draggable points, say).
//!
//! An entity holding at least one dynamic value registers as steppable.
//! That promotion is one-way: replacing the value with a static later does
//! not unregister the entity, which keeps lifecycle bookkeeping trivial at
//! the cost of the occasional needless poll.

use std::rc::Rc;

use spark_signals::Signal;

// =============================================================================
// Value - Static | Signal | Getter
// =============================================================================

/// A parameter value that can be static, a signal, or a getter.
///
/// This makes the constant-vs-producer distinction explicit at the type
/// level; nothing inspects values at runtime to decide how to evaluate them.
#[derive(Clone)]
pub enum Value<T: Clone + PartialEq + 'static> {
    /// Static value (not reactive).
    Static(T),
    /// Reactive signal (re-read every step).
    Signal(Signal<T>),
    /// Getter function (called each time the value is needed).
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> Value<T> {
    /// Wrap a zero-argument producer.
    pub fn getter(f: impl Fn() -> T + 'static) -> Self {
        Value::Getter(Rc::new(f))
    }

    /// Resolve the current value.
    pub fn get(&self) -> T {
        match self {
            Value::Static(v) => v.clone(),
            Value::Signal(s) => s.get(),
            Value::Getter(f) => f(),
        }
    }

    /// Whether the value must be re-resolved every step.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Value::Static(_))
    }

    /// Read the static payload, if this value is static.
    pub fn as_static(&self) -> Option<&T> {
        match self {
            Value::Static(v) => Some(v),
            _ => None,
        }
    }

    /// Replace the payload of a static value in place.
    ///
    /// Used by drag translation, which is only ever applied to static
    /// positions. No-op on dynamic values.
    pub fn set_static(&mut self, v: T) {
        if matches!(self, Value::Static(_)) {
            *self = Value::Static(v);
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Value<T> {
    fn default() -> Self {
        Value::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Value::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for Value<T> {
    fn from(signal: Signal<T>) -> Self {
        Value::Signal(signal)
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug + 'static> std::fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Value::Signal(s) => f.debug_tuple("Signal").field(&s.get()).finish(),
            Value::Getter(_) => f.write_str("Getter(..)"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
