//! Host-runtime seams.
//!
//! Helpers never reach for ambient globals to store state or schedule
//! effects. They take one of these interfaces instead, so a host runtime (or
//! a test) can hand in its own implementation. [`Signal`] and
//! [`Scope`](crate::Scope) are the implementations shipped with this crate.

use crate::{Dispose, Signal};

/// A replaceable unit of observable state.
pub trait StateCell<T> {
    /// Borrow the current value.
    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R;

    /// Swap in a new value and notify observers. Exactly one notification per
    /// call.
    fn replace(&self, value: T);

    fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }
}

impl<T> StateCell<T> for Signal<T> {
    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        Signal::with(self, f)
    }

    fn replace(&self, value: T) {
        self.set(value)
    }
}

/// Runs an effect and owns its cleanup until teardown.
pub trait EffectScheduler {
    /// Run `effect` now. The returned [`Dispose`] must run exactly once, when
    /// the scheduler is torn down (or earlier if the caller runs it).
    fn launch(&self, effect: Box<dyn FnOnce() -> Dispose>) -> Dispose;
}

/// Runs effects immediately and never tears them down on its own.
///
/// Useful outside any component, where the caller drives cleanup by running
/// the returned `Dispose` directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

impl EffectScheduler for Detached {
    fn launch(&self, effect: Box<dyn FnOnce() -> Dispose>) -> Dispose {
        effect()
    }
}
