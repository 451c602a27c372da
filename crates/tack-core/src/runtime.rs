//! Remembered slots.
//!
//! A [`Composition`] is one component instance: the values it remembers
//! across passes plus the [`Scope`] its effects clean up into. Each call to
//! [`Composition::compose`] is one render pass; inside it, `remember*`
//! resolves against that composition.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::scope::Scope;

thread_local! {
    static COMPOSITIONS: RefCell<Vec<Weak<CompositionInner>>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone)]
pub struct Composition {
    inner: Rc<CompositionInner>,
}

struct CompositionInner {
    slots: RefCell<Vec<Box<dyn Any>>>,
    keyed_slots: RefCell<HashMap<String, Box<dyn Any>>>,
    cursor: Cell<usize>,
    passes: Cell<u64>,
    scope: Scope,
}

impl Composition {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(CompositionInner {
                slots: RefCell::new(Vec::new()),
                keyed_slots: RefCell::new(HashMap::new()),
                cursor: Cell::new(0),
                passes: Cell::new(0),
                scope: Scope::new(),
            }),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    /// Run one render pass.
    pub fn compose<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = ComposeGuard::begin(self);
        self.inner.scope.run(f)
    }

    /// Number of completed or in-flight passes.
    pub fn passes(&self) -> u64 {
        self.inner.passes.get()
    }

    pub fn slot_count(&self) -> usize {
        self.inner.slots.borrow().len() + self.inner.keyed_slots.borrow().len()
    }

    /// Tear down: run every cleanup, then drop all remembered values.
    pub fn dispose(self) {
        self.inner.scope.clone().dispose();
        let slots = std::mem::take(&mut *self.inner.slots.borrow_mut());
        let keyed = std::mem::take(&mut *self.inner.keyed_slots.borrow_mut());
        drop(slots);
        drop(keyed);
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a composition current for the duration of one pass.
pub struct ComposeGuard {
    _private: (),
}

impl ComposeGuard {
    pub fn begin(composition: &Composition) -> Self {
        let inner = &composition.inner;
        inner.cursor.set(0);
        inner.passes.set(inner.passes.get() + 1);
        COMPOSITIONS.with(|c| c.borrow_mut().push(Rc::downgrade(inner)));
        ComposeGuard { _private: () }
    }
}

impl Drop for ComposeGuard {
    fn drop(&mut self) {
        COMPOSITIONS.with(|c| {
            c.borrow_mut().pop();
        });
    }
}

fn current() -> Option<Rc<CompositionInner>> {
    COMPOSITIONS.with(|c| c.borrow().last().and_then(Weak::upgrade))
}

/// Slot-based remember (sequential composition only)
///
/// `init` runs while the slot table is borrowed and must not call `remember`.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let Some(c) = current() else {
        log::warn!("remember called outside of a composition; value will not persist");
        return Rc::new(init());
    };

    let cursor = c.cursor.get();
    c.cursor.set(cursor + 1);
    let mut slots = c.slots.borrow_mut();

    if cursor >= slots.len() {
        let rc: Rc<T> = Rc::new(init());
        slots.push(Box::new(rc.clone()));
        return rc;
    }

    if let Some(rc) = slots[cursor].downcast_ref::<Rc<T>>() {
        rc.clone()
    } else {
        // replace (else panics)
        log::warn!(
            "remember: slot {} type changed; replacing. \
             If this is due to conditional composition, prefer remember_with_key.",
            cursor
        );
        let rc: Rc<T> = Rc::new(init());
        slots[cursor] = Box::new(rc.clone());
        rc
    }
}

/// Key-based remember
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    let Some(c) = current() else {
        log::warn!("remember_with_key('{key}') called outside of a composition");
        return Rc::new(init());
    };
    let mut keyed = c.keyed_slots.borrow_mut();

    if let Some(existing) = keyed.get(&key) {
        if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
            return rc.clone();
        }
        log::warn!(
            "remember_with_key: key '{}' reused with a different type; replacing.",
            key
        );
    }

    let rc: Rc<T> = Rc::new(init());
    keyed.insert(key, Box::new(rc.clone()));
    rc
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> Rc<RefCell<T>> {
    remember_with_key(key, || RefCell::new(init()))
}
