//! Sequence state with value semantics.
//!
//! Every operation builds a fresh `Vec` and hands it to the cell with a
//! single [`StateCell::replace`], so observers see exactly one change per
//! operation and never a half-applied edit. Operations that address an index
//! outside the sequence do nothing at all: no replacement, no notification.

use std::marker::PhantomData;

use crate::{Signal, StateCell, remember};

pub struct ArrayState<T, C = Signal<Vec<T>>>
where
    C: StateCell<Vec<T>>,
{
    cell: C,
    _item: PhantomData<fn() -> T>,
}

impl<T: Clone + 'static> ArrayState<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::with_cell(Signal::new(items))
    }

    /// The underlying signal, for subscribing to replacements.
    pub fn signal(&self) -> &Signal<Vec<T>> {
        &self.cell
    }
}

impl<T: Clone, C: StateCell<Vec<T>>> ArrayState<T, C> {
    /// Wrap an existing cell supplied by the host runtime.
    pub fn with_cell(cell: C) -> Self {
        Self {
            cell,
            _item: PhantomData,
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.cell.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.cell.with(|v| f(v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.cell.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.cell.with(|v| v.get(index).cloned())
    }

    pub fn push(&self, element: T) {
        let next = self.cell.with(|v| {
            let mut next = Vec::with_capacity(v.len() + 1);
            next.extend_from_slice(v);
            next.push(element);
            next
        });
        self.cell.replace(next);
    }

    pub fn update(&self, index: usize, element: T) {
        let next = self.cell.with(|v| {
            if index >= v.len() {
                return None;
            }
            let mut next = v.clone();
            next[index] = element;
            Some(next)
        });
        match next {
            Some(next) => self.cell.replace(next),
            None => log::debug!("array update: index {index} out of range; ignored"),
        }
    }

    pub fn remove(&self, index: usize) {
        let next = self.cell.with(|v| {
            if index >= v.len() {
                return None;
            }
            let mut next = Vec::with_capacity(v.len() - 1);
            next.extend_from_slice(&v[..index]);
            next.extend_from_slice(&v[index + 1..]);
            Some(next)
        });
        match next {
            Some(next) => self.cell.replace(next),
            None => log::debug!("array remove: index {index} out of range; ignored"),
        }
    }

    /// Keep only the elements matching `predicate`, preserving order.
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) {
        let next: Vec<T> = self
            .cell
            .with(|v| v.iter().filter(|e| predicate(e)).cloned().collect());
        self.cell.replace(next);
    }

    pub fn clear(&self) {
        self.cell.replace(Vec::new());
    }
}

impl<T, C> Clone for ArrayState<T, C>
where
    C: StateCell<Vec<T>> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            _item: PhantomData,
        }
    }
}

/// Remembered sequence state. `None` starts from an empty sequence.
pub fn remember_array<T: Clone + 'static>(init: Option<Vec<T>>) -> ArrayState<T> {
    let cell = remember(|| Signal::new(init.unwrap_or_default()));
    ArrayState::with_cell((*cell).clone())
}
