use std::cell::RefCell;
use std::rc::Rc;

use crate::{Detached, Dispose, EffectScheduler, on_unmount, remember};

/// An effect that re-runs when its key changes.
///
/// The previous run's cleanup always runs before the next run, and the last
/// cleanup runs when the owning scheduler is torn down. After teardown further
/// `run` calls are ignored.
pub struct KeyedEffect<K> {
    state: Rc<RefCell<KeyedState<K>>>,
}

struct KeyedState<K> {
    last_key: Option<K>,
    cleanup: Option<Dispose>,
    torn_down: bool,
}

impl<K: PartialEq + 'static> KeyedEffect<K> {
    pub fn new(scheduler: &impl EffectScheduler) -> Self {
        let state = Rc::new(RefCell::new(KeyedState {
            last_key: None,
            cleanup: None,
            torn_down: false,
        }));

        let teardown_state = state.clone();
        scheduler.launch(Box::new(move || {
            on_unmount(move || {
                let cleanup = {
                    let mut s = teardown_state.borrow_mut();
                    s.torn_down = true;
                    s.last_key = None;
                    s.cleanup.take()
                };
                if let Some(d) = cleanup {
                    d.run();
                }
            })
        }));

        Self { state }
    }

    /// Run `effect` if `key` differs from the last run. Returns whether it ran.
    pub fn run(&self, key: K, effect: impl FnOnce() -> Dispose) -> bool {
        let prev = {
            let mut s = self.state.borrow_mut();
            if s.torn_down {
                log::debug!("keyed effect torn down; ignoring run");
                return false;
            }
            if s.last_key.as_ref() == Some(&key) {
                return false;
            }
            s.last_key = Some(key);
            s.cleanup.take()
        };

        if let Some(d) = prev {
            d.run();
        }

        let d = effect();
        self.state.borrow_mut().cleanup = Some(d);
        true
    }

    /// Run the current cleanup now and forget the key, so the next `run`
    /// always fires.
    pub fn reset(&self) {
        let cleanup = {
            let mut s = self.state.borrow_mut();
            s.last_key = None;
            s.cleanup.take()
        };
        if let Some(d) = cleanup {
            d.run();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.borrow().torn_down
    }
}

/// cleanup on key change or unmount
///
/// Slot-based: the Nth call in a composition pass is the Nth keyed effect.
pub fn disposable_effect<K: PartialEq + 'static>(
    key: K,
    effect: impl FnOnce() -> Dispose + 'static,
) {
    let keyed = remember(|| match crate::scope::current_scope() {
        Some(scope) => KeyedEffect::new(&scope),
        None => KeyedEffect::new(&Detached),
    });
    keyed.run(key, effect);
}
