//! # Composition locals
//!
//! Values provided to a subtree without threading them through every call.
//! A local is keyed by its type: providing a `T` shadows any outer `T` until
//! the provider returns.
//!
//! ```rust
//! use tack_core::*;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Locale(&'static str);
//!
//! provide_local(Locale("fr"), || {
//!     assert_eq!(local::<Locale>(), Some(Locale("fr")));
//! });
//! assert_eq!(local::<Locale>(), None);
//! ```
//!
//! Locals are read-only from the consumer's side. Helpers such as the routing
//! context in `tack-navigation` build typed accessors on top of these.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static LOCALS_STACK: RefCell<Vec<HashMap<TypeId, Box<dyn Any>>>> = RefCell::new(Vec::new());
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

fn set_local_boxed(t: TypeId, v: Box<dyn Any>) {
    LOCALS_STACK.with(|st| {
        if let Some(top) = st.borrow_mut().last_mut() {
            top.insert(t, v);
        }
    });
}

/// Provide `value` to everything `f` composes.
pub fn provide_local<T: 'static, R>(value: T, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<T>(), Box::new(value));
        f()
    })
}

/// Innermost provided `T`, if any.
pub fn local<T: Clone + 'static>() -> Option<T> {
    LOCALS_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(t) = v.downcast_ref::<T>()
            {
                return Some(t.clone());
            }
        }
        None
    })
}

pub fn local_or_default<T: Clone + Default + 'static>() -> T {
    local::<T>().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Depth(u32);

    #[test]
    fn inner_provider_shadows_outer() {
        provide_local(Depth(1), || {
            assert_eq!(local::<Depth>(), Some(Depth(1)));
            provide_local(Depth(2), || {
                assert_eq!(local::<Depth>(), Some(Depth(2)));
            });
            assert_eq!(local::<Depth>(), Some(Depth(1)));
        });
        assert_eq!(local_or_default::<Depth>(), Depth(0));
    }

    #[test]
    fn frame_pops_on_panic() {
        let r = std::panic::catch_unwind(|| {
            provide_local(Depth(7), || -> u32 { panic!("boom") });
        });
        assert!(r.is_err());
        assert_eq!(local::<Depth>(), None);
    }
}
