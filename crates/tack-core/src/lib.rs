//! # State cells, scopes, and small state helpers
//!
//! Tack is a handful of ergonomic shims for component-local UI state. It is
//! not a framework: every helper is a thin layer over three primitives.
//!
//! - `Signal<T>`: an observable, replaceable value.
//! - `Scope` / `Dispose`: cleanup that runs when a component tears down.
//! - `remember*`: values that survive from one render pass to the next.
//!
//! ## Signals
//!
//! ```rust
//! use tack_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! ## Components and remembered state
//!
//! A [`Composition`] stands in for one mounted component. Each
//! `compose` call is a render pass; `remember*` hands back the same value on
//! every pass, by call order or by key.
//!
//! ```rust
//! use tack_core::*;
//!
//! let todo_list = Composition::new();
//! for _ in 0..2 {
//!     todo_list.compose(|| {
//!         let todos = remember_array(Some(vec!["write docs"]));
//!         if todos.len() == 1 {
//!             todos.push("ship it");
//!         }
//!     });
//! }
//! ```
//!
//! ## Effects and cleanup
//!
//! ```rust
//! use tack_core::*;
//!
//! let widget = Composition::new();
//! widget.compose(|| {
//!     scoped_effect(|| {
//!         log::info!("mounted");
//!         on_unmount(|| log::info!("unmounted"))
//!     });
//! });
//! widget.dispose(); // logs "unmounted"
//! ```
//!
//! Helpers that need a runtime take it explicitly through the [`StateCell`]
//! and [`EffectScheduler`] traits, so they can be driven by a test harness or
//! a different host as easily as by [`Signal`] and [`Scope`].

pub mod array;
pub mod cell;
pub mod effects;
pub mod effects_ext;
pub mod locals;
pub mod prelude;
pub mod runtime;
pub mod scope;
pub mod signal;
pub mod state;
pub mod timer;

pub use array::*;
pub use cell::*;
pub use effects::*;
pub use effects_ext::*;
pub use locals::*;
pub use runtime::*;
pub use scope::*;
pub use signal::*;
pub use state::*;
pub use timer::*;

// Re-exported so doc examples and downstream crates share one facade.
pub use log;
