pub use crate::array::{ArrayState, remember_array};
pub use crate::cell::{Detached, EffectScheduler, StateCell};
pub use crate::effects::{Dispose, effect, on_unmount};
pub use crate::effects_ext::{KeyedEffect, disposable_effect};
pub use crate::locals::{local, local_or_default, provide_local};
pub use crate::runtime::{
    ComposeGuard, Composition, remember, remember_state, remember_state_with_key,
    remember_with_key,
};
pub use crate::scope::{Scope, current_scope, scoped_effect};
pub use crate::signal::{Signal, SubId, signal};
pub use crate::state::{Mode, remember_mode, remember_nullable};
pub use crate::timer::{
    Clock, Debounced, ManualClock, SystemClock, Timeout, Timers, timeout_effect,
};
