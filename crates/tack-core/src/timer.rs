//! # One-shot timers
//!
//! Deferred callbacks run on the host's cooperative event loop: nothing here
//! spawns a thread or sleeps. The loop calls [`Timers::run_due`] whenever it
//! wakes (each frame, or at [`Timers::next_deadline`]), and due callbacks run
//! right there on the UI thread.
//!
//! ```rust
//! use std::time::Duration;
//! use tack_core::*;
//!
//! let clock = ManualClock::new();
//! let timers = Timers::with_clock(clock.clone());
//! let saved = signal(false);
//!
//! let t = timers.schedule(Duration::from_millis(500), {
//!     let saved = saved.clone();
//!     move || saved.set(true)
//! });
//!
//! clock.advance(Duration::from_millis(499));
//! timers.run_due();
//! assert!(!saved.get());
//!
//! clock.advance(Duration::from_millis(1));
//! timers.run_due();
//! assert!(saved.get());
//! assert!(!t.is_pending());
//! ```
//!
//! A [`Timeout`] is released on every exit path: it leaves the queue when it
//! fires, when it is reset or cancelled, and when the last handle is dropped.
//! Tie it to a component with [`timeout_effect`] so teardown cancels it too.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use web_time::Instant;

use crate::{Dispose, EffectScheduler, Signal, on_unmount};

pub trait Clock: 'static {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    t: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(t: Instant) -> Self {
        Self {
            t: Rc::new(Cell::new(t)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.t.set(self.t.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.t.get()
    }
}

new_key_type! {
    pub struct TimerId;
}

type Callback = Rc<RefCell<dyn FnMut()>>;

struct Entry {
    deadline: Instant,
    seq: u64,
    callback: Callback,
}

struct Queue {
    entries: SlotMap<TimerId, Entry>,
    next_seq: u64,
}

/// Cooperative one-shot timer queue. Clones share the same queue.
#[derive(Clone)]
pub struct Timers {
    queue: Rc<RefCell<Queue>>,
    clock: Rc<dyn Clock>,
}

impl Timers {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock) -> Self {
        Self {
            queue: Rc::new(RefCell::new(Queue {
                entries: SlotMap::with_key(),
                next_seq: 0,
            })),
            clock: Rc::new(clock),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// A handle that is not armed yet; call [`Timeout::reset`] to arm it.
    pub fn timeout(&self, f: impl FnMut() + 'static) -> Timeout {
        Timeout {
            inner: Rc::new(TimeoutInner {
                timers: self.clone(),
                callback: Rc::new(RefCell::new(f)),
                id: Cell::new(None),
            }),
        }
    }

    /// Arm `f` to run once, `delay` from now.
    pub fn schedule(&self, delay: Duration, f: impl FnMut() + 'static) -> Timeout {
        let t = self.timeout(f);
        t.reset(delay);
        t
    }

    /// Number of armed timeouts.
    pub fn pending(&self) -> usize {
        self.queue.borrow().entries.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.borrow().entries.values().map(|e| e.deadline).min()
    }

    /// Fire every timeout that was due when the call began, earliest first.
    ///
    /// Timeouts armed by a callback during this call wait for the next one.
    pub fn run_due(&self) -> usize {
        let now = self.clock.now();
        let mut due: Vec<(Instant, u64, TimerId)> = self
            .queue
            .borrow()
            .entries
            .iter()
            .filter(|(_, e)| e.deadline <= now)
            .map(|(id, e)| (e.deadline, e.seq, id))
            .collect();
        due.sort_unstable_by_key(|&(deadline, seq, _)| (deadline, seq));

        let mut fired = 0;
        for (_, _, id) in due {
            // An earlier callback may have cancelled or reset this one.
            let Some(entry) = self.queue.borrow_mut().entries.remove(id) else {
                continue;
            };
            match entry.callback.try_borrow_mut() {
                Ok(mut f) => {
                    (&mut *f)();
                    fired += 1;
                }
                Err(_) => log::warn!("timer {id:?} fired while its callback was running; skipped"),
            }
        }
        if fired > 0 {
            log::trace!("fired {fired} timer(s)");
        }
        fired
    }

    fn arm(&self, deadline: Instant, callback: Callback) -> TimerId {
        let mut q = self.queue.borrow_mut();
        let seq = q.next_seq;
        q.next_seq += 1;
        q.entries.insert(Entry {
            deadline,
            seq,
            callback,
        })
    }

    fn disarm(&self, id: TimerId) -> bool {
        self.queue.borrow_mut().entries.remove(id).is_some()
    }

    fn deadline_of(&self, id: TimerId) -> Option<Instant> {
        self.queue.borrow().entries.get(id).map(|e| e.deadline)
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a one-shot timeout. Clones share the handle; dropping the last
/// one cancels it.
#[derive(Clone)]
pub struct Timeout {
    inner: Rc<TimeoutInner>,
}

struct TimeoutInner {
    timers: Timers,
    callback: Callback,
    id: Cell<Option<TimerId>>,
}

impl Timeout {
    /// Re-arm `delay` from now, replacing any pending deadline.
    ///
    /// A delay too large to represent as a deadline leaves the timeout
    /// disarmed: it would never come due anyway.
    pub fn reset(&self, delay: Duration) {
        self.cancel();
        let Some(deadline) = self.inner.timers.now().checked_add(delay) else {
            log::debug!("timeout delay {delay:?} overflows the clock; left disarmed");
            return;
        };
        let id = self.inner.timers.arm(deadline, self.inner.callback.clone());
        log::trace!("timer {id:?} armed for {delay:?}");
        self.inner.id.set(Some(id));
    }

    /// Returns whether a pending deadline was actually removed.
    pub fn cancel(&self) -> bool {
        self.inner.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner
            .id
            .get()
            .and_then(|id| self.inner.timers.deadline_of(id))
    }

    fn downgrade(&self) -> Weak<TimeoutInner> {
        Rc::downgrade(&self.inner)
    }
}

impl TimeoutInner {
    fn cancel(&self) -> bool {
        match self.id.take() {
            Some(id) => self.timers.disarm(id),
            None => false,
        }
    }
}

impl Drop for TimeoutInner {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Arm a timeout owned by `scheduler`: it is cancelled on teardown even if
/// the caller drops the returned handle.
pub fn timeout_effect(
    scheduler: &impl EffectScheduler,
    timers: &Timers,
    delay: Duration,
    f: impl FnMut() + 'static,
) -> Timeout {
    let timeout = timers.schedule(delay, f);
    let owned = timeout.clone();
    scheduler.launch(Box::new(move || {
        on_unmount(move || {
            if owned.cancel() {
                log::debug!("pending timeout cancelled on teardown");
            }
        })
    }));
    timeout
}

/// A signal that settles: writes land in [`Debounced::signal`] only after no
/// further write arrived for `delay`.
pub struct Debounced<T: 'static> {
    settled: Signal<T>,
    latest: Rc<RefCell<Option<T>>>,
    timeout: Timeout,
    delay: Duration,
}

impl<T: 'static> Debounced<T> {
    pub fn new(timers: &Timers, initial: T, delay: Duration) -> Self {
        let settled = Signal::new(initial);
        let latest: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
        let timeout = timers.timeout({
            let settled = settled.clone();
            let latest = latest.clone();
            move || {
                let next = latest.borrow_mut().take();
                if let Some(v) = next {
                    settled.set(v);
                }
            }
        });
        Self {
            settled,
            latest,
            timeout,
            delay,
        }
    }

    /// Record a write and restart the quiet period.
    pub fn set(&self, value: T) {
        *self.latest.borrow_mut() = Some(value);
        self.timeout.reset(self.delay);
    }

    /// The settled value.
    pub fn signal(&self) -> &Signal<T> {
        &self.settled
    }

    pub fn is_settling(&self) -> bool {
        self.timeout.is_pending()
    }

    /// Apply the pending write now.
    pub fn flush(&self) {
        self.timeout.cancel();
        let next = self.latest.borrow_mut().take();
        if let Some(v) = next {
            self.settled.set(v);
        }
    }

    /// Drop the pending write.
    pub fn cancel(&self) {
        self.timeout.cancel();
        self.latest.borrow_mut().take();
    }

    /// Cancel the pending write when `scheduler` tears down.
    pub fn bind(&self, scheduler: &impl EffectScheduler) -> Dispose {
        let weak = self.timeout.downgrade();
        let latest = Rc::downgrade(&self.latest);
        scheduler.launch(Box::new(move || {
            on_unmount(move || {
                if let Some(t) = weak.upgrade() {
                    t.cancel();
                }
                if let Some(latest) = latest.upgrade() {
                    latest.borrow_mut().take();
                }
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scope;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move || h.set(h.get() + 1))
    }

    #[test]
    fn fires_once_at_deadline() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let (hits, f) = counter();
        let t = timers.schedule(ms(100), f);

        assert_eq!(timers.run_due(), 0);
        clock.advance(ms(100));
        assert_eq!(timers.run_due(), 1);
        assert_eq!(hits.get(), 1);
        assert!(!t.is_pending());

        clock.advance(ms(1000));
        assert_eq!(timers.run_due(), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn unrepresentable_delay_never_fires() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let (hits, f) = counter();
        let t = timers.schedule(ms(10), f);

        t.reset(Duration::MAX);
        assert!(!t.is_pending());
        assert_eq!(timers.pending(), 0);

        let _forever = timers.schedule(Duration::MAX, || {});
        clock.advance(ms(1000));
        assert_eq!(timers.run_due(), 0);
        assert_eq!(hits.get(), 0);

        let query = Debounced::new(&timers, 0, Duration::MAX);
        query.set(1);
        assert!(!query.is_settling());
        query.flush();
        assert_eq!(query.signal().get(), 1);
    }

    #[test]
    fn cancel_and_drop_release_the_slot() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let (hits, f) = counter();
        let t = timers.schedule(ms(10), f);
        assert!(t.cancel());
        assert!(!t.cancel());

        let (hits2, g) = counter();
        let dropped = timers.schedule(ms(10), g);
        assert_eq!(timers.pending(), 1);
        drop(dropped);
        assert_eq!(timers.pending(), 0);

        clock.advance(ms(50));
        timers.run_due();
        assert_eq!(hits.get(), 0);
        assert_eq!(hits2.get(), 0);
    }

    #[test]
    fn reset_postpones_and_rearms_after_fire() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let (hits, f) = counter();
        let t = timers.schedule(ms(100), f);

        clock.advance(ms(80));
        t.reset(ms(100));
        clock.advance(ms(80));
        timers.run_due();
        assert_eq!(hits.get(), 0);
        assert_eq!(timers.pending(), 1);

        clock.advance(ms(20));
        timers.run_due();
        assert_eq!(hits.get(), 1);

        t.reset(ms(5));
        clock.advance(ms(5));
        timers.run_due();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn due_timers_fire_in_deadline_order() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let order = Rc::new(RefCell::new(Vec::new()));
        let mk = |tag: &'static str| {
            let order = order.clone();
            move || order.borrow_mut().push(tag)
        };
        let _c = timers.schedule(ms(30), mk("c"));
        let _a = timers.schedule(ms(10), mk("a"));
        let _b = timers.schedule(ms(20), mk("b"));
        assert_eq!(timers.next_deadline(), Some(clock.now() + ms(10)));

        clock.advance(ms(30));
        assert_eq!(timers.run_due(), 3);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn equal_deadlines_fire_in_arming_order() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let order = Rc::new(RefCell::new(Vec::new()));
        let mk = |tag: &'static str| {
            let order = order.clone();
            move || order.borrow_mut().push(tag)
        };
        let first = timers.schedule(ms(10), mk("first"));
        let _second = timers.schedule(ms(10), mk("second"));
        let _third = timers.schedule(ms(10), mk("third"));
        // Re-arming moves a timeout to the back of its deadline group.
        first.reset(ms(10));

        clock.advance(ms(10));
        assert_eq!(timers.run_due(), 3);
        assert_eq!(*order.borrow(), vec!["second", "third", "first"]);
    }

    #[test]
    fn callback_cancelling_a_later_timer_wins() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let (hits, f) = counter();
        let victim = timers.schedule(ms(20), f);
        let _killer = timers.schedule(ms(10), {
            let victim = victim.clone();
            move || {
                victim.cancel();
            }
        });

        clock.advance(ms(20));
        assert_eq!(timers.run_due(), 1);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn scope_teardown_cancels_timeout_effect() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let scope = Scope::new();
        let (hits, f) = counter();

        let t = timeout_effect(&scope, &timers, ms(50), f);
        drop(t);
        // The scope keeps it alive.
        assert_eq!(timers.pending(), 1);

        scope.dispose();
        assert_eq!(timers.pending(), 0);
        clock.advance(ms(100));
        timers.run_due();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn debounced_settles_after_quiet_period() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let query = Debounced::new(&timers, String::new(), ms(300));

        query.set("r".into());
        clock.advance(ms(100));
        timers.run_due();
        query.set("ru".into());
        clock.advance(ms(200));
        timers.run_due();
        query.set("rust".into());
        assert_eq!(query.signal().get(), "");
        assert!(query.is_settling());

        clock.advance(ms(300));
        timers.run_due();
        assert_eq!(query.signal().get(), "rust");
        assert!(!query.is_settling());
        assert_eq!(query.signal().version(), 1);
    }

    #[test]
    fn debounced_flush_and_teardown() {
        let clock = ManualClock::new();
        let timers = Timers::with_clock(clock.clone());
        let value = Debounced::new(&timers, 0, ms(10));

        value.set(1);
        value.flush();
        assert_eq!(value.signal().get(), 1);
        assert_eq!(timers.pending(), 0);

        let scope = Scope::new();
        value.bind(&scope);
        value.set(2);
        scope.dispose();
        clock.advance(ms(10));
        timers.run_due();
        assert_eq!(value.signal().get(), 1);
    }
}
