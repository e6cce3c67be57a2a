//! Debounced rebuild triggering.
//!
//! Filesystem notifications arrive on the watcher's notification thread,
//! often several for a single saved file. The trigger collapses each burst
//! into one rebuild, run on the serialized execution context where the
//! rebuild operation is safe to invoke.
//!
//! Coalescing works through an armed flag: the first notification after
//! the trigger is disarmed schedules the fire task, and every further
//! notification while armed is already covered by that queued task. The
//! fire task disarms *before* rebuilding, so a write landing mid-rebuild
//! re-arms and produces a follow-up rebuild rather than being dropped.
//! A very tight overlap can therefore rebuild twice; it can never rebuild
//! zero times. Rebuilds are assumed idempotent, so the extra run is
//! harmless.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

use crate::context::MainContextHandle;
use crate::error::RebuildError;

/// The injected rebuild operation.
///
/// Implementations must tolerate redundant invocation: the trigger
/// guarantees at least one call per burst of notifications and may call
/// twice when a write lands while a rebuild is in flight. The call happens
/// on the execution context thread.
pub trait RebuildRunner: Send + Sync {
    /// Performs one rebuild.
    fn rebuild(&self) -> Result<(), RebuildError>;
}

/// Collapses bursts of change notifications into single rebuild calls.
///
/// Cloning shares the underlying state: the watch callback keeps one
/// clone for [`notify`], the owner keeps another for [`suspend`] at
/// teardown.
///
/// [`notify`]: DebouncedTrigger::notify
/// [`suspend`]: DebouncedTrigger::suspend
#[derive(Clone)]
pub struct DebouncedTrigger {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: MainContextHandle,
    runner: Arc<dyn RebuildRunner>,
    /// True from the notification that schedules the fire task until that
    /// task starts rebuilding. At most one fire task is queued while set.
    armed: AtomicBool,
    /// False after suspend(); notifications are ignored and an already
    /// queued fire task becomes a no-op.
    active: AtomicBool,
}

impl DebouncedTrigger {
    /// Creates a trigger that rebuilds through `runner` on `ctx`.
    pub fn new(ctx: MainContextHandle, runner: Arc<dyn RebuildRunner>) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                runner,
                armed: AtomicBool::new(false),
                active: AtomicBool::new(true),
            }),
        }
    }

    /// Records a raw change notification. Callable from any thread.
    pub fn notify(&self) {
        let inner = &self.inner;
        if !inner.active.load(Ordering::SeqCst) {
            return;
        }
        if inner.armed.swap(true, Ordering::SeqCst) {
            // A fire task is already queued; it covers this write too.
            return;
        }

        let fire = Arc::clone(inner);
        if !inner.ctx.schedule(move || fire.fire()) {
            // Context is gone; disarm so a later context restart is not
            // wedged waiting on a task that will never run.
            inner.armed.store(false, Ordering::SeqCst);
        }
    }

    /// Stops queued and future fires until [`resume`]. Called at watch
    /// teardown so a callback already on the queue does not rebuild
    /// against a dead watch.
    ///
    /// [`resume`]: DebouncedTrigger::resume
    pub fn suspend(&self) {
        self.inner.active.store(false, Ordering::SeqCst);
    }

    /// Re-enables firing after [`suspend`].
    ///
    /// [`suspend`]: DebouncedTrigger::suspend
    pub fn resume(&self) {
        self.inner.active.store(true, Ordering::SeqCst);
    }

    /// Whether a fire task is currently queued.
    pub fn is_armed(&self) -> bool {
        self.inner.armed.load(Ordering::SeqCst)
    }
}

impl Inner {
    /// Runs on the execution context: disarm, then rebuild once.
    fn fire(&self) {
        // Disarm first, so a notification arriving while the rebuild runs
        // schedules a fresh fire task instead of being lost.
        self.armed.store(false, Ordering::SeqCst);

        if !self.active.load(Ordering::SeqCst) {
            debug!("trigger suspended, skipping rebuild");
            return;
        }

        // A failed rebuild must neither kill the context loop nor leave
        // the trigger wedged, so runner errors and panics both stop here.
        match catch_unwind(AssertUnwindSafe(|| self.runner.rebuild())) {
            Ok(Ok(())) => debug!("rebuild complete"),
            Ok(Err(e)) => error!("rebuild failed: {}", e),
            Err(_) => error!("rebuild runner panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MainContext;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    #[derive(Default)]
    struct CountingRunner {
        calls: AtomicUsize,
        fail_first: bool,
        panic_first: bool,
    }

    impl CountingRunner {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RebuildRunner for CountingRunner {
        fn rebuild(&self) -> Result<(), RebuildError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 && self.panic_first {
                panic!("simulated runner panic");
            }
            if call == 0 && self.fail_first {
                return Err(RebuildError::failed("simulated rebuild failure"));
            }
            Ok(())
        }
    }

    fn setup(runner: CountingRunner) -> (MainContextHandle, Arc<CountingRunner>, DebouncedTrigger) {
        let ctx = MainContext::spawn();
        let runner = Arc::new(runner);
        let trigger = DebouncedTrigger::new(ctx.clone(), runner.clone());
        (ctx, runner, trigger)
    }

    /// Parks the context in a task until the returned sender is dropped,
    /// so notifications land while the fire task is still queued.
    fn block_context(ctx: &MainContextHandle) -> mpsc::Sender<()> {
        let (tx, rx) = mpsc::channel();
        ctx.schedule(move || {
            let _ = rx.recv();
        });
        tx
    }

    /// Waits until every task queued so far has run.
    fn drain(ctx: &MainContextHandle) {
        let (tx, rx) = mpsc::channel();
        ctx.schedule(move || {
            let _ = tx.send(());
        });
        rx.recv().unwrap();
    }

    #[test]
    fn test_burst_yields_exactly_one_rebuild() {
        let (ctx, runner, trigger) = setup(CountingRunner::default());

        let gate = block_context(&ctx);
        trigger.notify();
        trigger.notify();
        trigger.notify();
        assert!(trigger.is_armed());
        drop(gate);
        drain(&ctx);

        assert_eq!(runner.calls(), 1);
        assert!(!trigger.is_armed());
    }

    #[test]
    fn test_quiet_trigger_never_fires() {
        let (ctx, runner, _trigger) = setup(CountingRunner::default());
        drain(&ctx);
        assert_eq!(runner.calls(), 0);
    }

    #[test]
    fn test_rearms_after_each_fire() {
        let (ctx, runner, trigger) = setup(CountingRunner::default());

        trigger.notify();
        drain(&ctx);
        assert_eq!(runner.calls(), 1);

        trigger.notify();
        drain(&ctx);
        assert_eq!(runner.calls(), 2);
    }

    #[test]
    fn test_suspended_trigger_ignores_notifications() {
        let (ctx, runner, trigger) = setup(CountingRunner::default());

        trigger.suspend();
        trigger.notify();
        drain(&ctx);
        assert_eq!(runner.calls(), 0);
        assert!(!trigger.is_armed());

        trigger.resume();
        trigger.notify();
        drain(&ctx);
        assert_eq!(runner.calls(), 1);
    }

    #[test]
    fn test_suspend_defuses_an_already_queued_fire() {
        let (ctx, runner, trigger) = setup(CountingRunner::default());

        // Teardown race: the fire task is queued, then the watch dies.
        let gate = block_context(&ctx);
        trigger.notify();
        trigger.suspend();
        drop(gate);
        drain(&ctx);

        assert_eq!(runner.calls(), 0);
        // The skipped fire still disarmed, so resuming works normally.
        trigger.resume();
        trigger.notify();
        drain(&ctx);
        assert_eq!(runner.calls(), 1);
    }

    #[test]
    fn test_failed_rebuild_does_not_wedge_the_trigger() {
        let (ctx, runner, trigger) = setup(CountingRunner {
            fail_first: true,
            ..Default::default()
        });

        trigger.notify();
        drain(&ctx);
        trigger.notify();
        drain(&ctx);

        // First call failed, second ran anyway.
        assert_eq!(runner.calls(), 2);
    }

    #[test]
    fn test_panicking_runner_does_not_kill_the_context() {
        let (ctx, runner, trigger) = setup(CountingRunner {
            panic_first: true,
            ..Default::default()
        });

        trigger.notify();
        drain(&ctx);
        trigger.notify();
        drain(&ctx);

        assert_eq!(runner.calls(), 2);
    }
}
