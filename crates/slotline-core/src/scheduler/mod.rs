//! Refresh scheduler: decides when and in which batch slots are (re)requested.
//! - Owns the interval table and the single-request batcher behind one lock.
//! - Calls the sink and the visibility oracle only with that lock released.
//! - Dispatches initial loads immediately or through the batcher.
//! - Runs one periodic timer per slot, skipping ticks while the slot is hidden.
mod completion;
pub use completion::Completion;

mod config;
pub use config::{DEFAULT_EVENT_CAPACITY, SchedulerConfig};

mod request;
pub use request::RefreshRequest;

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use slotline_model::{RefreshInterval, SlotHandle, SlotKey};
use tokio::{
    runtime::Handle,
    sync::broadcast,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};

use crate::{
    batcher::{Batch, SingleRequestBatcher, Waiter},
    error::SchedulerError,
    event::{Observe, RefreshEvent, spawn_observer},
    metrics::{DispatchKind, IntervalChange, MetricsHandle, noop_metrics},
    registry::{IntervalRegistry, TimerHandle},
    sink::{Command, CommandSink},
    visibility::{AlwaysVisible, VisibilityOracle},
};

/// Builder for [`RefreshScheduler`].
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    sink: Arc<dyn CommandSink>,
    oracle: Arc<dyn VisibilityOracle>,
    metrics: MetricsHandle,
}

impl SchedulerBuilder {
    /// Replace the configuration.
    pub fn with_config(mut self, cfg: SchedulerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the visibility oracle consulted on every periodic tick.
    ///
    /// Defaults to [`AlwaysVisible`].
    pub fn with_visibility(mut self, oracle: Arc<dyn VisibilityOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Set the metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Build the scheduler.
    pub fn build(self) -> RefreshScheduler {
        let (events, _) = broadcast::channel(self.cfg.event_capacity.max(1));
        let batch = SingleRequestBatcher::new(self.cfg.batch_window());

        info!(
            single_request_mode = self.cfg.single_request_mode,
            batch_window_ms = self.cfg.batch_window_ms,
            "refresh scheduler ready"
        );
        RefreshScheduler {
            shared: Arc::new(Shared {
                cfg: self.cfg,
                sink: self.sink,
                oracle: self.oracle,
                metrics: self.metrics,
                events,
                state: Mutex::new(State {
                    intervals: IntervalRegistry::new(),
                    batch,
                    outbox: VecDeque::new(),
                }),
                draining: AtomicBool::new(false),
            }),
        }
    }
}

/// Orchestrates immediate dispatch, single-request batching and periodic refresh of ad slots.
///
/// Cheap to clone; all clones drive the same state. Timers and batch flushes run as
/// Tokio tasks, so calls that arm one fail with [`SchedulerError::NoRuntime`] outside
/// a Tokio runtime. Dropping the last clone stops every timer.
///
/// The sink and the visibility oracle are never called with the internal lock held,
/// so they may call back into the scheduler. Commands reach the sink in the order the
/// scheduler decided them; a call made from inside such a callback returns before its
/// own commands are handed over, and they follow once the callback returns.
#[derive(Clone)]
pub struct RefreshScheduler {
    shared: Arc<Shared>,
}

struct Shared {
    cfg: SchedulerConfig,
    sink: Arc<dyn CommandSink>,
    oracle: Arc<dyn VisibilityOracle>,
    metrics: MetricsHandle,
    events: broadcast::Sender<RefreshEvent>,
    /// Single lock serializing every interval and batch mutation.
    state: Mutex<State>,
    /// Set while some caller is handing the outbox over to the sink.
    draining: AtomicBool,
}

struct State {
    intervals: IntervalRegistry,
    batch: SingleRequestBatcher,
    /// Effects decided under the lock, carried out after it is released.
    outbox: VecDeque<Effect>,
}

/// One externally visible consequence of a scheduling decision.
enum Effect {
    Display(SlotHandle),
    Enqueue(Command),
    Resolve(Waiter, SlotHandle),
    /// Resolve the waiters of a flushed batch and announce its slots.
    Settle(Batch),
    Emit(RefreshEvent),
}

impl State {
    fn push(&mut self, effect: Effect) {
        self.outbox.push_back(effect);
    }

    fn push_refresh(&mut self, sink: &Arc<dyn CommandSink>, slots: Vec<SlotHandle>) {
        let sink = Arc::clone(sink);
        self.push(Effect::Enqueue(Box::new(move || sink.refresh_slots(&slots))));
    }
}

impl RefreshScheduler {
    /// Start building a scheduler that dispatches into `sink`.
    pub fn builder(sink: Arc<dyn CommandSink>) -> SchedulerBuilder {
        SchedulerBuilder {
            cfg: SchedulerConfig::default(),
            sink,
            oracle: Arc::new(AlwaysVisible),
            metrics: noop_metrics(),
        }
    }

    /// Scheduler with the given config, every element visible and no metrics.
    pub fn new(cfg: SchedulerConfig, sink: Arc<dyn CommandSink>) -> Self {
        Self::builder(sink).with_config(cfg).build()
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.cfg
    }

    /// Schedule a slot load and (re)arm its periodic refresh.
    ///
    /// Steps:
    /// 1. Resolve the interval; a malformed one fails here, before any state changes.
    ///    A zero period means "no interval". Arming a timer or a batch flush outside a
    ///    Tokio runtime fails here too.
    /// 2. Initial load in single-request mode: join the pending batch and restart its window.
    ///    Otherwise: display the slot and enqueue a refresh of it right away.
    /// 3. With an interval: replace the slot's timer with a new one of that period.
    ///    Without: stop the slot's timer, if any (the latest call defines the slot's policy).
    ///
    /// The returned [`Completion`] resolves once the load command is enqueued.
    #[instrument(level = "debug", skip(self, req), fields(slot = %req.slot.key(), initial = req.initial))]
    pub fn schedule(&self, req: RefreshRequest) -> Result<Completion, SchedulerError> {
        let key = req.slot.key();
        let period = req
            .interval
            .as_ref()
            .map(RefreshInterval::to_duration)
            .transpose()?
            .filter(|p| !p.is_zero());

        let shared = &self.shared;
        let batched = req.initial && shared.cfg.single_request_mode;
        let rt = if batched || period.is_some() {
            Some(Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?)
        } else {
            None
        };

        let (waiter, completion) = Completion::channel();
        {
            let mut state = shared.lock();

            match (&rt, batched) {
                (Some(rt), true) => {
                    let added = state.batch.enqueue_initial(Arc::clone(&req.slot), Some(waiter));
                    rearm_flush(shared, rt, &mut state);
                    debug!(added, batch_len = state.batch.len(), "initial load batched");
                }
                _ => {
                    shared.dispatch_immediate(&mut state, &req.slot, waiter);
                    state.push(Effect::Emit(if req.initial {
                        RefreshEvent::init(Arc::clone(&req.slot))
                    } else {
                        RefreshEvent::refresh(Arc::clone(&req.slot))
                    }));
                }
            }

            match (&rt, period) {
                (Some(rt), Some(period)) => arm_interval(shared, rt, &mut state, req.slot, period),
                _ => {
                    if state.intervals.release(&key) {
                        shared.metrics.record_interval(IntervalChange::Cancelled);
                        debug!("previous interval stopped");
                    }
                }
            }
        }

        shared.drain();
        Ok(completion)
    }

    /// Stop the periodic refresh of `key`.
    ///
    /// Fails with [`SchedulerError::NoInterval`] when the slot has no timer.
    #[instrument(level = "debug", skip(self, key), fields(slot = %key))]
    pub fn cancel_interval(&self, key: &SlotKey) -> Result<(), SchedulerError> {
        let mut state = self.shared.lock();
        state.intervals.cancel(key)?;
        self.shared.metrics.record_interval(IntervalChange::Cancelled);
        debug!("interval cancelled");
        Ok(())
    }

    /// Forget everything scheduled for a slot that is being torn down.
    ///
    /// Stops its timer and drops it from a pending batch; never fails.
    /// Returns `true` if anything was removed.
    pub fn release(&self, key: &SlotKey) -> bool {
        let mut state = self.shared.lock();
        let had_interval = state.intervals.release(key);
        if had_interval {
            self.shared.metrics.record_interval(IntervalChange::Cancelled);
        }
        let was_pending = state.batch.remove(key);
        debug!(slot = %key, had_interval, was_pending, "slot released");
        had_interval || was_pending
    }

    /// Enqueue a refresh of `slots` now, leaving timers untouched.
    ///
    /// Returns `false` (and enqueues nothing) when `slots` is empty.
    pub fn refresh_now(&self, slots: &[SlotHandle]) -> bool {
        if slots.is_empty() {
            return false;
        }
        {
            let mut state = self.shared.lock();
            state.push_refresh(&self.shared.sink, slots.to_vec());
            for slot in slots {
                state.push(Effect::Emit(RefreshEvent::refresh(Arc::clone(slot))));
            }
        }
        self.shared
            .metrics
            .record_dispatch(DispatchKind::Immediate, slots.len());
        self.shared.drain();
        true
    }

    /// Enqueue a refresh of every slot defined in the ad runtime.
    pub fn refresh_all(&self) {
        let sink = Arc::clone(&self.shared.sink);
        self.shared
            .lock()
            .push(Effect::Enqueue(Box::new(move || sink.refresh_all())));
        self.shared.drain();
        debug!("refresh of all slots enqueued");
    }

    /// Returns `true` if `key` has a periodic timer.
    pub fn has_interval(&self, key: &SlotKey) -> bool {
        self.shared.lock().intervals.has(key)
    }

    /// Period of the timer of `key`, if any.
    pub fn interval_of(&self, key: &SlotKey) -> Option<Duration> {
        self.shared.lock().intervals.period(key)
    }

    /// Number of distinct slots waiting for a batch flush.
    pub fn pending_batch_len(&self) -> usize {
        self.shared.lock().batch.len()
    }

    /// Subscribe to the notification stream.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.shared.events.subscribe()
    }

    /// Run `observer` on its own task, fed from the notification stream.
    pub fn attach(&self, observer: Arc<dyn Observe>) -> JoinHandle<()> {
        debug!(observer = observer.name(), "observer attached");
        spawn_observer(self.subscribe(), observer)
    }

    /// Stop every timer and discard the pending batch.
    pub fn shutdown(&self) {
        let mut state = self.shared.lock();
        let intervals = state.intervals.clear();
        let pending = state.batch.clear();
        info!(intervals, pending, "refresh scheduler stopped");
    }
}

/// Clears the draining flag, also when a sink callback panics.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: RefreshEvent) {
        // No receivers is fine: nobody is observing.
        let _ = self.events.send(event);
    }

    fn dispatch_immediate(&self, state: &mut State, slot: &SlotHandle, waiter: Waiter) {
        state.push(Effect::Display(Arc::clone(slot)));
        state.push_refresh(&self.sink, vec![Arc::clone(slot)]);
        state.push(Effect::Resolve(waiter, Arc::clone(slot)));
        self.metrics.record_dispatch(DispatchKind::Immediate, 1);
        trace!(slot = %slot.key(), "immediate refresh enqueued");
    }

    /// Hand queued effects to the sink, one at a time and without the lock.
    ///
    /// Only one caller drains at a time; the others return at once and their
    /// effects are picked up by the active drainer.
    fn drain(&self) {
        loop {
            if self.draining.swap(true, Ordering::AcqRel) {
                return;
            }
            {
                let _guard = DrainGuard(&self.draining);
                while let Some(effect) = self.next_effect() {
                    self.apply(effect);
                }
            }
            // An effect queued between the last pop and clearing the flag has no drainer yet.
            if self.lock().outbox.is_empty() {
                return;
            }
        }
    }

    fn next_effect(&self) -> Option<Effect> {
        self.lock().outbox.pop_front()
    }

    fn apply(&self, effect: Effect) {
        match effect {
            Effect::Display(slot) => self.sink.display_slot(slot.element_id()),
            Effect::Enqueue(task) => self.sink.enqueue(task),
            Effect::Resolve(waiter, slot) => {
                // Receiver dropped: caller no longer interested.
                let _ = waiter.send(slot);
            }
            Effect::Settle(batch) => {
                for slot in batch.resolve() {
                    self.emit(RefreshEvent::init(slot));
                }
            }
            Effect::Emit(event) => self.emit(event),
        }
    }

    /// Flush the pending batch if `token` still belongs to the current flush timer.
    fn flush(&self, token: &CancellationToken) {
        {
            let mut state = self.lock();
            let Some(batch) = state.batch.take(token) else {
                trace!("flush superseded");
                return;
            };

            let cmd_slots = batch.slots().to_vec();
            let sink = Arc::clone(&self.sink);
            state.push(Effect::Enqueue(Box::new(move || {
                sink.enable_single_request_mode();
                sink.enable_services();
                for slot in &cmd_slots {
                    sink.display_slot(slot.element_id());
                }
                sink.refresh_slots(&cmd_slots);
            })));

            let len = batch.slots().len();
            state.push(Effect::Settle(batch));
            self.metrics.record_dispatch(DispatchKind::Batch, len);
            debug!(batch_len = len, "single-request batch flushed");
        }
        self.drain();
    }

    /// Handle one periodic tick. Returns `false` when the timer has been superseded.
    fn tick(&self, slot: &SlotHandle, token: &CancellationToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        let hidden = self.oracle.is_hidden(slot.element_id());

        {
            let mut state = self.lock();
            // Replacements cancel under this lock, so a live token here means the refresh is not stale.
            if token.is_cancelled() {
                return false;
            }
            if hidden {
                trace!(slot = %slot.key(), "slot hidden; tick suppressed");
                self.metrics.record_tick_suppressed();
                return true;
            }

            state.push_refresh(&self.sink, vec![Arc::clone(slot)]);
            state.push(Effect::Emit(RefreshEvent::refresh(Arc::clone(slot))));
            self.metrics.record_dispatch(DispatchKind::Tick, 1);
            trace!(slot = %slot.key(), "periodic refresh enqueued");
        }
        self.drain();
        true
    }
}

/// Install a new periodic timer for `slot`, stopping the previous one.
fn arm_interval(
    shared: &Arc<Shared>,
    rt: &Handle,
    state: &mut State,
    slot: SlotHandle,
    period: Duration,
) {
    let key = slot.key();
    let timer = TimerHandle::new();
    let token = timer.token();

    let replaced = state.intervals.set(key.clone(), timer, period);
    shared.metrics.record_interval(if replaced {
        IntervalChange::Replaced
    } else {
        IntervalChange::Armed
    });
    debug!(slot = %key, period_ms = period.as_millis() as u64, replaced, "interval armed");

    let weak = Arc::downgrade(shared);
    let first = Instant::now() + period;
    rt.spawn(async move {
        let mut ticker = time::interval_at(first, period);
        // Late ticks are dropped, later ones stay on the original grid.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(shared) = weak.upgrade() else { break };
                    if !shared.tick(&slot, &token) {
                        break;
                    }
                }
            }
        }
        trace!(slot = %key, "interval task exited");
    });
}

/// Restart the batch flush window.
fn rearm_flush(shared: &Arc<Shared>, rt: &Handle, state: &mut State) {
    let token = state.batch.rearm();
    let deadline = Instant::now() + state.batch.window();
    let weak = Arc::downgrade(shared);

    rt.spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            _ = time::sleep_until(deadline) => {
                if let Some(shared) = weak.upgrade() {
                    shared.flush(&token);
                }
            }
        }
    });
}
