//! Contract of the external ad runtime the scheduler drives.
//!
//! The scheduler never talks to the ad network itself: it only pushes commands
//! into a [`CommandSink`] owned by the integration layer.
use slotline_model::SlotHandle;

/// Zero-argument task executed by the ad runtime once it is ready.
pub type Command = Box<dyn FnOnce() + Send + 'static>;

/// Command queue and primitives of the external ad runtime.
///
/// Implementations must not block: every method runs on the caller's thread, often a
/// timer task. The scheduler never holds its internal lock while calling them, so an
/// implementation may call back into the scheduler; commands decided by such a nested
/// call are handed over after the current method returns. "Dispatched" means
/// "enqueued", not "rendered".
pub trait CommandSink: Send + Sync + 'static {
    /// Queue `task` to run once the runtime is initialized.
    ///
    /// Tasks run in FIFO order.
    fn enqueue(&self, task: Command);

    /// Issue a network refresh for exactly these slots, in this order.
    fn refresh_slots(&self, slots: &[SlotHandle]);

    /// Issue a network refresh for every slot defined in the runtime.
    fn refresh_all(&self);

    /// Render a defined slot into its container element.
    fn display_slot(&self, element_id: &str);

    /// Switch the runtime into single-request mode. Idempotent.
    fn enable_single_request_mode(&self);

    /// Enable runtime services. Idempotent.
    fn enable_services(&self);
}
