use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use slotline_model::SlotHandle;
use tokio::sync::oneshot;

use crate::{batcher::Waiter, error::SchedulerError};

/// Resolves once the refresh command of one scheduling call has been enqueued.
///
/// Immediate dispatches resolve right away, batched initial loads on flush.
/// "Enqueued" is not "rendered": the ad runtime may still be loading.
/// Fails with [`SchedulerError::Closed`] when the request was discarded before dispatch
/// (slot released from a pending batch, scheduler shut down or dropped).
#[derive(Debug)]
#[must_use = "completions do nothing unless awaited; drop it explicitly to ignore the result"]
pub struct Completion {
    rx: oneshot::Receiver<SlotHandle>,
}

impl Completion {
    pub(crate) fn channel() -> (Waiter, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }
}

impl Future for Completion {
    type Output = Result<SlotHandle, SchedulerError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| SchedulerError::Closed))
    }
}
