use std::{
    convert::Infallible,
    fmt::{self, Debug},
    future::Future,
    pin::Pin,
    task::{Context, Poll, ready},
    time::Duration,
};

use tokio::time::Sleep;

/// A value that settles on a later turn of the scheduler.
///
/// A `Deferred` is always pending on its first poll: it wakes itself and completes on a
/// subsequent poll, or once its delay has elapsed. It settles with `Ok` when resolved and
/// `Err` when rejected.
///
/// A delayed `Deferred` starts a `tokio::time::sleep` on its first poll, so it must be polled
/// inside a tokio runtime with the time driver enabled. Undelayed values need no runtime.
///
/// Cloning yields a fresh, unpolled copy carrying the same outcome and delay, which is how
/// a double hands out a new pending value on every invocation.
pub struct Deferred<T, E = Infallible> {
    outcome: Option<Result<T, E>>,
    delay: Option<Duration>,
    sleep: Option<Pin<Box<Sleep>>>,
    yielded: bool,
}

// The outcome is only ever moved out, never pinned.
impl<T, E> Unpin for Deferred<T, E> {}

impl<T, E> Deferred<T, E> {
    fn settle_with(outcome: Result<T, E>) -> Self {
        Self {
            outcome: Some(outcome),
            delay: None,
            sleep: None,
            yielded: false,
        }
    }

    pub fn resolved(value: T) -> Self {
        Self::settle_with(Ok(value))
    }

    pub fn rejected(error: E) -> Self {
        Self::settle_with(Err(error))
    }

    /// Resolves with `value` once `delay` has elapsed on the tokio clock
    pub fn resolved_after(delay: Duration, value: T) -> Self {
        Self::resolved(value).delayed(delay)
    }

    /// Postpones settlement until `delay` has elapsed, counted from the first poll
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Whether the value has already been handed out by a completed poll
    pub fn is_consumed(&self) -> bool {
        self.outcome.is_none()
    }
}

impl<T, E> Future for Deferred<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let (Some(delay), None) = (this.delay, this.sleep.as_ref()) {
            this.sleep = Some(Box::pin(tokio::time::sleep(delay)));
        }

        if !this.yielded {
            this.yielded = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }

        if let Some(sleep) = this.sleep.as_mut() {
            ready!(sleep.as_mut().poll(cx));
        }

        match this.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => panic!("`Deferred` polled after completion"),
        }
    }
}

impl<T: Clone, E: Clone> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            outcome: self.outcome.clone(),
            delay: self.delay,
            sleep: None,
            yielded: false,
        }
    }
}

impl<T: Debug, E: Debug> Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("outcome", &self.outcome)
            .field("delay", &self.delay)
            .field("yielded", &self.yielded)
            .finish()
    }
}
