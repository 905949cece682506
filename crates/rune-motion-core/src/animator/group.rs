//! Fan-out/fan-in over element completion signals.
//!
//! A [`TaskGroup`] holds one task per submitted element, each awaiting that
//! element's finished signal. The group is polled without blocking from the
//! controller's update step. It resolves once every task has resolved, or as
//! soon as one of them reports cancellation.

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::task::{noop_waker_ref, Context, Poll};

/// How a joined group resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Every task finished.
    Finished,
    /// At least one task was cancelled; the rest are abandoned.
    Cancelled,
}

/// Result of one non-blocking poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupProgress {
    /// Tasks that finished during this poll, in completion order.
    pub completed: Vec<usize>,
    /// Set once the join has resolved.
    pub outcome: Option<JoinOutcome>,
}

type Task = LocalBoxFuture<'static, (usize, Result<(), oneshot::Canceled>)>;

/// Cancellable join over a set of completion signals.
#[derive(Default)]
pub struct TaskGroup {
    tasks: FuturesUnordered<Task>,
    outcome: Option<JoinOutcome>,
}

impl std::fmt::Debug for TaskGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGroup")
            .field("pending", &self.tasks.len())
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl TaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task waiting on `signal`, reported under `key`.
    pub fn spawn(&mut self, key: usize, signal: oneshot::Receiver<()>) {
        self.tasks.push(async move { (key, signal.await) }.boxed_local());
    }

    /// Tasks not yet resolved.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Drive every ready task without blocking.
    pub fn poll_progress(&mut self) -> GroupProgress {
        let mut progress = GroupProgress::default();
        if let Some(outcome) = self.outcome {
            progress.outcome = Some(outcome);
            return progress;
        }

        let mut cx = Context::from_waker(noop_waker_ref());
        loop {
            match self.tasks.poll_next_unpin(&mut cx) {
                Poll::Ready(Some((key, Ok(())))) => progress.completed.push(key),
                Poll::Ready(Some((key, Err(oneshot::Canceled)))) => {
                    tracing::debug!(key, "task cancelled, abandoning join");
                    self.tasks.clear();
                    self.outcome = Some(JoinOutcome::Cancelled);
                    break;
                }
                Poll::Ready(None) => {
                    self.outcome = Some(JoinOutcome::Finished);
                    break;
                }
                Poll::Pending => break,
            }
        }

        progress.outcome = self.outcome;
        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group_resolves_finished() {
        let mut group = TaskGroup::new();
        let progress = group.poll_progress();
        assert!(progress.completed.is_empty());
        assert_eq!(progress.outcome, Some(JoinOutcome::Finished));
    }

    #[test]
    fn test_join_waits_for_all() {
        let mut group = TaskGroup::new();
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        group.spawn(0, first_rx);
        group.spawn(1, second_rx);

        assert_eq!(group.poll_progress(), GroupProgress::default());

        second_tx.send(()).unwrap();
        let progress = group.poll_progress();
        assert_eq!(progress.completed, vec![1]);
        assert_eq!(progress.outcome, None);
        assert_eq!(group.pending(), 1);

        first_tx.send(()).unwrap();
        let progress = group.poll_progress();
        assert_eq!(progress.completed, vec![0]);
        assert_eq!(progress.outcome, Some(JoinOutcome::Finished));
    }

    #[test]
    fn test_cancellation_is_an_outcome() {
        let mut group = TaskGroup::new();
        let (done_tx, done_rx) = oneshot::channel();
        let (dropped_tx, dropped_rx) = oneshot::channel::<()>();
        group.spawn(0, done_rx);
        group.spawn(1, dropped_rx);

        done_tx.send(()).unwrap();
        drop(dropped_tx);

        let progress = group.poll_progress();
        assert_eq!(progress.outcome, Some(JoinOutcome::Cancelled));
        assert_eq!(group.pending(), 0);

        // Resolution is sticky.
        assert_eq!(group.poll_progress().outcome, Some(JoinOutcome::Cancelled));
    }
}
