use std::future::Future;

use flume::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use ustr::Ustr;

use crate::{Error, State, TaskHandle, TaskId, Updater};

/// Owner of one [`State`] value and of the tasks working on its behalf.
pub struct StateCtx<S: State> {
    state: S,

    send: Sender<S::Event>,
    recv: Receiver<S::Event>,

    tasks: JoinSet<()>,
    teardown: CancellationToken,
    next_seq: u64,
}

impl<S: State> StateCtx<S> {
    pub fn new(state: S) -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            state,
            send,
            recv,
            tasks: JoinSet::new(),
            teardown: CancellationToken::new(),
            next_seq: 0,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Run a synchronous change against the state.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.state)
    }

    pub fn updater(&self) -> Updater<S::Event> {
        Updater::new(self.send.clone(), self.teardown.clone())
    }

    /// Spawn `task` on the current Tokio runtime.
    ///
    /// The closure receives an [`Updater`] for reporting back. Must be called
    /// from within a runtime.
    pub fn spawn<F, Fut>(&mut self, key: impl Into<Ustr>, task: F) -> Result<TaskHandle, Error>
    where
        F: FnOnce(Updater<S::Event>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_disposed() {
            return Err(Error::Disposed);
        }

        self.next_seq += 1;
        let id = TaskId::new(key.into(), self.next_seq);
        let updater = self.updater();
        self.tasks.spawn(task(updater));
        log::debug!("spawned state task {id}");

        Ok(TaskHandle::new(id, self.teardown.clone()))
    }

    /// Number of spawned tasks that have not been joined yet.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Apply every queued event, in arrival order. Returns how many were applied.
    ///
    /// On a disposed context the queue is drained and nothing is applied.
    pub fn sync(&mut self) -> usize {
        if self.is_disposed() {
            let discarded = self.recv.drain().count();
            if discarded > 0 {
                log::debug!("discarded {discarded} event(s) that arrived after dispose");
            }
            return 0;
        }

        let mut applied = 0;
        while let Ok(event) = self.recv.try_recv() {
            self.state.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next task to finish, then sync.
    ///
    /// Returns `false` when there was nothing left to wait for.
    pub async fn settle_one(&mut self) -> bool {
        let Some(joined) = self.tasks.join_next().await else {
            return false;
        };
        if let Err(err) = joined {
            log::warn!("state task ended abnormally: {err}");
        }
        self.sync();
        true
    }

    /// Await all spawned tasks, syncing after each one completes.
    pub async fn settle(&mut self) {
        self.sync();
        while self.settle_one().await {}
    }

    /// Tear the context down.
    ///
    /// Running tasks are detached, not aborted: requests already issued run
    /// to completion, and their results are refused by the [`Updater`].
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.teardown.cancel();
        let detached = self.tasks.len();
        self.tasks.detach_all();
        let discarded = self.recv.drain().count();
        log::debug!("state context disposed ({detached} task(s) detached, {discarded} event(s) discarded)");
    }

    pub fn is_disposed(&self) -> bool {
        self.teardown.is_cancelled()
    }
}

impl<S: State> Drop for StateCtx<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<S: State + std::fmt::Debug> std::fmt::Debug for StateCtx<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field("state", &self.state)
            .field("queued", &self.recv.len())
            .field("tasks", &self.tasks.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        total: i64,
        seen: Vec<i64>,
    }

    impl State for Counter {
        type Event = i64;

        fn apply(&mut self, event: i64) {
            self.total += event;
            self.seen.push(event);
        }
    }

    #[test]
    fn update_is_applied_immediately() {
        let mut ctx = StateCtx::new(Counter::default());

        let total = ctx.update(|c| {
            c.total = 5;
            c.total
        });

        assert_eq!(total, 5);
        assert_eq!(ctx.state().total, 5);
    }

    #[test]
    fn sync_applies_queued_events_in_order() {
        let mut ctx = StateCtx::new(Counter::default());
        let updater = ctx.updater();

        updater.set(1).expect("context is alive");
        updater.set(2).expect("context is alive");

        assert_eq!(ctx.state().total, 0, "nothing applied before sync");
        assert_eq!(ctx.sync(), 2);
        assert_eq!(ctx.state().seen, vec![1, 2]);
    }

    #[tokio::test]
    async fn settle_waits_for_spawned_tasks() {
        let mut ctx = StateCtx::new(Counter::default());

        ctx.spawn("a", |updater| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            updater.set(10).ok();
        })
        .expect("spawn on live context");
        ctx.spawn("b", |updater| async move {
            updater.set(1).ok();
        })
        .expect("spawn on live context");

        assert_eq!(ctx.task_count(), 2);
        ctx.settle().await;

        assert_eq!(ctx.task_count(), 0);
        assert_eq!(ctx.state().total, 11);
    }

    #[tokio::test]
    async fn task_ids_grow_per_context() {
        let mut ctx = StateCtx::new(Counter::default());

        let first = ctx.spawn("k", |_| async {}).expect("spawn");
        let second = ctx.spawn("k", |_| async {}).expect("spawn");

        assert_eq!(first.id().key(), Ustr::from("k"));
        assert!(second.id().seq() > first.id().seq());
        ctx.settle().await;
    }

    #[tokio::test]
    async fn completions_after_dispose_are_discarded() {
        let mut ctx = StateCtx::new(Counter::default());
        let gate = Arc::new(Notify::new());
        let released = Arc::clone(&gate);
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();

        let handle = ctx
            .spawn("late", move |updater| async move {
                released.notified().await;
                let outcome = updater.set(99);
                done_tx.send(outcome).ok();
            })
            .expect("spawn on live context");

        ctx.dispose();
        assert!(handle.is_disposed());
        assert_eq!(ctx.task_count(), 0, "tasks are detached on dispose");

        gate.notify_one();
        let outcome = done_rx.await.expect("detached task still runs");

        assert_eq!(outcome, Err(Error::Disposed));
        assert_eq!(ctx.sync(), 0);
        assert_eq!(ctx.state().total, 0);
    }

    #[test]
    fn sync_on_disposed_context_drops_queue() {
        let mut ctx = StateCtx::new(Counter::default());
        let updater = ctx.updater();
        updater.set(3).expect("context is alive");

        ctx.dispose();

        assert_eq!(ctx.sync(), 0);
        assert_eq!(ctx.state().total, 0);
    }

    #[tokio::test]
    async fn spawn_after_dispose_is_refused() {
        let mut ctx = StateCtx::new(Counter::default());
        ctx.dispose();

        let result = ctx.spawn("k", |_| async {});

        assert!(matches!(result, Err(Error::Disposed)));
        assert_eq!(ctx.task_count(), 0);
    }

    #[tokio::test]
    async fn settle_one_reports_empty_set() {
        let mut ctx = StateCtx::new(Counter::default());
        assert!(!ctx.settle_one().await);
    }
}
