/// Threading and Async Integration Helpers
///
/// `TaskScope` owns the background work of one controller: periodic
/// simulation ticks and one-shot delayed transitions. Every task is
/// individually cancellable through its `TaskHandle`; dropping the scope
/// aborts everything still running.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

/// Cancellation handle for a single spawned task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    name: &'static str,
    abort: AbortHandle,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Resolves once the scope signals cancellation or is dropped.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        let done = *rx.borrow_and_update();
        if done || rx.changed().await.is_err() {
            return;
        }
    }
}

/// Owner of a group of background tasks.
pub struct TaskScope {
    /// Cancellation signal (watch channel)
    cancel_tx: watch::Sender<bool>,
    handles: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
}

impl TaskScope {
    pub fn new() -> Self {
        let (cancel_tx, _cancel_rx) = watch::channel(false);
        TaskScope {
            cancel_tx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Receiver that flips to `true` when the scope is cancelled.
    pub fn cancel_signal(&self) -> watch::Receiver<bool> {
        self.cancel_tx.subscribe()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Spawn `fut` inside the scope. Must be called within a tokio runtime.
    pub fn spawn<Fut>(&self, name: &'static str, fut: Fut) -> TaskHandle
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut cancel_rx = self.cancel_signal();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = fut => {}
                _ = cancelled(&mut cancel_rx) => {
                    log::debug!("[Tasks] {} cancelled", name);
                }
            }
        });

        let task = TaskHandle {
            name,
            abort: handle.abort_handle(),
        };

        let mut handles = self.handles.lock().unwrap_or_else(|p| p.into_inner());
        handles.retain(|(_, h)| !h.is_finished());
        handles.push((name, handle));
        task
    }

    /// Run `tick` every `period`. The first run happens one period from now.
    pub fn spawn_periodic<F>(&self, name: &'static str, period: Duration, mut tick: F) -> TaskHandle
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        self.spawn(name, async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick();
            }
        })
    }

    /// Run `action` once after `delay`.
    pub fn spawn_delayed<F>(&self, name: &'static str, delay: Duration, action: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(name, async move {
            tokio::time::sleep(delay).await;
            action();
        })
    }

    /// Names of tasks that have not finished yet.
    pub fn active_tasks(&self) -> Vec<&'static str> {
        let handles = self.handles.lock().unwrap_or_else(|p| p.into_inner());
        handles
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Signal cancellation and abort every task.
    pub fn cancel_all(&self) {
        self.cancel_tx.send_replace(true);
        let mut handles = self.handles.lock().unwrap_or_else(|p| p.into_inner());
        for (_, handle) in handles.drain(..) {
            handle.abort();
        }
    }
}

impl Default for TaskScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Request UI repaint from a background thread
pub fn request_ui_repaint(ctx: Option<&eframe::egui::Context>) {
    if let Some(c) = ctx {
        c.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_task_ticks() {
        let scope = TaskScope::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        scope.spawn_periodic("tick", Duration::from_secs(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(5_001)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_stops() {
        let scope = TaskScope::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let handle = scope.spawn_delayed("once", Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        handle.cancel();
        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_everything() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let scope = TaskScope::new();
            let counter = Arc::clone(&hits);
            scope.spawn_periodic("tick", Duration::from_secs(1), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            settle().await;
            assert_eq!(scope.active_tasks(), vec!["tick"]);
        }

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
