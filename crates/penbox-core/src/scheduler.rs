//! Debounced render scheduler.
//!
//! [`spawn_scheduler`] starts a Tokio task that subscribes to the live
//! fragments and drives a [`Debouncer`]. When a quiescence window elapses
//! with no further edit, the task reads all three fragments in one borrow,
//! composes them through the [`IsolationBoundary`] and publishes the result
//! to a [`RenderTarget`].
//!
//! # Teardown
//!
//! [`SchedulerHandle::shutdown`] stops the task. A pending render is
//! dropped, never fired: the select loop is biased so the shutdown signal
//! always wins over a timer that is ready at the same instant. Dropping the
//! handle or the fragment store has the same effect.

use std::sync::Arc;
use std::time::Duration;

use penbox_types::{ComposedDocument, Fragments};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::debounce::Debouncer;
use crate::isolation::IsolationBoundary;

/// Errors that can occur when stopping the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The scheduler task panicked or was aborted.
    #[error("scheduler task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}

/// Sink for composed documents.
///
/// Whatever renders the isolated preview implements this. The scheduler
/// calls [`publish`](Self::publish) once per recomposition and never
/// inspects the target's state. Implementations must not block.
pub trait RenderTarget: Send + Sync {
    /// Accept a freshly composed document.
    fn publish(&self, document: ComposedDocument);
}

/// Summary of a finished scheduler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    /// Number of documents published.
    pub renders: u64,
    /// Whether a render was pending (and dropped) at teardown.
    pub cancelled_pending: bool,
}

/// Handle to a running scheduler task.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<SchedulerReport>,
}

impl SchedulerHandle {
    /// Stop the scheduler and wait for it to exit.
    ///
    /// Any pending render is cancelled; nothing is published after this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Join`] if the task panicked.
    pub async fn shutdown(self) -> Result<SchedulerReport, SchedulerError> {
        // Fails only if the task already exited, which is what we want.
        let _ = self.shutdown.send(true);
        let report = self.task.await?;
        Ok(report)
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start a scheduler task for the given fragment subscription.
///
/// `fragments` is usually [`LiveFragments::subscribe`]; its current value
/// counts as already rendered.
///
/// [`LiveFragments::subscribe`]: crate::live::LiveFragments::subscribe
pub fn spawn_scheduler<T>(
    fragments: watch::Receiver<Fragments>,
    boundary: IsolationBoundary,
    target: Arc<T>,
    window: Duration,
) -> SchedulerHandle
where
    T: RenderTarget + ?Sized + 'static,
{
    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_scheduler(
        fragments,
        shutdown_rx,
        boundary,
        target,
        window,
    ));
    info!(
        window_ms = window.as_millis(),
        scripts_enabled = boundary.scripts_enabled(),
        "Render scheduler started"
    );
    SchedulerHandle { shutdown, task }
}

async fn run_scheduler<T>(
    mut fragments: watch::Receiver<Fragments>,
    mut shutdown: watch::Receiver<bool>,
    boundary: IsolationBoundary,
    target: Arc<T>,
    window: Duration,
) -> SchedulerReport
where
    T: RenderTarget + ?Sized,
{
    let mut debouncer = Debouncer::new(window);
    let mut report = SchedulerReport::default();

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            biased;

            _ = shutdown.changed() => {
                report.cancelled_pending = debouncer.cancel();
                break;
            }

            changed = fragments.changed() => {
                if changed.is_err() {
                    // Fragment store dropped: the host is gone.
                    report.cancelled_pending = debouncer.cancel();
                    break;
                }
                debouncer.record_change(Instant::now());
            }

            () = wait_for(deadline) => {
                if debouncer.fire_if_due(Instant::now()) {
                    let current = fragments.borrow_and_update().clone();
                    let document = boundary.compose(&current);
                    debug!(bytes = document.len(), "Recomposed preview");
                    target.publish(document);
                    report.renders = report.renders.saturating_add(1);
                }
            }
        }
    }

    info!(
        renders = report.renders,
        cancelled_pending = report.cancelled_pending,
        "Render scheduler stopped"
    );
    report
}

/// Sleep until `deadline`, or forever while idle.
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use penbox_types::FragmentKind;

    use super::*;
    use crate::live::LiveFragments;

    const WINDOW: Duration = Duration::from_millis(150);

    #[derive(Default)]
    struct RecordingTarget {
        published: Mutex<Vec<ComposedDocument>>,
    }

    impl RecordingTarget {
        fn count(&self) -> usize {
            self.published.lock().unwrap().len()
        }

        fn last(&self) -> Option<ComposedDocument> {
            self.published.lock().unwrap().last().cloned()
        }
    }

    impl RenderTarget for RecordingTarget {
        fn publish(&self, document: ComposedDocument) {
            self.published.lock().unwrap().push(document);
        }
    }

    fn start(live: &LiveFragments) -> (Arc<RecordingTarget>, SchedulerHandle) {
        let target = Arc::new(RecordingTarget::default());
        let handle = spawn_scheduler(
            live.subscribe(),
            IsolationBoundary::sandboxed(),
            Arc::clone(&target),
            WINDOW,
        );
        (target, handle)
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_edits_no_renders() {
        let live = LiveFragments::new();
        let (target, handle) = start(&live);
        advance(1_000).await;
        assert_eq!(target.count(), 0);
        let report = handle.shutdown().await.unwrap();
        assert_eq!(report, SchedulerReport::default());
    }

    #[tokio::test(start_paused = true)]
    async fn single_edit_renders_once_after_window() {
        let live = LiveFragments::new();
        let (target, handle) = start(&live);

        live.set(FragmentKind::Markup, "<p>hi</p>".to_owned());
        advance(149).await;
        assert_eq!(target.count(), 0);

        advance(2).await;
        assert_eq!(target.count(), 1);
        assert!(target.last().unwrap().as_str().contains("<p>hi</p>"));

        advance(1_000).await;
        assert_eq!(target.count(), 1);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_coalesce_into_final_values() {
        let live = LiveFragments::new();
        let (target, handle) = start(&live);

        for i in 0..10 {
            live.set(FragmentKind::Markup, format!("<p>{i}</p>"));
            live.set(FragmentKind::Style, format!("p{{order:{i}}}"));
            advance(20).await;
        }
        advance(200).await;

        assert_eq!(target.count(), 1);
        let doc = target.last().unwrap();
        assert!(doc.as_str().contains("<p>9</p>"));
        assert!(doc.as_str().contains("p{order:9}"));
        assert!(!doc.as_str().contains("<p>8</p>"));

        let report = handle.shutdown().await.unwrap();
        assert_eq!(report.renders, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_quiet_periods_render_separately() {
        let live = LiveFragments::new();
        let (target, handle) = start(&live);

        live.set(FragmentKind::Script, "one()".to_owned());
        advance(300).await;
        live.set(FragmentKind::Script, "two()".to_owned());
        advance(300).await;

        assert_eq!(target.count(), 2);
        assert!(target.last().unwrap().as_str().contains("two()"));
        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_render() {
        let live = LiveFragments::new();
        let (target, handle) = start(&live);

        live.set(FragmentKind::Markup, "<p>late</p>".to_owned());
        advance(50).await;
        let report = handle.shutdown().await.unwrap();
        assert!(report.cancelled_pending);
        assert_eq!(report.renders, 0);

        advance(1_000).await;
        assert_eq!(target.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_fragments_stops_scheduler() {
        let live = LiveFragments::new();
        let (target, handle) = start(&live);

        live.set(FragmentKind::Markup, "<p>gone</p>".to_owned());
        advance(10).await;
        drop(live);
        advance(1_000).await;

        assert!(handle.is_finished());
        assert_eq!(target.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn scripts_disabled_boundary_publishes_inert_documents() {
        let live = LiveFragments::new();
        let target = Arc::new(RecordingTarget::default());
        let handle = spawn_scheduler(
            live.subscribe(),
            IsolationBoundary::scripts_disabled(),
            Arc::clone(&target),
            WINDOW,
        );

        live.set(FragmentKind::Script, "alert(1)".to_owned());
        advance(200).await;

        let doc = target.last().unwrap();
        assert!(!doc.as_str().contains("<script"));
        handle.shutdown().await.unwrap();
    }
}
