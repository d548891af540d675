//! Ingestion progress state machine.
//!
//! The backend pushes stage names on [`Topic::IngestionStage`], possibly out
//! of pipeline order. Each name maps to its canonical index; the index only
//! moves forward within a job, so a late notification for an earlier stage
//! is stale and ignored. Reaching the terminal stage schedules a close after
//! a grace delay so the completed state can be shown before dismissal.
//!
//! Timers are deadlines polled by [`IngestionTracker::next_update`], so the
//! tracker runs on the same event loop as the transport and needs no task.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use ragdesk_types::channel::Topic;
use ragdesk_types::ingest::{IngestionProgress, Stage, TrackerState};
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::channel::{EventChannel, Subscription};

/// Default linger time for the completed state.
pub const DEFAULT_COMPLETION_GRACE: Duration = Duration::from_millis(2_000);

/// Timing knobs for [`IngestionTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Delay between the terminal stage and `Closed`.
    pub completion_grace: Duration,
    /// Fail a job that hears nothing for this long. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            completion_grace: DEFAULT_COMPLETION_GRACE,
            idle_timeout: None,
        }
    }
}

/// Tracks the single in-flight ingestion job.
pub struct IngestionTracker<C: EventChannel> {
    channel: Arc<C>,
    config: TrackerConfig,
    /// Held only while a job is active.
    subscription: Option<Subscription>,
    state: TrackerState,
    current_stage_index: usize,
    stage_completed: bool,
    active: bool,
    close_at: Option<Instant>,
    idle_deadline: Option<Instant>,
    progress_tx: watch::Sender<IngestionProgress>,
}

impl<C: EventChannel> IngestionTracker<C> {
    /// Idle tracker; nothing is subscribed until [`start_job`](Self::start_job).
    pub fn new(channel: Arc<C>, config: TrackerConfig) -> Self {
        let (progress_tx, _) = watch::channel(IngestionProgress::default());
        Self {
            channel,
            config,
            subscription: None,
            state: TrackerState::Idle,
            current_stage_index: 0,
            stage_completed: false,
            active: false,
            close_at: None,
            idle_deadline: None,
            progress_tx,
        }
    }

    /// Snapshot of the current progress.
    pub fn progress(&self) -> IngestionProgress {
        IngestionProgress {
            state: self.state,
            current_stage_index: self.current_stage_index,
            stage_completed: self.stage_completed,
            active: self.active,
        }
    }

    /// Receiver that always holds the latest progress snapshot.
    pub fn watch(&self) -> watch::Receiver<IngestionProgress> {
        self.progress_tx.subscribe()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Whether a job is in flight.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Timing knobs this tracker was built with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Begin tracking a new job, discarding any job in flight.
    pub fn start_job(&mut self) {
        if self.active {
            info!(state = ?self.state, "restarting ingestion tracker with a job in flight");
        }
        // Release the previous subscription before acquiring the next one.
        self.release_subscription();
        self.subscription = Some(self.channel.subscribe(Topic::IngestionStage));

        self.state = TrackerState::Idle;
        self.current_stage_index = 0;
        self.stage_completed = false;
        self.active = true;
        self.close_at = None;
        self.idle_deadline = self.config.idle_timeout.map(|t| Instant::now() + t);

        debug!("ingestion job started");
        self.publish();
    }

    /// Apply a raw stage notification. Returns whether state changed.
    pub fn apply_label(&mut self, label: &str) -> bool {
        match label.parse::<Stage>() {
            Ok(stage) => self.apply_stage(stage),
            Err(_) => {
                debug!(label, "ignoring unknown ingestion stage");
                false
            }
        }
    }

    /// Apply a stage notification. Returns whether state changed.
    pub fn apply_stage(&mut self, stage: Stage) -> bool {
        if !self.active {
            debug!(%stage, "no active ingestion job, stage ignored");
            return false;
        }
        if self.state != TrackerState::Idle && stage.index() < self.current_stage_index {
            debug!(
                %stage,
                current_stage_index = self.current_stage_index,
                "ignoring stale ingestion stage"
            );
            return false;
        }

        self.state = TrackerState::Stage(stage);
        self.current_stage_index = stage.index();
        self.stage_completed = true;
        self.idle_deadline = self.config.idle_timeout.map(|t| Instant::now() + t);

        if stage.is_terminal() && self.close_at.is_none() {
            self.close_at = Some(Instant::now() + self.config.completion_grace);
            self.idle_deadline = None;
            info!(
                grace_ms = self.config.completion_grace.as_millis() as u64,
                "ingestion reached terminal stage"
            );
        } else {
            debug!(%stage, index = stage.index(), "ingestion stage completed");
        }

        self.publish();
        true
    }

    /// Stop tracking the current job immediately.
    pub fn cancel(&mut self) {
        if !self.active {
            return;
        }
        info!(state = ?self.state, "ingestion job cancelled");
        self.finish(TrackerState::Closed);
    }

    /// Wait for the next observable change: an applied stage notification,
    /// the grace-delay close, or a failure.
    ///
    /// A job fails on the idle timeout, or when the notification stream ends
    /// before the terminal stage. After the terminal stage the grace delay
    /// runs out regardless.
    ///
    /// Pends forever when no job is active. Cancel-safe: state is only
    /// mutated after a notification or timer has completed.
    pub async fn next_update(&mut self) -> IngestionProgress {
        loop {
            let deadline = self.next_deadline();
            if self.subscription.is_none() && deadline.is_none() {
                return future::pending().await;
            }

            tokio::select! {
                payload = next_payload(self.subscription.as_mut()) => match payload {
                    Some(label) => {
                        if self.apply_label(&label) {
                            return self.progress();
                        }
                    }
                    None if self.close_at.is_some() => {
                        debug!("stage notification stream ended during completion grace");
                        self.release_subscription();
                    }
                    None => {
                        warn!(state = ?self.state, "stage notification stream ended, job failed");
                        self.finish(TrackerState::Failed);
                        return self.progress();
                    }
                },
                _ = wait_until(deadline) => {
                    if self.on_deadline() {
                        return self.progress();
                    }
                }
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.close_at, self.idle_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn on_deadline(&mut self) -> bool {
        let now = Instant::now();
        if self.close_at.is_some_and(|at| at <= now) {
            info!("ingestion job closed after completion grace");
            self.finish(TrackerState::Closed);
            true
        } else if self.idle_deadline.is_some_and(|at| at <= now) {
            warn!(state = ?self.state, "no stage notification before idle timeout, job failed");
            self.finish(TrackerState::Failed);
            true
        } else {
            false
        }
    }

    fn finish(&mut self, state: TrackerState) {
        self.state = state;
        self.active = false;
        self.close_at = None;
        self.idle_deadline = None;
        self.release_subscription();
        self.publish();
    }

    fn release_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
    }

    fn publish(&self) {
        self.progress_tx.send_replace(self.progress());
    }
}

async fn next_payload(subscription: Option<&mut Subscription>) -> Option<String> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => future::pending().await,
    }
}

impl<C: EventChannel> std::fmt::Debug for IngestionTracker<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionTracker")
            .field("state", &self.state)
            .field("current_stage_index", &self.current_stage_index)
            .field("stage_completed", &self.stage_completed)
            .field("active", &self.active)
            .finish()
    }
}
