//! Periodic driver for animated cells.
//!
//! One scheduler serves the whole hub. Each tick snapshots the open views
//! and advances their due animations; views whose animations prefer to run
//! off-thread go to the blocking pool, the rest run on the scheduler task.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::hub::MenuHub;
use crate::view::MenuView;

pub struct AnimationScheduler {
    hub: Weak<MenuHub>,
}

impl AnimationScheduler {
    pub fn new(hub: &Arc<MenuHub>) -> Self {
        Self {
            hub: Arc::downgrade(hub),
        }
    }

    /// Advance the due animations of every open view once.
    ///
    /// Returns how many cells changed. A view that fails has its animations
    /// cancelled; the others are unaffected.
    pub async fn tick(&self) -> usize {
        let Some(hub) = self.hub.upgrade() else {
            return 0;
        };
        let (offloaded, inline): (Vec<_>, Vec<_>) = hub
            .open_views()
            .into_iter()
            .filter(|view| view.track_animations())
            .partition(|view| view.prefers_offload());
        drop(hub);

        let handles: Vec<_> = offloaded
            .into_iter()
            .map(|view| tokio::task::spawn_blocking(move || tick_view(&view)))
            .collect();

        let mut changed: usize = inline.iter().map(|view| tick_view(view)).sum();
        for result in join_all(handles).await {
            match result {
                Ok(count) => changed += count,
                Err(e) => warn!("Offloaded animation batch failed: {}", e),
            }
        }
        changed
    }

    /// Spawn the periodic loop on the current tokio runtime.
    ///
    /// The loop ends when the returned handle is dropped or the hub goes away.
    pub fn start(self, period: Duration, delay: Duration) -> AnimationHandle {
        let period = period.max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + delay, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if self.hub.strong_count() == 0 {
                    debug!("Menu hub dropped, animation loop exiting");
                    break;
                }
                self.tick().await;
            }
        });
        info!("Animation scheduler started (every {:?})", period);
        AnimationHandle { task }
    }

    /// Start with the cadence configured in the hub's settings
    pub fn spawn(hub: &Arc<MenuHub>) -> AnimationHandle {
        let settings = hub.settings();
        Self::new(hub).start(settings.animation_period(), settings.animation_start_delay())
    }
}

fn tick_view(view: &MenuView) -> usize {
    match catch_unwind(AssertUnwindSafe(|| view.tick_animations())) {
        Ok(Ok(changed)) => changed,
        Ok(Err(e)) => {
            warn!("Stopping animations of '{}': {}", view.menu().name(), e);
            view.cancel_animations();
            0
        }
        Err(_) => {
            warn!("Animation of '{}' panicked, stopping its animations", view.menu().name());
            view.cancel_animations();
            0
        }
    }
}

/// Running scheduler loop; stops when dropped
pub struct AnimationHandle {
    task: JoinHandle<()>,
}

impl AnimationHandle {
    pub fn stop(self) {}

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.task.abort();
        info!("Animation scheduler stopped");
    }
}
