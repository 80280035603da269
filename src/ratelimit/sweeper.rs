//! Background eviction of idle phone number records.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::limiter::RateLimiter;

/// Handle to the background sweep task.
///
/// The task runs one eviction pass per interval until [`Sweeper::shutdown`]
/// is called. Dropping the handle without shutting down leaves the task
/// running for the life of the runtime, which is fine for the server process;
/// tests should always shut down.
pub struct Sweeper {
    handle: JoinHandle<()>,
    stop: watch::Sender<bool>,
}

impl Sweeper {
    /// Spawn the sweep loop for `limiter`, running every `interval`.
    pub fn spawn(limiter: Arc<RateLimiter>, interval: Duration) -> Self {
        let (stop, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately; consume it
            // so the first real pass happens one interval after startup.
            ticker.tick().await;

            debug!(interval_secs = interval.as_secs_f64(), "Sweeper started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        limiter.sweep_once(Instant::now());
                    }
                    _ = stopped.changed() => {
                        debug!("Sweeper stopping");
                        break;
                    }
                }
            }
        });

        Self { handle, stop }
    }

    /// Signal the sweep loop to stop and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if self.handle.await.is_err() {
            info!("Sweeper task ended abnormally");
        }
    }
}
