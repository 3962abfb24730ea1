use std::{sync::Arc, time::Duration};

use tokio::{
    select,
    sync::Notify,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{error, info, info_span, Instrument};

use crate::tracker::{RotationOutcome, TrackerHandle};

/// Drives the periodic rescoring and leaderboard rotation.
pub struct Scheduler {
    tracker: TrackerHandle,
    rescore_interval: Duration,
    rotation_interval: Duration,
}

impl Scheduler {
    pub fn create_and_start(
        shutdown: Arc<Notify>,
        tracker: TrackerHandle,
        rescore_interval: Duration,
        rotation_interval: Duration,
    ) {
        let scheduler = Scheduler {
            tracker,
            rescore_interval,
            rotation_interval,
        };

        scheduler.start(shutdown);
    }

    fn start(self, shutdown: Arc<Notify>) {
        tokio::spawn(
            async move {
                let mut rescore_timer = timer(self.rescore_interval);
                let mut rotation_timer = timer(self.rotation_interval);

                info!(
                    "Rescoring every {:?}, rotating the leaderboard every {:?}",
                    self.rescore_interval, self.rotation_interval
                );

                loop {
                    select! {
                        _ = rescore_timer.tick() => {
                            if let Err(err) = self.tracker.rescore().await {
                                error!("Could not rescore submissions: {err}");
                            }
                        }

                        _ = rotation_timer.tick() => {
                            match self.tracker.rotate().await {
                                Ok(RotationOutcome::Rotated { report, report_sent }) => info!(
                                    "Leaderboard rotated with {} entries (sent: {report_sent})",
                                    report.len()
                                ),
                                Ok(RotationOutcome::Empty) => {}
                                Err(err) => error!("Could not rotate the leaderboard: {err}"),
                            }
                        }

                        _ = shutdown.notified() => {
                            info!("Stopping the scheduler");
                            break;
                        }
                    }
                }
            }
            .instrument(info_span!("scheduler")),
        );
    }
}

/// A timer whose first tick comes one period from now. Late ticks push the schedule back
/// instead of firing in a burst.
fn timer(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
