//! Periodic alive-cell reporting.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::engine::World;
use crate::event::{Event, EventSender};

/// Background task emitting `AliveCellsCount` every period until stopped.
pub struct Reporter {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Reporter {
    pub fn spawn(world: Arc<Mutex<World>>, events: EventSender, period: Duration) -> Self {
        let (stop, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;  // First tick completes immediately
            loop {
                tokio::select! {
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {
                        let (turn, count) = {
                            let world = world.lock().unwrap_or_else(PoisonError::into_inner);
                            (world.turn, world.grid.alive_count())
                        };
                        if events.send(Event::AliveCellsCount { turn, count }).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("reporter stopped");
        });
        Self { stop, handle }
    }

    /// Stops the ticker and waits for the task to finish, after which it
    /// never sends again.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event;
    use crate::grid::{ALIVE, Grid};

    #[tokio::test(start_paused = true)]
    async fn reports_count_and_turn_each_period() {
        let mut grid = Grid::new(4, 4);
        grid.set(1, 1, ALIVE);
        grid.set(2, 2, ALIVE);
        let world = Arc::new(Mutex::new(World { grid, turn: 5 }));
        let (tx, mut rx) = event::channel();

        let reporter = Reporter::spawn(Arc::clone(&world), tx, Duration::from_secs(2));
        time::sleep(Duration::from_millis(4100)).await;
        reporter.stop().await;

        let mut seen = Vec::new();
        while let Some(e) = rx.recv().await {
            seen.push(e);
        }
        assert_eq!(
            seen,
            vec![
                Event::AliveCellsCount { turn: 5, count: 2 },
                Event::AliveCellsCount { turn: 5, count: 2 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_sent_before_the_first_period() {
        let world = Arc::new(Mutex::new(World { grid: Grid::new(2, 2), turn: 0 }));
        let (tx, mut rx) = event::channel();
        let reporter = Reporter::spawn(world, tx, Duration::from_secs(2));
        time::sleep(Duration::from_millis(1500)).await;
        reporter.stop().await;
        assert_eq!(rx.recv().await, None);
    }
}
