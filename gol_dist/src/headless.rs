//! Headless event consumer.

use gol::Event;
use gol::event::EventReceiver;
use tracing::{debug, info, trace};

/// Logs events until the engine closes the sink.
pub async fn log_events(mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        match &event {
            Event::CellFlipped { .. } | Event::CellsFlipped { .. } => trace!("{event}"),
            Event::TurnComplete { turn } => debug!("[Event] turn {turn} complete"),
            _ => info!("[Event] Completed Turns {:<8} {}", event.turn(), event),
        }
    }
}
