//! Events emitted by a run, consumed by renderers and loggers.

use std::fmt;

use tokio::sync::mpsc;

use crate::grid::Cell;

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// The sink: unbounded, one ordered stream per sender.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Executing,
    Paused,
    Quitting,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Executing => "Executing",
            State::Paused => "Paused",
            State::Quitting => "Quitting",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StateChange { turn: u64, state: State },
    /// Emitted per live cell of the initial grid only.
    CellFlipped { turn: u64, cell: Cell },
    CellsFlipped { turn: u64, cells: Vec<Cell> },
    TurnComplete { turn: u64 },
    AliveCellsCount { turn: u64, count: usize },
    ImageOutputComplete { turn: u64, filename: String },
    FinalTurnComplete { turn: u64, alive: Vec<Cell> },
}

impl Event {
    /// Completed turns at the time of the event.
    pub fn turn(&self) -> u64 {
        match self {
            Event::StateChange { turn, .. }
            | Event::CellFlipped { turn, .. }
            | Event::CellsFlipped { turn, .. }
            | Event::TurnComplete { turn }
            | Event::AliveCellsCount { turn, .. }
            | Event::ImageOutputComplete { turn, .. }
            | Event::FinalTurnComplete { turn, .. } => *turn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::StateChange { state, .. } => write!(f, "{state}"),
            Event::CellFlipped { cell, .. } => write!(f, "Cell ({}, {}) flipped", cell.x, cell.y),
            Event::CellsFlipped { cells, .. } => write!(f, "{} cells flipped", cells.len()),
            Event::TurnComplete { .. } => f.write_str(""),
            Event::AliveCellsCount { count, .. } => write!(f, "Alive Cells {count}"),
            Event::ImageOutputComplete { filename, .. } => write!(f, "File {filename} Output Done"),
            Event::FinalTurnComplete { alive, .. } => write!(f, "Final turn complete, {} alive", alive.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_is_readable_from_every_variant() {
        let events = [
            Event::StateChange { turn: 1, state: State::Paused },
            Event::CellFlipped { turn: 1, cell: Cell::new(0, 0) },
            Event::TurnComplete { turn: 1 },
            Event::FinalTurnComplete { turn: 1, alive: vec![] },
        ];
        assert!(events.iter().all(|e| e.turn() == 1));
    }

    #[test]
    fn display_is_human_readable() {
        let e = Event::AliveCellsCount { turn: 4, count: 12 };
        assert_eq!(e.to_string(), "Alive Cells 12");
        assert_eq!(Event::StateChange { turn: 0, state: State::Quitting }.to_string(), "Quitting");
    }
}
