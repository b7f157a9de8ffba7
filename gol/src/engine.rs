//! Turn engine: owns the grid, runs turns across bands, and services
//! control keys between turns.
//!
//! Each turn snapshots the grid, fans one band computation out per band,
//! waits for all of them, and only then installs the assembled grid. A
//! failed band leaves the grid at its pre-turn value and ends the run.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, trace};

use crate::dispatch::{BandComputer, Dispatcher};
use crate::error::EngineError;
use crate::event::{Event, EventSender, State};
use crate::grid::Grid;
use crate::image::ImageStore;
use crate::params::Params;
use crate::partition::{Band, partition};
use crate::protocol::WorkerRequest;
use crate::reporter::Reporter;

/// Sleep between control checks while paused.
const PAUSE_POLL: Duration = Duration::from_millis(10);

/// The shared state: current grid and the number of completed turns.
#[derive(Debug, Clone)]
pub struct World {
    pub grid: Grid,
    pub turn: u64,
}

/// A control key from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    TogglePause,
    Snapshot,
    Quit,
}

impl Control {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'p' => Some(Control::TogglePause),
            's' => Some(Control::Snapshot),
            'q' => Some(Control::Quit),
            _ => None,
        }
    }
}

pub struct Engine<C, S> {
    params: Params,
    computer: Arc<C>,
    store: S,
    world: Arc<Mutex<World>>,
    events: EventSender,
    bands: Vec<Band>,
    paused: bool,
}

impl<C: BandComputer, S: ImageStore> Engine<C, S> {
    /// Loads the initial image and reports each of its live cells.
    pub async fn load(params: Params, computer: C, store: S, events: EventSender) -> Result<Self, EngineError> {
        params.validate()?;
        let bands = partition(params.image_height, params.threads)?;
        let grid = store.load(&params.input_name(), params.image_width, params.image_height).await?;

        let alive = grid.alive_cells();
        let engine = Self {
            params,
            computer: Arc::new(computer),
            store,
            world: Arc::new(Mutex::new(World { grid, turn: 0 })),
            events,
            bands,
            paused: false,
        };
        for cell in alive {
            engine.emit(Event::CellFlipped { turn: 0, cell });
        }
        Ok(engine)
    }

    /// Shared handle on the grid and turn counter. Holders must only read.
    pub fn world(&self) -> Arc<Mutex<World>> {
        Arc::clone(&self.world)
    }

    /// Copy of the grid and its completed-turn count, taken under the lock.
    pub fn snapshot(&self) -> (Grid, u64) {
        let world = self.lock();
        (world.grid.clone(), world.turn)
    }

    pub fn turn(&self) -> u64 {
        self.lock().turn
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            trace!("event sink has no receiver");
        }
    }

    /// Runs one full turn and returns the new completed-turn count.
    pub async fn step(&self) -> Result<u64, EngineError> {
        let (current, turn) = self.snapshot();

        let handles: Vec<_> = self
            .bands
            .iter()
            .map(|band| {
                let req = WorkerRequest::for_band(&current, &self.bands, band, turn);
                let computer = Arc::clone(&self.computer);
                let index = band.index;
                tokio::spawn(async move { computer.compute(index, req).await })
            })
            .collect();

        // Every band is awaited before anything is applied.
        let mut rows = Vec::with_capacity(current.height());
        let mut failure = None;
        for (band, handle) in self.bands.iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(e.into()),
            };
            match result {
                Ok(res) if res.rows.len() == band.height => rows.extend(res.rows),
                Ok(_) => {
                    failure.get_or_insert(EngineError::Assembly {
                        width: current.width(),
                        height: current.height(),
                    });
                }
                Err(source) => {
                    failure.get_or_insert(EngineError::Worker { band: band.index, source });
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        let next = Grid::from_rows(current.width(), rows).ok_or(EngineError::Assembly {
            width: current.width(),
            height: current.height(),
        })?;

        let completed = turn + 1;
        let flipped = current.flipped(&next);
        if !flipped.is_empty() {
            self.emit(Event::CellsFlipped { turn: completed, cells: flipped });
        }
        {
            let mut world = self.lock();
            world.grid = next;
            world.turn = completed;
        }
        self.emit(Event::TurnComplete { turn: completed });
        Ok(completed)
    }

    /// Writes the current grid as `{width}x{height}x{turn}` without touching
    /// turn progress or the pause state.
    pub async fn save_snapshot(&self) -> Result<(), EngineError> {
        let (grid, turn) = self.snapshot();
        self.write_image(&grid, turn).await
    }

    async fn write_image(&self, grid: &Grid, turn: u64) -> Result<(), EngineError> {
        let filename = self.params.snapshot_name(turn);
        self.store.save(&filename, grid).await?;
        info!("[Engine] wrote {filename}");
        self.emit(Event::ImageOutputComplete { turn, filename });
        Ok(())
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        let state = if self.paused { State::Paused } else { State::Executing };
        let turn = self.turn();
        info!("[Engine] {state} at turn {turn}");
        self.emit(Event::StateChange { turn, state });
    }

    /// Runs until the turn limit or a quit key, then reports the final turn,
    /// writes a last image, announces `Quitting` and closes the event sink.
    /// On error the sink closes without the terminal events.
    pub async fn run(mut self, mut keys: mpsc::Receiver<char>) -> Result<(), EngineError> {
        self.emit(Event::StateChange { turn: self.turn(), state: State::Executing });
        let reporter = Reporter::spawn(self.world(), self.events.clone(), self.params.report_period);

        let outcome = self.turn_loop(&mut keys).await;
        reporter.stop().await;
        outcome?;

        let (grid, turn) = self.snapshot();
        self.emit(Event::FinalTurnComplete { turn, alive: grid.alive_cells() });
        self.write_image(&grid, turn).await?;
        self.emit(Event::StateChange { turn, state: State::Quitting });
        info!("[Engine] finished after {turn} turns");
        Ok(())
    }

    async fn turn_loop(&mut self, keys: &mut mpsc::Receiver<char>) -> Result<(), EngineError> {
        while self.turn() < self.params.turns {
            match keys.try_recv() {
                Ok(key) => match Control::from_key(key) {
                    Some(Control::TogglePause) => self.toggle_pause(),
                    Some(Control::Snapshot) => self.save_snapshot().await?,
                    Some(Control::Quit) => {
                        info!("[Engine] quit requested at turn {}", self.turn());
                        return Ok(());
                    }
                    None => debug!("ignoring key {key:?}"),
                },
                Err(TryRecvError::Disconnected) if self.paused => {
                    // Nothing can resume a paused run once control input is gone.
                    info!("[Engine] control input closed while paused at turn {}", self.turn());
                    return Ok(());
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                    if self.paused {
                        tokio::time::sleep(PAUSE_POLL).await;
                        continue;
                    }
                    self.step().await?;
                }
            }
        }
        Ok(())
    }
}

/// Loads the input image and runs it to completion with the computer the
/// parameters select.
pub async fn run<S: ImageStore>(
    params: Params,
    store: S,
    events: EventSender,
    keys: mpsc::Receiver<char>,
) -> Result<(), EngineError> {
    let computer = Dispatcher::from_params(&params)?;
    Engine::load(params, computer, store, events).await?.run(keys).await
}
