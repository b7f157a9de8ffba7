//! Distributed Game of Life.
//!
//! A toroidal grid is advanced turn by turn. Each turn the grid is split into
//! horizontal bands, and every band, together with the row above and below it,
//! is stepped either on an in-process task or on a remote worker reached over
//! TCP. Progress goes out as [`Event`]s; pause, snapshot and quit come in as
//! single-character keys.
//!
//! ```no_run
//! # async fn demo() -> Result<(), gol::EngineError> {
//! let params = gol::Params { turns: 100, threads: 4, ..gol::Params::default() };
//! let store = gol::PgmStore::new(&params.input_dir, &params.output_dir);
//! let (events, mut rx) = gol::event::channel();
//! let (_keys, key_rx) = tokio::sync::mpsc::channel(10);
//! tokio::spawn(async move { while let Some(e) = rx.recv().await { println!("{e}"); } });
//! gol::run(params, store, events, key_rx).await
//! # }
//! ```

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod event;
pub mod grid;
pub mod image;
pub mod params;
pub mod partition;
pub mod patterns;
pub mod protocol;
pub mod reporter;
pub mod rule;
pub mod stepper;
pub mod worker;

pub use dispatch::{BandComputer, Dispatcher, LocalComputer, RemoteComputer};
pub use engine::{Control, Engine, World, run};
pub use error::{ConfigError, EngineError, ImageError, StepError, WorkerError};
pub use event::{Event, State};
pub use grid::{ALIVE, Cell, DEAD, Grid};
pub use image::{ImageStore, MemoryStore, PgmStore};
pub use params::Params;
pub use protocol::{WorkerRequest, WorkerResponse};
