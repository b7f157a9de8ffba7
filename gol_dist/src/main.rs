//! Distributed Conway's Game of Life front end.
//!
//! `gol run` drives a simulation, `gol serve` is a remote band worker,
//! `gol seed` writes starting images.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use gol::params::split_worker_addrs;
use gol::protocol::DEFAULT_WORKER_ADDR;
use gol::{Grid, ImageStore, Params, PgmStore, patterns};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod headless;
mod keys;
#[cfg(feature = "viewer")]
mod viewer;

#[derive(Parser)]
#[command(name = "gol", about = "Distributed Conway's Game of Life")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulation from `{images}/{width}x{height}.pgm`.
    #[command(disable_help_flag = true)]
    Run(RunArgs),
    /// Serve band computations for distributed runs.
    Serve {
        #[arg(long, default_value = DEFAULT_WORKER_ADDR)]
        listen: String,
    },
    /// Write a starting image from a named pattern or a random fill.
    Seed(SeedArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Number of bands computed in parallel.
    #[arg(short = 't', long, default_value_t = 8)]
    threads: usize,
    #[arg(short = 'w', long, default_value_t = 512)]
    width: usize,
    #[arg(short = 'h', long, default_value_t = 512)]
    height: usize,
    #[arg(long, default_value_t = 10_000_000_000)]
    turns: u64,
    /// Send bands to remote workers.
    #[arg(long)]
    dist: bool,
    /// Remote worker addresses, comma-separated (e.g. "ip:port,ip:port").
    #[arg(long, default_value = "")]
    workers: String,
    /// Log events instead of opening a window.
    #[arg(long)]
    headless: bool,
    #[arg(long, default_value = "images")]
    images: PathBuf,
    #[arg(long, default_value = "out")]
    out: PathBuf,
    #[arg(long, action = clap::ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

impl RunArgs {
    fn params(&self) -> Params {
        Params {
            turns: self.turns,
            threads: self.threads,
            image_width: self.width,
            image_height: self.height,
            distributed: self.dist,
            worker_addrs: split_worker_addrs(&self.workers),
            input_dir: self.images.clone(),
            output_dir: self.out.clone(),
            ..Params::default()
        }
    }
}

#[derive(Args)]
struct SeedArgs {
    /// Pattern name, or "random".
    pattern: String,
    #[arg(short = 'w', long, default_value_t = 512)]
    width: usize,
    #[arg(long, default_value_t = 512)]
    height: usize,
    /// Where to stamp the pattern's origin.
    #[arg(long, default_value_t = 0)]
    x: usize,
    #[arg(long, default_value_t = 0)]
    y: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value = "images")]
    images: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let runtime = Runtime::new().context("failed to start the tokio runtime")?;

    match cli.command {
        Command::Run(args) => run(&runtime, &args),
        Command::Serve { listen } => runtime
            .block_on(gol::worker::run_server(listen))
            .context("worker server failed"),
        Command::Seed(args) => runtime.block_on(seed(&args)),
    }
}

fn run(runtime: &Runtime, args: &RunArgs) -> Result<()> {
    let params = args.params();
    params.validate().context("invalid configuration")?;

    info!("[Main] {:<10} {}", "Threads", params.threads);
    info!("[Main] {:<10} {}", "Width", params.image_width);
    info!("[Main] {:<10} {}", "Height", params.image_height);
    info!("[Main] {:<10} {}", "Turns", params.turns);
    if params.distributed {
        info!("[Main] {:<10} {}", "Workers", params.worker_addrs.join(","));
    }

    let store = PgmStore::new(&params.input_dir, &params.output_dir);
    let (events, event_rx) = gol::event::channel();
    let (key_tx, key_rx) = mpsc::channel(10);

    let _guard = runtime.enter();
    keys::spawn_stdin(key_tx.clone());
    keys::spawn_sigint(key_tx.clone());
    let engine = runtime.spawn(gol::run(params.clone(), store, events, key_rx));

    if args.headless {
        runtime.block_on(headless::log_events(event_rx));
    } else {
        show(runtime, &params, event_rx, key_tx)?;
    }

    runtime
        .block_on(engine)
        .context("engine task panicked")?
        .context("run failed")
}

#[cfg(feature = "viewer")]
fn show(
    _runtime: &Runtime,
    params: &Params,
    events: gol::event::EventReceiver,
    keys: mpsc::Sender<char>,
) -> Result<()> {
    viewer::run(params, events, keys.clone())?;
    // Closing the window ends the run the same way 'q' does.
    let _ = keys.try_send('q');
    Ok(())
}

#[cfg(not(feature = "viewer"))]
fn show(
    runtime: &Runtime,
    _params: &Params,
    events: gol::event::EventReceiver,
    _keys: mpsc::Sender<char>,
) -> Result<()> {
    warn!("[Main] built without the viewer, logging events instead");
    runtime.block_on(headless::log_events(events));
    Ok(())
}

async fn seed(args: &SeedArgs) -> Result<()> {
    if args.width == 0 || args.height == 0 {
        bail!("seed image must be at least 1x1, got {}x{}", args.width, args.height);
    }
    let mut grid = Grid::new(args.width, args.height);
    if args.pattern.eq_ignore_ascii_case("random") {
        patterns::apply_random_pattern(&mut grid, args.seed);
    } else {
        let Some(pattern) = patterns::find(&args.pattern) else {
            let known: Vec<_> = patterns::PATTERNS.iter().map(|p| p.name).collect();
            bail!("unknown pattern {:?}; known: random, {}", args.pattern, known.join(", "));
        };
        patterns::apply_pattern(&mut grid, pattern, args.x, args.y);
    }
    if grid.alive_count() == 0 {
        warn!("[Main] seed image has no live cells");
    }

    let name = format!("{}x{}", args.width, args.height);
    let store = PgmStore::new(&args.images, &args.images);
    store.save(&name, &grid).await.context("failed to write seed image")?;
    info!("[Main] wrote {} ({} alive)", store.output_path(&name).display(), grid.alive_count());
    Ok(())
}
