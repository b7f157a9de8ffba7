//! Control input: keys typed on stdin and Ctrl+C.

use std::io::Read;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A second Ctrl+C inside this window exits immediately.
const FORCE_QUIT_WINDOW: Duration = Duration::from_secs(4);

fn is_control(key: char) -> bool {
    matches!(key, 'p' | 's' | 'q')
}

/// Forwards `p`, `s` and `q` typed on stdin. Runs on its own OS thread since
/// stdin reads block.
pub fn spawn_stdin(keys: mpsc::Sender<char>) {
    std::thread::spawn(move || {
        for byte in std::io::stdin().lock().bytes() {
            let Ok(byte) = byte else { break };
            let key = byte as char;
            if !is_control(key) {
                continue;
            }
            if keys.blocking_send(key).is_err() {
                break;  // Engine gone
            }
        }
        debug!("stdin closed");
    });
}

/// First Ctrl+C asks the engine to quit; a second one within
/// [`FORCE_QUIT_WINDOW`] exits the process.
pub fn spawn_sigint(keys: mpsc::Sender<char>) {
    tokio::spawn(async move {
        let mut armed: Option<Instant> = None;
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("[Main] cannot listen for Ctrl+C: {e}");
                return;
            }
            if armed.is_some_and(|at| at.elapsed() < FORCE_QUIT_WINDOW) {
                warn!("[Main] Force quit by the user");
                std::process::exit(0);
            }
            warn!("[Main] Quitting; press Ctrl+C again to force quit");
            armed = Some(Instant::now());
            if keys.try_send('q').is_err() {
                debug!("control queue full or closed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_control_keys_pass() {
        let passed: String = "psqx\nP q".chars().filter(|&c| is_control(c)).collect();
        assert_eq!(passed, "psqq");
    }
}
