//! Run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// How often the alive-cell count is reported.
pub const ALIVE_REPORT_PERIOD: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub turns: u64,
    pub threads: usize,
    pub image_width: usize,
    pub image_height: usize,
    /// Send bands to remote workers instead of computing them in-process.
    pub distributed: bool,
    /// One address per thread when `distributed` is set.
    pub worker_addrs: Vec<String>,
    pub report_period: Duration,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            turns: 10_000_000_000,
            threads: 8,
            image_width: 512,
            image_height: 512,
            distributed: false,
            worker_addrs: Vec::new(),
            report_period: ALIVE_REPORT_PERIOD,
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("out"),
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigError::EmptyImage { width: self.image_width, height: self.image_height });
        }
        if self.threads == 0 || self.threads > self.image_height {
            return Err(ConfigError::BadThreadCount { threads: self.threads, height: self.image_height });
        }
        if self.distributed && self.worker_addrs.len() != self.threads {
            return Err(ConfigError::WorkerCountMismatch {
                threads: self.threads,
                addresses: self.worker_addrs.len(),
            });
        }
        Ok(())
    }

    /// Base name of an image at `turn`: `{width}x{height}x{turn}`.
    pub fn snapshot_name(&self, turn: u64) -> String {
        format!("{}x{}x{}", self.image_width, self.image_height, turn)
    }

    /// Base name of the input image: `{width}x{height}`.
    pub fn input_name(&self) -> String {
        format!("{}x{}", self.image_width, self.image_height)
    }
}

/// Splits a comma-separated address list, dropping blanks.
pub fn split_worker_addrs(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Params::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_shapes() {
        let p = Params { image_width: 0, ..Params::default() };
        assert!(matches!(p.validate(), Err(ConfigError::EmptyImage { .. })));
        let p = Params { threads: 0, ..Params::default() };
        assert!(matches!(p.validate(), Err(ConfigError::BadThreadCount { .. })));
        let p = Params { threads: 16, image_height: 8, ..Params::default() };
        assert!(matches!(p.validate(), Err(ConfigError::BadThreadCount { threads: 16, height: 8 })));
    }

    #[test]
    fn distributed_needs_one_address_per_thread() {
        let p = Params { distributed: true, threads: 2, worker_addrs: vec!["x:1".into()], ..Params::default() };
        assert_eq!(p.validate(), Err(ConfigError::WorkerCountMismatch { threads: 2, addresses: 1 }));
    }

    #[test]
    fn names_follow_dimensions_and_turn() {
        let p = Params { image_width: 16, image_height: 32, ..Params::default() };
        assert_eq!(p.snapshot_name(100), "16x32x100");
        assert_eq!(p.input_name(), "16x32");
    }

    #[test]
    fn worker_list_is_trimmed() {
        assert_eq!(split_worker_addrs(" a:1 , ,b:2,"), vec!["a:1", "b:2"]);
        assert!(split_worker_addrs("").is_empty());
    }
}
