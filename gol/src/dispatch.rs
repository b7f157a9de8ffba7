//! Band computers: where a band's next generation gets computed.

use std::future::Future;

use tokio::net::TcpStream;
use tracing::trace;

use crate::error::{ConfigError, WorkerError};
use crate::params::Params;
use crate::protocol::{WorkerReply, WorkerRequest, WorkerResponse, read_frame, write_frame};
use crate::stepper::{step_row, validate};

/// Computes one band for one turn. `band` is the band's index within the turn.
pub trait BandComputer: Send + Sync + 'static {
    fn compute(
        &self,
        band: usize,
        req: WorkerRequest,
    ) -> impl Future<Output = Result<WorkerResponse, WorkerError>> + Send;
}

/// In-process execution on the engine's runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalComputer;

impl BandComputer for LocalComputer {
    async fn compute(&self, _band: usize, req: WorkerRequest) -> Result<WorkerResponse, WorkerError> {
        validate(&req)?;
        let mut rows = Vec::with_capacity(req.height);
        for y in 0..req.height {
            rows.push(step_row(&req, y));
            tokio::task::yield_now().await;  // Cooperative yielding between rows
        }
        Ok(WorkerResponse { rows })
    }
}

/// Remote execution: band `i` goes to `addrs[i]`, over a fresh connection per call.
#[derive(Debug, Clone)]
pub struct RemoteComputer {
    addrs: Vec<String>,
}

impl RemoteComputer {
    pub fn new(addrs: Vec<String>) -> Self {
        Self { addrs }
    }
}

impl BandComputer for RemoteComputer {
    async fn compute(&self, band: usize, req: WorkerRequest) -> Result<WorkerResponse, WorkerError> {
        let addr = self.addrs.get(band).ok_or(WorkerError::NoAddress(band))?;
        let mut stream = TcpStream::connect(addr.as_str()).await.map_err(|source| {
            WorkerError::Connect { band, addr: addr.clone(), source }
        })?;
        trace!("band {band} -> {addr}");
        write_frame(&mut stream, &req).await?;
        match read_frame::<_, WorkerReply>(&mut stream).await? {
            Some(WorkerReply::Ok(res)) => Ok(res),
            Some(WorkerReply::Rejected(reason)) => Err(WorkerError::Rejected(reason)),
            None => Err(WorkerError::Io(std::io::ErrorKind::UnexpectedEof.into())),
        }
    }
}

/// The computer a run uses, picked from its parameters.
#[derive(Debug, Clone)]
pub enum Dispatcher {
    Local(LocalComputer),
    Remote(RemoteComputer),
}

impl Dispatcher {
    pub fn from_params(params: &Params) -> Result<Self, ConfigError> {
        params.validate()?;
        if params.distributed {
            Ok(Self::Remote(RemoteComputer::new(params.worker_addrs.clone())))
        } else {
            Ok(Self::Local(LocalComputer))
        }
    }
}

impl BandComputer for Dispatcher {
    async fn compute(&self, band: usize, req: WorkerRequest) -> Result<WorkerResponse, WorkerError> {
        match self {
            Self::Local(c) => c.compute(band, req).await,
            Self::Remote(c) => c.compute(band, req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ALIVE, Grid};
    use crate::partition::partition;
    use crate::stepper::step_band;
    use crate::worker::serve;
    use tokio::net::TcpListener;

    fn soup(width: usize, height: usize) -> Grid {
        let mut grid = Grid::new(width, height);
        let mut seed = 99u64;
        for y in 0..height {
            for x in 0..width {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                if (seed >> 16) % 3 == 0 { grid.set(x, y, ALIVE); }
            }
        }
        grid
    }

    async fn spawn_worker() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(serve(listener));
        addr
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn local_and_remote_agree_byte_for_byte() {
        let grid = soup(16, 13);
        let bands = partition(13, 3).unwrap();
        let mut addrs = Vec::new();
        for _ in 0..3 { addrs.push(spawn_worker().await); }
        let remote = RemoteComputer::new(addrs);

        for band in &bands {
            let req = WorkerRequest::for_band(&grid, &bands, band, 0);
            let local = LocalComputer.compute(band.index, req.clone()).await.unwrap();
            let over_wire = remote.compute(band.index, req.clone()).await.unwrap();
            assert_eq!(local, over_wire);
            assert_eq!(local, step_band(&req).unwrap());
        }
    }

    #[tokio::test]
    async fn remote_rejection_is_an_error() {
        let remote = RemoteComputer::new(vec![spawn_worker().await]);
        let grid = Grid::new(4, 4);
        let bands = partition(4, 2).unwrap();
        let mut req = WorkerRequest::for_band(&grid, &bands, &bands[0], 0);
        req.rows.pop();
        let err = remote.compute(0, req).await.unwrap_err();
        assert!(matches!(err, WorkerError::Rejected(_)));
    }

    #[tokio::test]
    async fn unreachable_worker_is_a_connect_error() {
        // Bind then drop to get a port nobody listens on.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().to_string()
        };
        let remote = RemoteComputer::new(vec![addr]);
        let grid = Grid::new(2, 2);
        let bands = partition(2, 1).unwrap();
        let req = WorkerRequest::for_band(&grid, &bands, &bands[0], 0);
        let err = remote.compute(0, req).await.unwrap_err();
        assert!(matches!(err, WorkerError::Connect { band: 0, .. }));
    }

    #[test]
    fn dispatcher_follows_params() {
        let local = Params { threads: 2, image_width: 4, image_height: 4, ..Params::default() };
        assert!(matches!(Dispatcher::from_params(&local), Ok(Dispatcher::Local(_))));

        let remote = Params {
            distributed: true,
            worker_addrs: vec!["a:1".into(), "b:2".into()],
            ..local.clone()
        };
        assert!(matches!(Dispatcher::from_params(&remote), Ok(Dispatcher::Remote(_))));

        let short = Params { worker_addrs: vec!["a:1".into()], ..remote };
        assert_eq!(
            Dispatcher::from_params(&short).unwrap_err(),
            ConfigError::WorkerCountMismatch { threads: 2, addresses: 1 }
        );
    }
}
