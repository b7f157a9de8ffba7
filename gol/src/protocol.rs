//! Worker call contract and its wire framing.
//!
//! A call carries one band by value together with its halo rows; the reply
//! carries the band's next generation. Both local and remote execution use
//! these types, so the engine never sees which path computed a band.
//!
//! On the wire every message is a big-endian `u32` length followed by a
//! bincode body. A client opens a connection, writes one [`WorkerRequest`],
//! reads one [`WorkerReply`] and closes.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::WorkerError;
use crate::grid::{Grid, TRow};
use crate::partition::{Band, halo_rows};

/// Largest frame either side will accept.
pub const MAX_FRAME: usize = 256 * 1024 * 1024;

pub const DEFAULT_WORKER_ADDR: &str = "0.0.0.0:8030";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub start_y: usize,
    pub height: usize,
    pub image_width: usize,
    pub image_height: usize,
    /// The band's rows, `height` of them.
    pub rows: Vec<TRow>,
    /// Informational only.
    pub turn: u64,
    pub halo_upper: Option<TRow>,
    pub halo_lower: Option<TRow>,
}

impl WorkerRequest {
    /// Copies `band` and its wrapped halo rows out of `grid`.
    pub fn for_band(grid: &Grid, bands: &[Band], band: &Band, turn: u64) -> Self {
        let halos = halo_rows(bands, band.index);
        Self {
            start_y: band.start_y,
            height: band.height,
            image_width: grid.width(),
            image_height: grid.height(),
            rows: grid.rows(band.start_y..band.end_y()),
            turn,
            halo_upper: Some(grid.row(halos.upper).to_vec()),
            halo_lower: Some(grid.row(halos.lower).to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResponse {
    /// Next-generation rows, same shape as the request's band.
    pub rows: Vec<TRow>,
}

/// What a worker sends back on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerReply {
    Ok(WorkerResponse),
    Rejected(String),
}

pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), WorkerError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = bincode::serialize(message)?;
    if body.len() > MAX_FRAME {
        return Err(WorkerError::FrameTooLarge(body.len()));
    }
    writer.write_u32(body.len() as u32).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame. `Ok(None)` means the peer closed cleanly before a new frame.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, WorkerError>
where
    R: AsyncRead + Unpin,
    T: for<'de> Deserialize<'de>,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if len > MAX_FRAME {
        return Err(WorkerError::FrameTooLarge(len));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(bincode::deserialize(&body)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ALIVE;
    use crate::partition::partition;

    #[test]
    fn request_copies_band_and_wrapped_halos() {
        let mut grid = Grid::new(3, 5);
        grid.set(0, 4, ALIVE);
        grid.set(2, 2, ALIVE);
        let bands = partition(5, 2).unwrap();

        let first = WorkerRequest::for_band(&grid, &bands, &bands[0], 7);
        assert_eq!((first.start_y, first.height, first.turn), (0, 2, 7));
        assert_eq!(first.rows.len(), 2);
        assert_eq!(first.halo_upper.as_deref(), Some(grid.row(4)));
        assert_eq!(first.halo_lower.as_deref(), Some(grid.row(2)));

        let last = WorkerRequest::for_band(&grid, &bands, &bands[1], 7);
        assert_eq!((last.start_y, last.height), (2, 3));
        assert_eq!(last.halo_upper.as_deref(), Some(grid.row(1)));
        assert_eq!(last.halo_lower.as_deref(), Some(grid.row(0)));
    }

    #[tokio::test]
    async fn frames_survive_a_duplex_pipe() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        let reply = WorkerReply::Rejected("bad band".into());
        write_frame(&mut a, &reply).await.unwrap();
        drop(a);

        let got: Option<WorkerReply> = read_frame(&mut b).await.unwrap();
        assert_eq!(got, Some(reply));
        let eof: Option<WorkerReply> = read_frame(&mut b).await.unwrap();
        assert_eq!(eof, None);
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_refused() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_u32(u32::MAX).await.unwrap();
        let got: Result<Option<WorkerReply>, _> = read_frame(&mut b).await;
        assert!(matches!(got, Err(WorkerError::FrameTooLarge(_))));
    }
}
