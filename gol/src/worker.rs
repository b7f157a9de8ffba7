//! Worker service: the slice stepper behind a TCP listener.
//!
//! Stateless across calls, so any number of workers can serve bands
//! interchangeably.

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, info, warn};

use crate::error::WorkerError;
use crate::protocol::{WorkerReply, WorkerRequest, read_frame, write_frame};
use crate::stepper::step_band;

/// Answers one request. Malformed bands become a rejection rather than an error.
pub fn handle(req: &WorkerRequest) -> WorkerReply {
    match step_band(req) {
        Ok(res) => WorkerReply::Ok(res),
        Err(e) => WorkerReply::Rejected(e.to_string()),
    }
}

/// Binds `addr` and serves forever.
pub async fn run_server<A: ToSocketAddrs>(addr: A) -> Result<(), WorkerError> {
    let listener = TcpListener::bind(addr).await?;
    info!("[Server] listening on {}", listener.local_addr()?);
    serve(listener).await
}

/// Accepts connections on an already-bound listener, one task per connection.
pub async fn serve(listener: TcpListener) -> Result<(), WorkerError> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("[Server] accept error: {e}");
                continue;
            }
        };
        tokio::spawn(async move {
            if let Err(e) = serve_connection(stream).await {
                warn!("[Server] connection from {peer} failed: {e}");
            }
        });
    }
}

async fn serve_connection(mut stream: TcpStream) -> Result<(), WorkerError> {
    while let Some(req) = read_frame::<_, WorkerRequest>(&mut stream).await? {
        debug!("[Server] turn {} band [{}, +{})", req.turn, req.start_y, req.height);
        // Stepping is CPU-bound; keep it off the reactor threads.
        let reply = tokio::task::spawn_blocking(move || handle(&req)).await?;
        if let WorkerReply::Rejected(reason) = &reply {
            warn!("[Server] rejected request: {reason}");
        }
        write_frame(&mut stream, &reply).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn malformed_requests_are_rejected() {
        let grid = Grid::new(3, 3);
        let mut req = WorkerRequest {
            start_y: 0,
            height: 3,
            image_width: 3,
            image_height: 3,
            rows: grid.rows(0..3),
            turn: 0,
            halo_upper: None,
            halo_lower: None,
        };
        assert!(matches!(handle(&req), WorkerReply::Ok(_)));
        req.image_width = 4;
        assert!(matches!(handle(&req), WorkerReply::Rejected(_)));

        req.image_width = 3;
        req.start_y = usize::MAX;
        assert!(matches!(handle(&req), WorkerReply::Rejected(_)));
    }

    #[tokio::test]
    async fn serves_several_requests_on_one_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener));

        let grid = Grid::new(2, 2);
        let req = WorkerRequest {
            start_y: 0,
            height: 2,
            image_width: 2,
            image_height: 2,
            rows: grid.rows(0..2),
            turn: 3,
            halo_upper: None,
            halo_lower: None,
        };
        let mut stream = TcpStream::connect(addr).await.unwrap();
        for _ in 0..2 {
            write_frame(&mut stream, &req).await.unwrap();
            let reply: Option<WorkerReply> = read_frame(&mut stream).await.unwrap();
            assert!(matches!(reply, Some(WorkerReply::Ok(r)) if r.rows == grid.rows(0..2)));
        }
    }
}
