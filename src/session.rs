//! Connection session: one simulated client's bounded receive loop
//!
//! A session holds a single connection for a fixed window and records the
//! time between consecutive inbound messages. The first sample is measured
//! from the moment measurement starts. The window is an absolute deadline,
//! so the session returns on time whatever the server's message rate.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_tungstenite::{
    connect_async,
    tungstenite::Message,
    MaybeTlsStream, WebSocketStream,
};

/// Upper bound on the close handshake after the window ends
const CLOSE_GRACE: Duration = Duration::from_millis(250);

/// Source of opaque inbound messages
#[async_trait]
pub trait MessageStream: Send {
    /// Wait for the next inbound message.
    ///
    /// `None` means the peer closed the connection. Message content is
    /// never inspected; only its arrival matters.
    async fn next_message(&mut self) -> Option<Result<()>>;

    /// Close the connection. Errors while closing are ignored.
    async fn close(&mut self);
}

/// How a session's receive loop ended
#[derive(Debug)]
pub enum SessionEnd {
    /// The window elapsed; the normal outcome
    WindowElapsed,
    /// The server closed the connection before the deadline
    ClosedByPeer,
    /// The transport failed before the deadline
    Failed(AppError),
}

impl SessionEnd {
    pub fn is_window_elapsed(&self) -> bool {
        matches!(self, Self::WindowElapsed)
    }

    /// Reason string for a premature end
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::WindowElapsed => None,
            Self::ClosedByPeer => Some("connection closed by server".to_string()),
            Self::Failed(e) => Some(e.to_string()),
        }
    }
}

/// Raw outcome of one receive loop
#[derive(Debug)]
pub struct SessionMeasurement {
    /// Inter-arrival latencies, seconds, in arrival order
    pub latencies: Vec<f64>,
    pub end: SessionEnd,
    /// Time from measurement start to loop exit
    pub elapsed: Duration,
}

/// Bounded-duration receive loop over one connection
#[derive(Debug, Clone, Copy)]
pub struct Session {
    window: Duration,
}

impl Session {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Measure `stream` until the window elapses or the connection ends,
    /// then close it.
    pub async fn run<S>(&self, stream: &mut S) -> SessionMeasurement
    where
        S: MessageStream + ?Sized,
    {
        let start = Instant::now();
        let deadline = start + self.window;
        let mut last_time = start;
        let mut latencies = Vec::new();

        let end = loop {
            if Instant::now() >= deadline {
                break SessionEnd::WindowElapsed;
            }

            match timeout_at(deadline, stream.next_message()).await {
                Ok(Some(Ok(()))) => {
                    let now = Instant::now();
                    latencies.push(now.duration_since(last_time).as_secs_f64());
                    last_time = now;
                }
                Ok(Some(Err(e))) => break SessionEnd::Failed(e),
                Ok(None) => break SessionEnd::ClosedByPeer,
                Err(_) => break SessionEnd::WindowElapsed,
            }
        };

        let elapsed = start.elapsed();
        let _ = timeout(CLOSE_GRACE, stream.close()).await;

        SessionMeasurement { latencies, end, elapsed }
    }
}

/// WebSocket connection to the game server
pub struct WsMessageStream {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsMessageStream {
    pub fn new(inner: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MessageStream for WsMessageStream {
    async fn next_message(&mut self) -> Option<Result<()>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(_)) | Ok(Message::Binary(_)) => return Some(Ok(())),
                Ok(Message::Close(_)) => return None,
                // Ping/pong and raw frames are transport plumbing
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.inner.close(None).await;
    }
}

/// Open a WebSocket connection to `endpoint` within `connect_timeout`
pub async fn connect(endpoint: &str, connect_timeout: Duration) -> Result<WsMessageStream> {
    match timeout(connect_timeout, connect_async(endpoint)).await {
        Ok(Ok((stream, _response))) => Ok(WsMessageStream::new(stream)),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(AppError::timeout(format!(
            "connecting to {} took longer than {}s",
            endpoint,
            connect_timeout.as_secs_f64()
        ))),
    }
}
