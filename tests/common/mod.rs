//! Local game server stand-in for integration tests

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::accept_hdr_async;

/// What the server does with each accepted connection
#[derive(Debug, Clone, Copy)]
pub enum ServerBehavior {
    /// Push a state update every `interval` until the client leaves
    Push { interval: Duration },
    /// Accept and never send anything
    Silent,
    /// Push `messages` updates, then close the connection
    CloseAfter { interval: Duration, messages: usize },
}

pub struct TestServer {
    /// `ws://127.0.0.1:{port}`
    pub base: String,
    paths: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Request paths (with query) seen during handshakes
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

pub async fn spawn_server(behavior: ServerBehavior) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let paths = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&paths);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                let record = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    seen.lock().unwrap().push(req.uri().to_string());
                    Ok(resp)
                };
                if let Ok(ws) = accept_hdr_async(stream, record).await {
                    serve(ws, behavior).await;
                }
            });
        }
    });

    TestServer {
        base: format!("ws://127.0.0.1:{}", addr.port()),
        paths,
    }
}

async fn serve<S>(ws: tokio_tungstenite::WebSocketStream<S>, behavior: ServerBehavior)
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut tx, mut rx) = ws.split();

    let (interval, limit) = match behavior {
        ServerBehavior::Push { interval } => (interval, None),
        ServerBehavior::CloseAfter { interval, messages } => (interval, Some(messages)),
        ServerBehavior::Silent => {
            // Drain until the client closes so the close handshake completes
            while let Some(Ok(_)) = rx.next().await {}
            return;
        }
    };

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    let mut sent = 0usize;

    loop {
        if limit == Some(sent) {
            let _ = tx.send(Message::Close(None)).await;
            return;
        }

        tokio::select! {
            _ = ticker.tick() => {
                if tx.send(Message::text("{\"state\":\"tick\"}")).await.is_err() {
                    return;
                }
                sent += 1;
            }
            incoming = rx.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => {}
            },
        }
    }
}

/// A local port nothing listens on
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
