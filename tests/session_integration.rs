//! Sessions and population runs against a local WebSocket server

mod common;

use common::{spawn_server, unused_port, ServerBehavior};
use match_load_tester::{
    error::AppError,
    executor::PopulationRunner,
    logging::SessionLogger,
    models::Config,
    plan::{ClientSpawnPlan, MatchId},
    session::{self, SessionEnd},
    Session, SessionStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

fn quiet_config(base: &str, games: u32, window_seconds: f64) -> Config {
    Config {
        endpoint_base: base.to_string(),
        games,
        window_seconds,
        connect_timeout_seconds: 5,
        seed: Some(1234),
        enable_color: false,
        quiet: true,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_session_samples_match_push_rate() {
    let server = spawn_server(ServerBehavior::Push { interval: Duration::from_millis(50) }).await;
    let endpoint = format!("{}/play?id=1", server.base);

    let mut stream = session::connect(&endpoint, Duration::from_secs(5)).await.unwrap();
    let measurement = Session::new(Duration::from_secs(1)).run(&mut stream).await;

    assert!(measurement.end.is_window_elapsed());
    // ~20 updates in one second; allow for scheduler jitter
    let samples = measurement.latencies.len();
    assert!((15..=21).contains(&samples), "got {} samples", samples);

    let mean = measurement.latencies.iter().sum::<f64>() / samples as f64;
    assert!((mean - 0.05).abs() < 0.02, "mean latency {}s", mean);
}

#[tokio::test]
async fn test_silent_server_yields_no_samples() {
    let server = spawn_server(ServerBehavior::Silent).await;
    let endpoint = format!("{}/play?id=2", server.base);

    let mut stream = session::connect(&endpoint, Duration::from_secs(5)).await.unwrap();
    let started = Instant::now();
    let measurement = Session::new(Duration::from_millis(300)).run(&mut stream).await;

    assert!(measurement.end.is_window_elapsed());
    assert!(measurement.latencies.is_empty());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_server_close_ends_session_early() {
    let server = spawn_server(ServerBehavior::CloseAfter {
        interval: Duration::from_millis(20),
        messages: 3,
    })
    .await;
    let endpoint = format!("{}/play?id=3", server.base);

    let mut stream = session::connect(&endpoint, Duration::from_secs(5)).await.unwrap();
    let started = Instant::now();
    let measurement = Session::new(Duration::from_secs(10)).run(&mut stream).await;

    assert!(matches!(measurement.end, SessionEnd::ClosedByPeer));
    assert_eq!(measurement.latencies.len(), 3);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_population_pairs_clients_on_match_endpoints() {
    let server = spawn_server(ServerBehavior::Push { interval: Duration::from_millis(100) }).await;
    let config = quiet_config(&server.base, 6, 1.0);
    let plan = ClientSpawnPlan::from_seed(config.games, config.seed);

    let runner = PopulationRunner::websocket(&config, Arc::new(SessionLogger::new(&config)));
    let outcome = runner.run(&plan).await.unwrap();

    assert_eq!(outcome.results.len(), 6);
    assert!(outcome.results.iter().all(|r| r.is_completed()));
    // Sessions overlap, so the run takes about one window, not six
    assert!(outcome.elapsed < Duration::from_secs(3), "run took {:?}", outcome.elapsed);

    for (index, result) in outcome.results.iter().enumerate() {
        assert_eq!(result.client_index, index);
        assert_eq!(result.match_id, plan.ids()[index]);
        assert!(result.sample_count() >= 5, "client {} got {}", index, result.sample_count());
    }

    // Every match id was requested by exactly two clients
    let mut per_match: HashMap<String, usize> = HashMap::new();
    for path in server.paths() {
        assert!(path.starts_with("/play?id="), "unexpected path {}", path);
        *per_match.entry(path).or_insert(0) += 1;
    }
    assert_eq!(per_match.values().sum::<usize>(), 6);
    assert!(per_match.values().all(|&count| count % 2 == 0));
}

#[tokio::test]
async fn test_population_against_closed_port_fails_every_session() {
    let base = format!("ws://127.0.0.1:{}", unused_port());
    let config = quiet_config(&base, 4, 0.5);
    let plan = ClientSpawnPlan::from_ids(vec![
        MatchId::new(7),
        MatchId::new(8),
        MatchId::new(7),
        MatchId::new(8),
    ]);

    let runner = PopulationRunner::websocket(&config, Arc::new(SessionLogger::new(&config)));
    let outcome = runner.run(&plan).await.unwrap();

    assert_eq!(outcome.results.len(), 4);
    for result in &outcome.results {
        assert!(matches!(result.status, SessionStatus::Failed { .. }));
        assert_eq!(result.sample_count(), 0);
    }
    assert_eq!(outcome.results[1].endpoint, format!("{}/play?id=8", base));
}

#[tokio::test]
async fn test_stalled_handshake_hits_connect_timeout() {
    // Accepts TCP connections but never answers the WebSocket upgrade
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let endpoint = format!("ws://{}/play?id=4", addr);
    let started = Instant::now();
    let result = session::connect(&endpoint, Duration::from_secs(1)).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(AppError::Timeout(_))));
    assert!(elapsed >= Duration::from_millis(950), "gave up after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
}
