//! Feeds against a local one-shot HTTP server.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use pricetick_core::{FeedError, PriceFeed};
use pricetick_feed::{BinanceFeed, FeedConfig, RelayFeed};

/// Serve a single canned response; returns the base URL and the request line.
fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        request_line
    });
    (base, handle)
}

fn config(base: &str) -> FeedConfig {
    FeedConfig {
        timeout: Duration::from_secs(5),
        ..FeedConfig::with_base_url(base)
    }
}

#[test]
fn binance_fetches_ticker() {
    let (base, server) = serve_once("200 OK", r#"{"symbol":"BTCUSDT","price":"61234.56000000"}"#);
    let feed = BinanceFeed::new(config(&base)).unwrap();
    let sample = feed.fetch("BTCUSDT").unwrap();
    assert!((sample.value - 61_234.56).abs() < 1e-9);
    let request = server.join().unwrap();
    assert!(request.starts_with("GET /api/v3/ticker/price?symbol=BTCUSDT "));
}

#[test]
fn binance_maps_status() {
    let (base, server) = serve_once("429 Too Many Requests", r#"{"code":-1003}"#);
    let feed = BinanceFeed::new(config(&base)).unwrap();
    assert_eq!(feed.fetch("BTCUSDT"), Err(FeedError::Status(429)));
    server.join().unwrap();
}

#[test]
fn binance_maps_transport() {
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let feed = BinanceFeed::new(config(&format!("http://127.0.0.1:{port}"))).unwrap();
    assert!(matches!(feed.fetch("BTCUSDT"), Err(FeedError::Transport(_))));
}

#[test]
fn relay_fetches_quote() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"symbol":"BTCUSDT","price":60000.01,"timestamp":"2024-05-01T12:00:00Z","cached":true,"stale":true}"#,
    );
    let feed = RelayFeed::new(&config(&base)).unwrap();
    let sample = feed.fetch("BTCUSDT").unwrap();
    assert!((sample.value - 60_000.01).abs() < f64::EPSILON);
    assert_eq!(
        sample.observed_at,
        "2024-05-01T12:00:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap()
    );
    let request = server.join().unwrap();
    assert!(request.starts_with("GET /api/price "));
}

#[test]
fn relay_error_is_status() {
    let (base, server) = serve_once("500 Internal Server Error", r#"{"error":"unavailable"}"#);
    let feed = RelayFeed::new(&config(&base)).unwrap();
    assert_eq!(feed.fetch("BTCUSDT"), Err(FeedError::Status(500)));
    server.join().unwrap();
}
