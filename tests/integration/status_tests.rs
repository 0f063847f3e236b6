//! Status endpoint over a real loopback socket.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pimon::adapters::status::{DRAIN_LIMIT, StatusServer};
use pimon::app::monitor::Monitor;

use crate::mock_hw::at;

fn get(server: &StatusServer, target: &str) -> String {
    let mut stream = TcpStream::connect(server.local_addr()).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    write!(
        stream,
        "GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
    )
    .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

fn body(response: &str) -> &str {
    response.split("\r\n\r\n").nth(1).unwrap()
}

#[test]
fn serves_latest_and_belief() {
    let monitor = Arc::new(Monitor::new(None, 0.1, true).unwrap());
    let server = StatusServer::spawn("127.0.0.1:0".parse().unwrap(), monitor.clone()).unwrap();

    let empty = get(&server, "/latest");
    assert!(empty.starts_with("HTTP/1.1 500"));
    assert_eq!(body(&empty), "no measurement data\n");

    monitor.update(at(0, 20.0, 50.0)).unwrap();
    monitor.update(at(2, 30.0, 60.0)).unwrap();

    let latest = get(&server, "/latest?type=csv");
    assert!(latest.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(latest.to_ascii_lowercase().contains("content-type: text/csv\r\n"));
    assert!(body(&latest).ends_with("1970-01-01 00:00:02,30.0,60.0\n"));

    let belief = get(&server, "/belief");
    let v: serde_json::Value = serde_json::from_str(body(&belief)).unwrap();
    assert_eq!(v["humidity"], 51.0);
    assert_eq!(v["temperature"], 21.0);

    let unknown = get(&server, "/belief?type=yaml");
    assert!(unknown.starts_with("HTTP/1.1 400"));

    let series = get(&server, "/series");
    assert!(series.starts_with("HTTP/1.1 404"));

    server.stop();
}

#[test]
fn silent_client_holds_up_neither_queries_nor_stop() {
    let monitor = Arc::new(Monitor::new(None, 0.1, true).unwrap());
    monitor.update(at(0, 20.0, 50.0)).unwrap();
    let server = StatusServer::spawn("127.0.0.1:0".parse().unwrap(), monitor).unwrap();

    // Connected, never sends a byte.
    let silent = TcpStream::connect(server.local_addr()).unwrap();

    let started = Instant::now();
    let reply = get(&server, "/latest?type=string");
    assert!(reply.starts_with("HTTP/1.1 200"));
    assert!(started.elapsed() < Duration::from_secs(1));

    let started = Instant::now();
    server.stop();
    assert!(started.elapsed() < DRAIN_LIMIT + Duration::from_secs(1));
    drop(silent);
}

#[test]
fn stop_releases_the_port() {
    let monitor = Arc::new(Monitor::new(None, 0.1, true).unwrap());
    let server = StatusServer::spawn("127.0.0.1:0".parse().unwrap(), monitor.clone()).unwrap();
    let addr = server.local_addr();
    server.stop();

    let again = StatusServer::spawn(addr, monitor).unwrap();
    assert_eq!(again.local_addr(), addr);
    again.stop();
}
