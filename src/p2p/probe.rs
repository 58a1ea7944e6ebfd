use futures::future::join_all;
use std::net::SocketAddr;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::p2p::log::{log, Event, LogLevel, LogMessage};

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub addr: SocketAddr,
    pub outcome: Result<Duration, String>,
}

impl ProbeResult {
    pub fn is_reachable(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub async fn resolve_seed(host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port)).await?.collect();
    Ok(addrs)
}

/// Opens and immediately drops a TCP connection.
pub async fn probe_peer(addr: SocketAddr, connect_timeout: Duration) -> ProbeResult {
    let started = Instant::now();
    let outcome = match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => Ok(started.elapsed()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("no answer within {:?}", connect_timeout)),
    };
    ProbeResult { addr, outcome }
}

/// Probes every address concurrently. Results keep the input order.
pub async fn probe_peers(
    addrs: Vec<SocketAddr>,
    connect_timeout: Duration,
    log_tx: Sender<LogMessage>,
) -> Vec<ProbeResult> {
    let mut handles = Vec::new();
    for addr in addrs.iter().copied() {
        handles.push(tokio::spawn(probe_peer(addr, connect_timeout)));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (addr, joined) in addrs.into_iter().zip(join_all(handles).await) {
        let result = joined.unwrap_or_else(|e| ProbeResult {
            addr,
            outcome: Err(format!("probe task failed: {}", e)),
        });
        match &result.outcome {
            Ok(elapsed) => log(&log_tx, LogLevel::Info, Event::Reachable(addr, elapsed.as_millis())),
            Err(reason) => log(&log_tx, LogLevel::Warn, Event::FailedConnection(addr, reason.clone())),
        }
        results.push(result);
    }
    results
}

/// Resolves the seed once and returns the reachable addresses, in resolution
/// order.
pub async fn reachable_peers(
    host: &str,
    port: u16,
    connect_timeout: Duration,
    log_tx: Sender<LogMessage>,
) -> std::io::Result<Vec<SocketAddr>> {
    let addrs = resolve_seed(host, port).await?;
    log(&log_tx, LogLevel::Info, Event::Resolved(host.to_string(), addrs.len()));

    let results = probe_peers(addrs, connect_timeout, log_tx).await;
    Ok(results
        .into_iter()
        .filter(ProbeResult::is_reachable)
        .map(|r| r.addr)
        .collect())
}
