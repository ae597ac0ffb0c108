//! Traffic simulator.
//!
//! Generates bursts of `packet` events along the built-in connection
//! list and POSTs them to a running server, mirroring the load shape the
//! original demo script produced: high-density batches on a fixed
//! interval, random direction per connection, 1-3s durations.

use pulsemap_core::{EventKind, MapEvent, DEFAULT_CONNECTIONS, DEFAULT_COLOR};
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct TrafficConfig {
    /// Events per burst
    pub batch_size: usize,
    /// Delay between bursts
    pub interval: Duration,
    /// Number of bursts to send (`0` = run until interrupted)
    pub batches: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            batch_size: 30,
            interval: Duration::from_millis(200),
            batches: 400,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IngestReply {
    queued: usize,
    total: usize,
}

/// Generates packet events over the default connection graph
pub struct TrafficGenerator {
    counter: u64,
}

impl TrafficGenerator {
    /// Create a generator with a fresh id counter
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    /// One packet event along a random connection, random direction
    pub fn make_packet(&mut self) -> MapEvent {
        let mut rng = rand::thread_rng();
        let (a, b) = DEFAULT_CONNECTIONS[rng.gen_range(0..DEFAULT_CONNECTIONS.len())];
        let (from, to) = if rng.gen_bool(0.5) { (b, a) } else { (a, b) };

        let mut event = MapEvent::new(format!("sim-pkt-{}", self.counter), from, EventKind::Packet);
        self.counter += 1;
        event.target = Some(to.to_string());
        event.color = Some(DEFAULT_COLOR.to_string());
        event.duration = Some(1.0 + rng.gen::<f64>() * 2.0);
        event
    }

    /// A burst of packet events
    pub fn make_batch(&mut self, size: usize) -> Vec<MapEvent> {
        (0..size).map(|_| self.make_packet()).collect()
    }

    /// Total events generated so far
    pub fn generated(&self) -> u64 {
        self.counter
    }
}

impl Default for TrafficGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// POST bursts to `{target}/api/events` until the batch budget runs out
pub async fn run_simulation(target: &str, config: TrafficConfig) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/api/events", target.trim_end_matches('/'));
    let mut generator = TrafficGenerator::new();

    tracing::info!(
        batches = config.batches,
        batch_size = config.batch_size,
        interval_ms = config.interval.as_millis() as u64,
        "starting traffic simulation against {}", url
    );

    let mut sent = 0u64;
    loop {
        if config.batches > 0 && sent >= config.batches {
            break;
        }

        let batch = generator.make_batch(config.batch_size);
        match client.post(&url).json(&batch).send().await {
            Ok(response) if response.status().is_success() => {
                let reply: IngestReply = response.json().await?;
                tracing::info!(
                    batch = sent + 1,
                    queued = reply.queued,
                    total = reply.total,
                    "batch sent"
                );
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(batch = sent + 1, %status, body, "batch rejected");
            }
            Err(err) => {
                tracing::warn!(batch = sent + 1, error = %err, "batch failed");
            }
        }

        sent += 1;
        tokio::time::sleep(config.interval).await;
    }

    tracing::info!(events = generator.generated(), "simulation complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsemap_core::{validate_batch, CityRegistry};

    #[test]
    fn test_packets_follow_connections() {
        let registry = CityRegistry::with_defaults();
        let mut generator = TrafficGenerator::new();

        for _ in 0..50 {
            let event = generator.make_packet();
            assert_eq!(event.kind, EventKind::Packet);
            assert!(registry.contains(&event.city));
            assert!(registry.contains(event.target.as_deref().unwrap()));
            let duration = event.duration.unwrap();
            assert!((1.0..=3.0).contains(&duration));
        }
    }

    #[test]
    fn test_batch_size_and_unique_ids() {
        let mut generator = TrafficGenerator::new();
        let batch = generator.make_batch(30);
        assert_eq!(batch.len(), 30);
        assert_eq!(generator.generated(), 30);

        let mut ids: Vec<_> = batch.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 30);
    }

    #[test]
    fn test_generated_batches_pass_validation() {
        let mut generator = TrafficGenerator::new();
        let batch = generator.make_batch(10);
        assert!(validate_batch(&batch).is_ok());
    }
}
