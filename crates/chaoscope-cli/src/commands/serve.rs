//! `chaoscope serve` — background collector plus the HTTP query surface.

use std::sync::Arc;
use std::time::Duration;

use chaoscope_core::{Collector, CollectorConfig, Harvester, Observatory, default_chain};

pub fn run(host: &str, port: u16, interval_secs: u64) -> i32 {
    let observatory = Arc::new(Observatory::default());
    let collector = Collector::spawn(
        Arc::clone(&observatory),
        default_chain(),
        CollectorConfig {
            interval: Duration::from_secs(interval_secs.max(1)),
            samples_per_cycle: 64,
        },
    );

    println!("chaoscope server listening on http://{host}:{port}");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("tokio runtime failed to start: {e}");
            collector.stop();
            return 1;
        }
    };

    let result = runtime.block_on(chaoscope_server::run_server(
        Arc::clone(&observatory),
        Harvester::default_chain(),
        host,
        port,
    ));

    collector.stop();
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("server error: {e}");
            1
        }
    }
}
