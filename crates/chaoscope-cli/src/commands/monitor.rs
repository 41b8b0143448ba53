//! `chaoscope monitor` — background collection with periodic reports.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chaoscope_core::{Collector, CollectorConfig, Observatory, default_chain, metric};

pub fn run(interval_secs: u64, duration_secs: Option<u64>) -> i32 {
    let interval = Duration::from_secs(interval_secs.max(1));
    let observatory = Arc::new(Observatory::default());
    let sources = default_chain();
    let source_count = sources.len();
    let collector = Collector::spawn(
        Arc::clone(&observatory),
        sources,
        CollectorConfig {
            interval,
            samples_per_cycle: 64,
        },
    );

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::Relaxed)) {
            log::warn!("Ctrl-C handler unavailable: {e}");
        }
    }

    println!(
        "monitoring {source_count} sources every {}s — Ctrl-C to stop",
        interval.as_secs()
    );

    let started = Instant::now();
    'outer: loop {
        // Sleep in one-second slices so Ctrl-C and --duration stay responsive.
        for _ in 0..interval.as_secs() {
            if !running.load(Ordering::Relaxed) {
                break 'outer;
            }
            if let Some(limit) = duration_secs {
                if started.elapsed() >= Duration::from_secs(limit) {
                    break 'outer;
                }
            }
            std::thread::sleep(Duration::from_secs(1));
        }
        print_status(&observatory);
    }

    println!("\nshutting down (waiting for in-flight fetches)…");
    collector.stop();
    print_status(&observatory);
    0
}

fn print_status(observatory: &Observatory) {
    println!("\n{}", "-".repeat(60));
    match observatory.latest_seed() {
        Some(seed) => println!(
            "seed {:#018x} from {} sources at {}",
            seed.mixed_value,
            seed.sources.len(),
            seed.timestamp
        ),
        None => println!("no seed mixed yet"),
    }

    let stream_len = observatory.series_len(metric::ENTROPY_STREAM);
    println!("entropy stream: {stream_len} observations");
    if let Some(report) = observatory.report(metric::ENTROPY_STREAM) {
        if let Some(h) = report.entropy {
            println!("  entropy:   {h:.4} nats");
        }
        if let Some(l) = report.lyapunov_exponent {
            println!("  lyapunov:  {l:+.4}");
        }
        if let Some(c) = report.lz_complexity {
            println!("  lz:        {c}");
        }
    }
}
