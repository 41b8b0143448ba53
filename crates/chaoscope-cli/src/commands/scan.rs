//! `chaoscope scan` — list every registered entropy source.

use chaoscope_core::{EntropySource, all_sources};

pub fn run() -> i32 {
    let sources = all_sources();
    let chain: Vec<&str> = chaoscope_core::Harvester::default_chain().source_names();

    println!("\n{}", "=".repeat(72));
    println!("REGISTERED ENTROPY SOURCES");
    println!("{}", "=".repeat(72));
    println!(
        "{:<16} {:<16} {:>8} {:>6}  {}",
        "Source", "Quality", "Timeout", "Chain", "Description"
    );
    println!("{}", "-".repeat(72));
    for source in &sources {
        let info = source.info();
        let in_chain = if chain.contains(&info.name) { "✓" } else { "" };
        println!(
            "{:<16} {:<16} {:>7.1}s {:>6}  {}",
            info.name,
            info.quality.to_string(),
            info.timeout.as_secs_f64(),
            in_chain,
            info.description
        );
    }
    println!("\n{} sources, {} in the default chain", sources.len(), chain.len());
    0
}
