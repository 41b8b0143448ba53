//! `chaoscope record` — harvest cycles to a JSONL session file.

use std::path::Path;
use std::time::Duration;

use chaoscope_core::{Harvester, SessionWriter, SourceCache, mixer};

pub fn run(output: &str, cycles: u64, samples: usize, interval_secs: u64) -> i32 {
    let harvester = Harvester::default_chain();
    // Half-interval TTL so each cycle refetches instead of replaying cache.
    let ttl = Duration::from_secs_f64((interval_secs.max(1) as f64) / 2.0);
    let cache = SourceCache::new(ttl);

    let names: Vec<String> = harvester
        .source_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut writer = match SessionWriter::create(Path::new(output), &names) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("cannot create session file {output}: {e}");
            return 1;
        }
    };
    println!("session {} → {output}", writer.meta().id);

    for cycle in 0..cycles {
        let results = harvester.harvest_all_cached(&cache, samples);
        for result in &results {
            if let Err(e) = writer.record_result(result) {
                eprintln!("session write failed: {e}");
                return 1;
            }
        }
        let seed = mixer::mix(&results);
        if let Err(e) = writer.record_seed(&seed) {
            eprintln!("session write failed: {e}");
            return 1;
        }
        println!(
            "cycle {}/{}: mixed {:#018x} from {} sources",
            cycle + 1,
            cycles,
            seed.mixed_value,
            results.len()
        );

        if cycle + 1 < cycles {
            std::thread::sleep(Duration::from_secs(interval_secs));
        }
    }

    match writer.finish() {
        Ok(n) => {
            println!("wrote {n} records to {output}");
            0
        }
        Err(e) => {
            eprintln!("session flush failed: {e}");
            1
        }
    }
}
