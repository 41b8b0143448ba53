//! `chaoscope harvest` and `chaoscope mix`.

use chaoscope_core::{EntropySource, Harvester, SourceResult, mixer, source_by_name};

fn print_result(result: &SourceResult) {
    println!("\n{}", "=".repeat(60));
    println!("HARVEST RESULT — {}", result.source_id);
    println!("{}", "=".repeat(60));
    println!("quality:       {}", result.quality);
    println!("status:        {:?}", result.diagnostics.status);
    println!("samples:       {}", result.samples.len());
    println!("response time: {:.1} ms", result.diagnostics.response_time_ms);
    if let Some(err) = &result.diagnostics.error {
        println!("error:         {err}");
    }
    if !result.samples.is_empty() {
        let preview: Vec<String> = result
            .samples
            .iter()
            .take(8)
            .map(|s| format!("{s}"))
            .collect();
        println!("head:          [{}]", preview.join(", "));
    }
}

pub fn run(source: Option<String>, samples: usize, min_samples: usize, json: bool) -> i32 {
    let result = match source {
        Some(name) => match source_by_name(&name) {
            Some(src) => src.fetch(samples),
            None => {
                eprintln!("unknown source: {name} (try `chaoscope scan`)");
                return 1;
            }
        },
        None => Harvester::new(chaoscope_core::default_chain(), min_samples).harvest(samples),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    } else {
        print_result(&result);
    }
    0
}

pub fn run_mix(samples: usize, json: bool) -> i32 {
    let harvester = Harvester::default_chain();
    let cache = chaoscope_core::SourceCache::default();
    let results = harvester.harvest_all_cached(&cache, samples);
    let seed = mixer::mix(&results);

    if json {
        println!("{}", serde_json::to_string_pretty(&seed).unwrap());
        return 0;
    }

    println!("\n{}", "=".repeat(60));
    println!("CHAOS SEED");
    println!("{}", "=".repeat(60));
    println!("mixed value: {:#018x}", seed.mixed_value);
    println!("seed:        {:#018x}", seed.seed);
    println!("timestamp:   {}", seed.timestamp);
    println!("sources ({}):", seed.sources.len());
    for (r, id) in results.iter().zip(&seed.sources) {
        println!(
            "  {:<16} {:>6} samples  {:>8.1} ms  {:?}",
            id,
            r.samples.len(),
            r.diagnostics.response_time_ms,
            r.diagnostics.status
        );
    }
    0
}
