//! `chaoscope analyze` — harvest samples and print a chaos/complexity report.

use chaoscope_core::{EntropySource, Harvester, analysis, source_by_name};

pub fn run(source: Option<String>, samples: usize, json: bool) -> i32 {
    let result = match source {
        Some(name) => match source_by_name(&name) {
            Some(src) => src.fetch(samples),
            None => {
                eprintln!("unknown source: {name} (try `chaoscope scan`)");
                return 1;
            }
        },
        None => Harvester::new(chaoscope_core::default_chain(), 16).harvest(samples),
    };

    if result.samples.is_empty() {
        eprintln!(
            "{} returned no samples ({})",
            result.source_id,
            result
                .diagnostics
                .error
                .as_deref()
                .unwrap_or("no error recorded")
        );
        return 1;
    }

    let series: Vec<f64> = result.samples.iter().map(|&s| (s & 0xFF) as f64).collect();
    let report = analysis::analyze(&series);

    if json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
        return 0;
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "ANALYSIS — {} ({} samples)",
        result.source_id, report.sample_count
    );
    println!("{}", "=".repeat(60));

    match report.entropy {
        Some(h) => println!(
            "shannon entropy:   {:.4} nats ({:.4} bits)",
            h,
            h / std::f64::consts::LN_2
        ),
        None => println!("shannon entropy:   insufficient data"),
    }
    match report.lyapunov_exponent {
        Some(l) => println!("lyapunov estimate: {l:+.4}  (directional heuristic)"),
        None => println!("lyapunov estimate: insufficient data"),
    }
    match report.fractal_dimension {
        Some(d) => println!("fractal dimension: {d:.4}"),
        None => println!("fractal dimension: insufficient data"),
    }
    match report.lz_complexity {
        Some(c) => println!("lz complexity:     {c}"),
        None => println!("lz complexity:     insufficient data"),
    }
    match report.compression_ratio {
        Some(r) => println!("compression ratio: {r:.4}"),
        None => println!("compression ratio: insufficient data"),
    }

    if report.autocorrelations.is_empty() {
        println!("autocorrelation:   window too small for the configured lags");
    } else {
        println!("autocorrelation:");
        for lc in &report.autocorrelations {
            println!("  lag {:>3}: {:+.4}", lc.lag, lc.correlation);
        }
    }
    0
}
