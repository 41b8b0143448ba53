//! `chaoscope generate` — emit a stochastic sample path.

use std::io::Write;

use chaoscope_core::processes::{PathRequest, ProcessKind};
use chaoscope_core::sources::fallback::OsCsprngSource;
use chaoscope_core::{EntropySource, mixer, sample_path};

pub struct GenerateArgs {
    pub kind: String,
    pub length: usize,
    pub seed: Option<u64>,
    pub alpha: f64,
    pub beta: f64,
    pub scale: f64,
    pub hurst: f64,
    pub dt: f64,
    pub mu: f64,
    pub sigma: f64,
    pub lambda: f64,
    pub step_size: f64,
    pub output: Option<String>,
    pub json: bool,
}

pub fn run(args: GenerateArgs) -> i32 {
    let kind: ProcessKind = match args.kind.parse() {
        Ok(k) => k,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    let mut req = PathRequest::new(kind);
    req.length = args.length;
    req.seed = args.seed;
    req.alpha = args.alpha;
    req.beta = args.beta;
    req.scale = args.scale;
    req.hurst = args.hurst;
    req.dt = args.dt;
    req.mu = args.mu;
    req.sigma = args.sigma;
    req.lambda = args.lambda;
    req.step_size = args.step_size;

    // Local entropy: one CSPRNG fetch seeds both the default seed and the
    // entropy-conditioned kernel when no collector is running.
    let local = OsCsprngSource.fetch(256);
    let entropy: Vec<f64> = local.samples.iter().map(|&s| (s & 0xFF) as f64).collect();
    let default_seed = mixer::mix(std::slice::from_ref(&local)).seed;

    let path = match sample_path(&req, default_seed, &entropy) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("generation failed: {e}");
            return 1;
        }
    };

    if let Some(file) = &args.output {
        let mut out = match std::fs::File::create(file) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("cannot create {file}: {e}");
                return 1;
            }
        };
        let mut write_csv = || -> std::io::Result<()> {
            writeln!(out, "index,value")?;
            for (i, v) in path.iter().enumerate() {
                writeln!(out, "{i},{v}")?;
            }
            Ok(())
        };
        if let Err(e) = write_csv() {
            eprintln!("write to {file} failed: {e}");
            return 1;
        }
        println!("wrote {} points to {file}", path.len());
        return 0;
    }

    if args.json {
        println!("{}", serde_json::to_string(&path).unwrap());
    } else {
        for v in &path {
            println!("{v}");
        }
    }
    0
}
