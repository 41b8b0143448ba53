//! Remote HTTP(S) entropy providers.
//!
//! Each adapter owns its wire format: plain-text integer lists, JSON sample
//! arrays, hex-encoded beacon pulses, or a JSON spot price. Parsing happens
//! entirely inside the adapter; no raw provider response ever crosses this
//! boundary. Every adapter carries a hard request timeout and converts any
//! transport or parse failure into an error envelope.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::source::{
    EntropySource, FetchTimer, SAMPLE_MAX, SourceInfo, SourceQuality, SourceResult,
};

/// Shared hard timeout for remote providers.
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a blocking client with the adapter timeout baked in.
///
/// `None` only when the TLS backend fails to initialize, which the adapter
/// reports as a fetch error rather than a construction panic.
fn build_client() -> Option<Client> {
    Client::builder().timeout(HTTP_TIMEOUT).build().ok()
}

// ---------------------------------------------------------------------------
// random.org — plain-text newline-delimited integers
// ---------------------------------------------------------------------------

static RANDOM_ORG_INFO: SourceInfo = SourceInfo {
    name: "random_org",
    description: "Atmospheric-noise integers from random.org (plain-text API)",
    quality: SourceQuality::TrueRandom,
    timeout: HTTP_TIMEOUT,
};

/// True-random provider speaking the random.org plain-text integer API.
pub struct RandomOrgSource {
    info: SourceInfo,
    client: Option<Client>,
    base_url: String,
}

impl RandomOrgSource {
    pub fn new() -> Self {
        Self::with_base_url("https://www.random.org")
    }

    /// Point the adapter at a different host (tests use a local stub).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            info: RANDOM_ORG_INFO.clone(),
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for RandomOrgSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse newline-delimited decimal integers, discarding anything out of range.
fn parse_plain_integers(body: &str) -> Vec<u64> {
    body.lines()
        .filter_map(|line| line.trim().parse::<u64>().ok())
        .filter(|&v| v <= SAMPLE_MAX)
        .collect()
}

impl EntropySource for RandomOrgSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn fetch(&self, n_samples: usize) -> SourceResult {
        let timer = FetchTimer::start();
        let Some(client) = &self.client else {
            return SourceResult::error(
                self.name(),
                self.info.quality,
                timer.elapsed(),
                "HTTP client unavailable",
            );
        };

        let url = format!(
            "{}/integers/?num={}&min=0&max={}&col=1&base=10&format=plain&rnd=new",
            self.base_url, n_samples, SAMPLE_MAX
        );

        let body = match client.get(&url).send().and_then(|r| r.error_for_status()) {
            Ok(resp) => match resp.text() {
                Ok(t) => t,
                Err(e) => {
                    return SourceResult::error(
                        self.name(),
                        self.info.quality,
                        timer.elapsed(),
                        format!("body read failed: {e}"),
                    );
                }
            },
            Err(e) => {
                return SourceResult::error(
                    self.name(),
                    self.info.quality,
                    timer.elapsed(),
                    format!("request failed: {e}"),
                );
            }
        };

        let samples = parse_plain_integers(&body);
        if samples.is_empty() {
            return SourceResult::error(
                self.name(),
                self.info.quality,
                timer.elapsed(),
                "response contained no parseable integers",
            );
        }
        SourceResult::success(self.name(), samples, self.info.quality, timer.elapsed())
    }
}

// ---------------------------------------------------------------------------
// ANU QRNG — JSON sample array
// ---------------------------------------------------------------------------

static ANU_QRNG_INFO: SourceInfo = SourceInfo {
    name: "anu_qrng",
    description: "Vacuum-fluctuation samples from the ANU QRNG JSON API",
    quality: SourceQuality::TrueRandom,
    timeout: HTTP_TIMEOUT,
};

#[derive(Deserialize)]
struct AnuResponse {
    success: bool,
    #[serde(default)]
    data: Vec<u64>,
}

/// True-random provider speaking the ANU quantum RNG JSON API.
pub struct AnuQrngSource {
    info: SourceInfo,
    client: Option<Client>,
    base_url: String,
}

impl AnuQrngSource {
    pub fn new() -> Self {
        Self::with_base_url("https://qrng.anu.edu.au")
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            info: ANU_QRNG_INFO.clone(),
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for AnuQrngSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for AnuQrngSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn fetch(&self, n_samples: usize) -> SourceResult {
        let timer = FetchTimer::start();
        let Some(client) = &self.client else {
            return SourceResult::error(
                self.name(),
                self.info.quality,
                timer.elapsed(),
                "HTTP client unavailable",
            );
        };

        let url = format!(
            "{}/API/jsonI.php?length={}&type=uint16",
            self.base_url, n_samples
        );

        let parsed: Result<AnuResponse, String> = client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("request failed: {e}"))
            .and_then(|r| r.json::<AnuResponse>().map_err(|e| format!("bad JSON: {e}")));

        match parsed {
            Ok(resp) if resp.success && !resp.data.is_empty() => {
                let samples = resp
                    .data
                    .into_iter()
                    .map(|v| v & SAMPLE_MAX)
                    .collect();
                SourceResult::success(self.name(), samples, self.info.quality, timer.elapsed())
            }
            Ok(_) => SourceResult::error(
                self.name(),
                self.info.quality,
                timer.elapsed(),
                "provider reported success=false or empty data",
            ),
            Err(msg) => {
                SourceResult::error(self.name(), self.info.quality, timer.elapsed(), msg)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// NIST randomness beacon — JSON pulse with hex output value
// ---------------------------------------------------------------------------

static NIST_BEACON_INFO: SourceInfo = SourceInfo {
    name: "nist_beacon",
    description: "Latest 512-bit pulse from the NIST randomness beacon",
    quality: SourceQuality::Cryptographic,
    timeout: HTTP_TIMEOUT,
};

#[derive(Deserialize)]
struct BeaconResponse {
    pulse: BeaconPulse,
}

#[derive(Deserialize)]
struct BeaconPulse {
    #[serde(rename = "outputValue")]
    output_value: String,
}

/// Decode a hex string into 24-bit samples (3 bytes each).
fn hex_to_samples(hex: &str) -> Vec<u64> {
    let bytes: Vec<u8> = hex
        .as_bytes()
        .chunks_exact(2)
        .filter_map(|pair| {
            let s = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(s, 16).ok()
        })
        .collect();
    bytes
        .chunks_exact(3)
        .map(|c| u64::from(c[0]) | u64::from(c[1]) << 8 | u64::from(c[2]) << 16)
        .collect()
}

/// Cryptographic provider reading the NIST beacon's latest pulse.
///
/// A pulse is 64 bytes, so one fetch yields at most 21 samples regardless of
/// the request size; callers relying on larger counts will fall through to
/// the next chain entry.
pub struct NistBeaconSource {
    info: SourceInfo,
    client: Option<Client>,
    base_url: String,
}

impl NistBeaconSource {
    pub fn new() -> Self {
        Self::with_base_url("https://beacon.nist.gov")
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            info: NIST_BEACON_INFO.clone(),
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for NistBeaconSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for NistBeaconSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn fetch(&self, _n_samples: usize) -> SourceResult {
        let timer = FetchTimer::start();
        let Some(client) = &self.client else {
            return SourceResult::error(
                self.name(),
                self.info.quality,
                timer.elapsed(),
                "HTTP client unavailable",
            );
        };

        let url = format!("{}/beacon/2.0/pulse/last", self.base_url);
        let parsed: Result<BeaconResponse, String> = client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("request failed: {e}"))
            .and_then(|r| {
                r.json::<BeaconResponse>()
                    .map_err(|e| format!("bad JSON: {e}"))
            });

        match parsed {
            Ok(resp) => {
                let samples = hex_to_samples(&resp.pulse.output_value);
                if samples.is_empty() {
                    SourceResult::error(
                        self.name(),
                        self.info.quality,
                        timer.elapsed(),
                        "pulse output value was not valid hex",
                    )
                } else {
                    SourceResult::success(
                        self.name(),
                        samples,
                        self.info.quality,
                        timer.elapsed(),
                    )
                }
            }
            Err(msg) => {
                SourceResult::error(self.name(), self.info.quality, timer.elapsed(), msg)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Spot price — JSON float, quantized and latency-entangled
// ---------------------------------------------------------------------------

static SPOT_PRICE_INFO: SourceInfo = SourceInfo {
    name: "spot_price",
    description: "Sub-unit ticks of a crypto spot price, entangled with request latency",
    quality: SourceQuality::Simulated,
    timeout: HTTP_TIMEOUT,
};

#[derive(Deserialize)]
struct SpotResponse {
    data: SpotData,
}

#[derive(Deserialize)]
struct SpotData {
    amount: String,
}

/// Quantize a price into 24-bit samples mixed with the fetch latency.
///
/// The price contributes its micro-unit digits; the latency contributes its
/// low bytes. Neither is random enough to stand alone. This source exists
/// to decorrelate the chain, not to anchor it.
fn price_samples(price: f64, latency_nanos: u64) -> Vec<u64> {
    let micro = (price * 1e6).abs() as u64;
    let tick = micro & SAMPLE_MAX;
    let lat = latency_nanos & SAMPLE_MAX;
    vec![tick, lat, (tick ^ lat.rotate_left(8)) & SAMPLE_MAX]
}

/// Market-noise provider reading a spot price endpoint.
pub struct SpotPriceSource {
    info: SourceInfo,
    client: Option<Client>,
    base_url: String,
    pair: &'static str,
}

impl SpotPriceSource {
    pub fn new() -> Self {
        Self::with_base_url("https://api.coinbase.com")
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            info: SPOT_PRICE_INFO.clone(),
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            pair: "BTC-USD",
        }
    }
}

impl Default for SpotPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for SpotPriceSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn fetch(&self, _n_samples: usize) -> SourceResult {
        let timer = FetchTimer::start();
        let Some(client) = &self.client else {
            return SourceResult::error(
                self.name(),
                self.info.quality,
                timer.elapsed(),
                "HTTP client unavailable",
            );
        };

        let url = format!("{}/v2/prices/{}/spot", self.base_url, self.pair);
        let parsed: Result<SpotResponse, String> = client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("request failed: {e}"))
            .and_then(|r| {
                r.json::<SpotResponse>()
                    .map_err(|e| format!("bad JSON: {e}"))
            });

        let latency_nanos = timer.elapsed().as_nanos() as u64;
        match parsed {
            Ok(resp) => match resp.data.amount.parse::<f64>() {
                Ok(price) if price.is_finite() => {
                    let samples = price_samples(price, latency_nanos);
                    SourceResult::success(
                        self.name(),
                        samples,
                        self.info.quality,
                        timer.elapsed(),
                    )
                }
                _ => SourceResult::error(
                    self.name(),
                    self.info.quality,
                    timer.elapsed(),
                    format!("unparseable price: {:?}", resp.data.amount),
                ),
            },
            Err(msg) => {
                SourceResult::error(self.name(), self.info.quality, timer.elapsed(), msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_integer_parsing_skips_garbage() {
        let body = "123\n456\n\nnot-a-number\n16777216\n16777215\n";
        let samples = parse_plain_integers(body);
        // 16777216 exceeds the 24-bit sample width and is dropped.
        assert_eq!(samples, vec![123, 456, 16777215]);
    }

    #[test]
    fn hex_decoding_packs_three_bytes_per_sample() {
        let samples = hex_to_samples("0102030405ff");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], 0x01 | 0x02 << 8 | 0x03 << 16);
        assert_eq!(samples[1], 0x04 | 0x05 << 8 | 0xff << 16);
    }

    #[test]
    fn hex_decoding_tolerates_odd_tails() {
        // Trailing nibble and short tail bytes are discarded, not errors.
        assert!(hex_to_samples("0102").is_empty());
        assert_eq!(hex_to_samples("010203f").len(), 1);
    }

    #[test]
    fn invalid_hex_yields_no_samples() {
        assert!(hex_to_samples("zzzzzz").is_empty());
    }

    #[test]
    fn price_quantization_stays_in_range() {
        let samples = price_samples(64123.456789, 1_234_567);
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|&s| s <= SAMPLE_MAX));
    }

    #[test]
    fn price_quantization_is_latency_sensitive() {
        let a = price_samples(100.5, 1_000);
        let b = price_samples(100.5, 999_999);
        assert_ne!(a, b);
    }

    #[test]
    fn unreachable_host_degrades_to_error_result() {
        // Reserved TEST-NET address; connection fails fast without real traffic.
        let src = RandomOrgSource::with_base_url("http://192.0.2.1:9");
        let r = src.fetch(8);
        assert_eq!(r.diagnostics.status, crate::source::FetchStatus::Error);
        assert!(r.samples.is_empty());
        assert!(r.diagnostics.error.is_some());
    }
}
