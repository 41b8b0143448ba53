//! DiskLatencySource — storage read latency jitter.
//!
//! Writes a small scratch file, then performs random-offset 4KB reads and
//! harvests the low bytes of the per-read latency. Jitter comes from flash
//! translation layer remapping, page cache state, controller queue
//! arbitration, and filesystem journaling.

use std::io::{Read, Seek, SeekFrom, Write};
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::source::{EntropySource, FetchTimer, SourceInfo, SourceQuality, SourceResult};

/// Size of the scratch file the source reads from.
const SCRATCH_FILE_SIZE: usize = 64 * 1024;

/// Size of each random read.
const READ_BLOCK_SIZE: usize = 4 * 1024;

static DISK_LATENCY_INFO: SourceInfo = SourceInfo {
    name: "disk_latency",
    description: "LSBs of per-read latency for random 4KB reads of a scratch file",
    quality: SourceQuality::HardwareTiming,
    timeout: Duration::from_secs(3),
};

/// Local timing source harvesting storage read latency jitter.
pub struct DiskLatencySource;

impl EntropySource for DiskLatencySource {
    fn info(&self) -> &SourceInfo {
        &DISK_LATENCY_INFO
    }

    fn fetch(&self, n_samples: usize) -> SourceResult {
        let timer = FetchTimer::start();

        let mut scratch = match NamedTempFile::new() {
            Ok(f) => f,
            Err(e) => {
                return SourceResult::error(
                    self.name(),
                    self.info().quality,
                    timer.elapsed(),
                    format!("scratch file creation failed: {e}"),
                );
            }
        };

        // Fill with LCG output so reads are not all-zero pages.
        let mut fill = vec![0u8; SCRATCH_FILE_SIZE];
        let mut lcg: u64 = 0x9E37_79B9_7F4A_7C15;
        for chunk in fill.chunks_mut(8) {
            lcg = lcg.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            for (i, b) in chunk.iter_mut().enumerate() {
                *b = lcg.to_le_bytes()[i];
            }
        }
        if let Err(e) = scratch.write_all(&fill).and_then(|_| scratch.flush()) {
            return SourceResult::error(
                self.name(),
                self.info().quality,
                timer.elapsed(),
                format!("scratch file write failed: {e}"),
            );
        }

        let mut samples = Vec::with_capacity(n_samples);
        let mut block = vec![0u8; READ_BLOCK_SIZE];
        let mut offset_state: u64 = 0xC0FF_EE11;

        while samples.len() < n_samples {
            if timer.elapsed() > self.info().timeout {
                break;
            }
            // Pseudo-random offset; the entropy is the latency, not the offset.
            offset_state = offset_state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let max_offset = (SCRATCH_FILE_SIZE - READ_BLOCK_SIZE) as u64;
            let offset = offset_state % max_offset;

            let read_timer = FetchTimer::start();
            let read = scratch
                .seek(SeekFrom::Start(offset))
                .and_then(|_| scratch.read_exact(&mut block));
            let nanos = read_timer.elapsed().as_nanos() as u64;

            match read {
                Ok(()) => {
                    let s = (nanos & 0xFF)
                        | ((nanos >> 8) & 0xFF) << 8
                        | ((nanos & 0xFF) ^ ((nanos >> 8) & 0xFF)) << 16;
                    samples.push(s);
                }
                Err(e) => {
                    return SourceResult::error(
                        self.name(),
                        self.info().quality,
                        timer.elapsed(),
                        format!("scratch read failed: {e}"),
                    );
                }
            }
        }

        SourceResult::success(self.name(), samples, self.info().quality, timer.elapsed())
    }
}
