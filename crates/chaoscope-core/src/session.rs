//! Session recording for harvest research.
//!
//! Streams one JSONL file per session: a metadata header line followed by
//! one line per adapter invocation and per mixed seed. Session files are
//! offline research output; nothing reads them back at startup, and the
//! in-memory state is always rebuilt from scratch on restart.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::mixer::ChaosSeed;
use crate::source::{SourceResult, unix_millis};

/// Header line written when a session starts.
#[derive(Debug, Clone, Serialize)]
pub struct SessionMeta {
    pub id: String,
    pub started_unix_ms: u64,
    pub sources: Vec<String>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SessionLine<'a> {
    Meta(&'a SessionMeta),
    Fetch {
        timestamp: u64,
        source_id: &'a str,
        status: crate::source::FetchStatus,
        sample_count: usize,
        response_time_ms: f64,
        error: &'a Option<String>,
    },
    Seed {
        timestamp: u64,
        mixed_value: u64,
        sources: &'a [String],
    },
}

/// Append-only JSONL writer for one recording session.
pub struct SessionWriter {
    out: BufWriter<File>,
    meta: SessionMeta,
    records: u64,
}

impl SessionWriter {
    /// Create the session file and write the metadata header.
    pub fn create(path: &Path, sources: &[String]) -> io::Result<Self> {
        let meta = SessionMeta {
            id: Uuid::new_v4().to_string(),
            started_unix_ms: unix_millis(),
            sources: sources.to_vec(),
        };
        let mut out = BufWriter::new(File::create(path)?);
        write_line(&mut out, &SessionLine::Meta(&meta))?;
        Ok(Self {
            out,
            meta,
            records: 0,
        })
    }

    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    /// Record one adapter invocation.
    pub fn record_result(&mut self, result: &SourceResult) -> io::Result<()> {
        write_line(
            &mut self.out,
            &SessionLine::Fetch {
                timestamp: result.diagnostics.timestamp,
                source_id: &result.source_id,
                status: result.diagnostics.status,
                sample_count: result.diagnostics.sample_count,
                response_time_ms: result.diagnostics.response_time_ms,
                error: &result.diagnostics.error,
            },
        )?;
        self.records += 1;
        Ok(())
    }

    /// Record one produced chaos seed. The non-reproducible `seed` field is
    /// deliberately left out; only the deterministic mix is research data.
    pub fn record_seed(&mut self, seed: &ChaosSeed) -> io::Result<()> {
        write_line(
            &mut self.out,
            &SessionLine::Seed {
                timestamp: seed.timestamp,
                mixed_value: seed.mixed_value,
                sources: &seed.sources,
            },
        )?;
        self.records += 1;
        Ok(())
    }

    /// Flush and close, returning the number of records written.
    pub fn finish(mut self) -> io::Result<u64> {
        self.out.flush()?;
        Ok(self.records)
    }
}

fn write_line(out: &mut BufWriter<File>, line: &SessionLine<'_>) -> io::Result<()> {
    let json = serde_json::to_string(line).map_err(io::Error::other)?;
    writeln!(out, "{json}")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::source::SourceQuality;

    #[test]
    fn session_file_is_line_delimited_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");

        let mut writer =
            SessionWriter::create(&path, &["a".to_string(), "b".to_string()]).unwrap();
        let result = SourceResult::success(
            "a",
            vec![1, 2, 3],
            SourceQuality::Simulated,
            Duration::from_millis(4),
        );
        writer.record_result(&result).unwrap();
        writer
            .record_seed(&ChaosSeed {
                mixed_value: 77,
                seed: 5,
                sources: vec!["a".into()],
                timestamp: 1,
            })
            .unwrap();
        let records = writer.finish().unwrap();
        assert_eq!(records, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        let meta: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(meta["kind"], "meta");
        assert_eq!(meta["sources"].as_array().unwrap().len(), 2);

        let fetch: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(fetch["kind"], "fetch");
        assert_eq!(fetch["source_id"], "a");
        assert_eq!(fetch["sample_count"], 3);

        let seed: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(seed["kind"], "seed");
        assert_eq!(seed["mixed_value"], 77);
        // The jitter-derived seed never lands on disk.
        assert!(seed.get("seed").is_none());
    }

    #[test]
    fn session_ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let w1 = SessionWriter::create(&dir.path().join("a.jsonl"), &[]).unwrap();
        let w2 = SessionWriter::create(&dir.path().join("b.jsonl"), &[]).unwrap();
        assert_ne!(w1.meta().id, w2.meta().id);
    }
}
