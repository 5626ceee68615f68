//! Time-bounded capture of normalized samples and derived values
//!
//! One tab-separated line per tick: `a b bp c ab abp bbp abbp err` in
//! counts per second, followed by `g2 g2_dev g2_2d g2_2d_dev sigma` when
//! the correlation was available that tick. Append-mode, no header row.

use anyhow::{Context, Result};
use chrono::Local;
use coinctools::rate::NormalizedSample;
use coinctools::stat::Correlation;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What one `offer` did with its record
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum CaptureOutcome {
    Written,
    /// No capture is active
    Skipped,
    /// The duration limit elapsed; the session closed, nothing written
    Closed,
}

/// One tick's worth of data offered to the sink
pub struct Record<'a> {
    pub sample: &'a NormalizedSample,
    pub correlation: Option<&'a Correlation>,
}

struct Session {
    started: Instant,
    limit: Duration,
    wtr: csv::Writer<File>,
}

/// Append-only, single-writer capture log with a duration bound
#[derive(Default)]
pub struct CaptureSink {
    session: Option<Session>,
}

impl CaptureSink {
    pub fn new() -> Self {
        CaptureSink { session: None }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a session, replacing any running one. When `path` is `None` a
    /// timestamped file is created in the working directory.
    pub fn start(&mut self, path: Option<PathBuf>, limit: Duration, now: Instant) -> Result<()> {
        let path = path.unwrap_or_else(|| {
            let mut p = PathBuf::from(Local::now().format("%F-%H-%M-%S").to_string());
            p.set_extension("tsv");
            p
        });
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("opening capture file {}", path.display()))?;
        let wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(file);
        self.session = Some(Session {
            started: now,
            limit,
            wtr,
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        self.session = None;
    }

    /// Offer one record; at most one call per tick. An offer at or past
    /// the limit closes the session without writing.
    pub fn offer(&mut self, now: Instant, record: &Record) -> Result<CaptureOutcome> {
        let session = match self.session.as_mut() {
            Some(s) => s,
            None => return Ok(CaptureOutcome::Skipped),
        };
        if now.saturating_duration_since(session.started) >= session.limit {
            self.session = None;
            return Ok(CaptureOutcome::Closed);
        }

        let s = record.sample;
        let mut fields: Vec<String> = Vec::with_capacity(14);
        for v in s.singles.iter().chain(s.coinc.iter()) {
            fields.push(v.to_string());
        }
        fields.push(s.err.to_string());
        if let Some(c) = record.correlation {
            for v in [c.g2, c.g2_dev, c.g2_2d, c.g2_2d_dev, c.sigma_below_one] {
                fields.push(v.to_string());
            }
        }
        session.wtr.write_record(&fields)?;
        session.wtr.flush()?;
        Ok(CaptureOutcome::Written)
    }
}
