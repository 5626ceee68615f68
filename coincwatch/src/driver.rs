//! One tick of the pipeline: pull, normalize, window, estimate, capture

use crate::capture::{CaptureOutcome, CaptureSink, Record};
use crate::source::SampleSource;
use anyhow::Result;
use coinctools::cfg;
use coinctools::rate::{NormalizedSample, Normalizer};
use coinctools::stat::{self, ChannelWindows, Correlation, RollingWindow};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Mean and population deviation of one channel window
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WindowStats {
    pub mean: f64,
    pub dev: f64,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Stats {
    pub a: WindowStats,
    pub b: WindowStats,
    pub ab: WindowStats,
    pub abp: WindowStats,
    pub abbp: WindowStats,
    pub bbp: WindowStats,
}

/// Immutable results of one tick, handed to the presentation layer
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Snapshot {
    pub sample: NormalizedSample,
    pub stats: Stats,
    /// `None` while the windows cannot support the estimator
    pub correlation: Option<Correlation>,
    pub capture: CaptureOutcome,
}

/// Owns all cross-tick pipeline state. Single-threaded by design: one
/// driver per connection, ticked from one external sequence.
pub struct PipelineDriver {
    source: Box<dyn SampleSource>,
    windows: ChannelWindows,
    normalizer: Normalizer,
    capture: CaptureSink,
}

impl PipelineDriver {
    pub fn new(source: Box<dyn SampleSource>, window_capacity: usize, start: Instant) -> Self {
        PipelineDriver {
            source,
            windows: ChannelWindows::new(window_capacity),
            normalizer: Normalizer::new(start),
            capture: CaptureSink::new(),
        }
    }

    /// Runtime window resize, clamped to the supported range
    pub fn set_window_capacity(&mut self, n: usize) {
        self.windows
            .set_capacity(n.clamp(cfg::WINDOW_MIN, cfg::WINDOW_MAX));
    }

    pub fn start_capture(
        &mut self,
        path: Option<PathBuf>,
        limit: Duration,
        now: Instant,
    ) -> Result<()> {
        self.capture.start(path, limit, now)
    }

    pub fn stop_capture(&mut self) {
        self.capture.stop()
    }

    pub fn capture_active(&self) -> bool {
        self.capture.is_active()
    }

    pub fn windows(&self) -> &ChannelWindows {
        &self.windows
    }

    /// Run one tick. `Ok(None)` means no new sample arrived, or it was
    /// dropped; window state is untouched either way.
    pub fn tick(&mut self, now: Instant) -> Result<Option<Snapshot>> {
        let raw = match self.source.sample()? {
            Some(r) => r,
            None => return Ok(None),
        };
        let sample = match self.normalizer.normalize(&raw, now) {
            Ok(s) => s,
            Err(e) => {
                debug!(%e, "sample dropped");
                return Ok(None);
            }
        };

        self.windows.a.push(sample.singles[0]);
        self.windows.b.push(sample.singles[1]);
        self.windows.ab.push(sample.coinc[0]);
        self.windows.abp.push(sample.coinc[1]);
        self.windows.bbp.push(sample.coinc[2]);
        self.windows.abbp.push(sample.coinc[3]);

        let correlation = match stat::g2(&self.windows) {
            Ok(c) => Some(c),
            Err(e) => {
                debug!(%e, "correlation not yet available");
                None
            }
        };

        let record = Record {
            sample: &sample,
            correlation: correlation.as_ref(),
        };
        let capture = match self.capture.offer(now, &record) {
            Ok(CaptureOutcome::Closed) => {
                info!("capture duration reached, closing");
                CaptureOutcome::Closed
            }
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%e, "capture write failed, stopping capture");
                self.capture.stop();
                CaptureOutcome::Skipped
            }
        };

        Ok(Some(Snapshot {
            sample,
            stats: Stats {
                a: window_stats(&self.windows.a),
                b: window_stats(&self.windows.b),
                ab: window_stats(&self.windows.ab),
                abp: window_stats(&self.windows.abp),
                abbp: window_stats(&self.windows.abbp),
                bbp: window_stats(&self.windows.bbp),
            },
            correlation,
            capture,
        }))
    }
}

fn window_stats(w: &RollingWindow) -> WindowStats {
    // Windows are non-empty after a push; NaN is the display sentinel
    WindowStats {
        mean: w.mean().unwrap_or(f64::NAN),
        dev: w.stddev().unwrap_or(f64::NAN),
    }
}
