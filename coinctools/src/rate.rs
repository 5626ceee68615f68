//! Conversion of polled counts into counts per second
//!
//! The counter is polled at a variable cadence, so each readout is divided
//! by the wall-clock interval since the previous one rather than assuming
//! a fixed gate time.

use crate::RawSample;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum RateError {
    #[error("non-positive interval since the previous sample")]
    NonPositiveInterval,
}

/// A [`RawSample`] scaled to counts per second
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct NormalizedSample {
    pub singles: [f64; 4],
    pub coinc: [f64; 4],
    pub err: f64,
    /// Interval the rates were measured over, in seconds
    pub dt: f64,
}

/// Owns the last-sample-time cursor
///
/// Normalization is order-sensitive: exactly one `Normalizer` serves a
/// pipeline, called from a single sequence of ticks.
#[derive(Debug)]
pub struct Normalizer {
    last: Instant,
}

impl Normalizer {
    /// `start` seeds the cursor, so the first sample normalizes against
    /// time since pipeline start
    pub fn new(start: Instant) -> Self {
        Normalizer { last: start }
    }

    /// Scale a readout by the elapsed interval. On failure the cursor does
    /// not advance and the caller must drop the sample.
    pub fn normalize(
        &mut self,
        raw: &RawSample,
        now: Instant,
    ) -> Result<NormalizedSample, RateError> {
        let dt = now
            .checked_duration_since(self.last)
            .ok_or(RateError::NonPositiveInterval)?
            .as_secs_f64();
        if dt <= 0.0 {
            return Err(RateError::NonPositiveInterval);
        }
        self.last = now;
        Ok(NormalizedSample {
            singles: raw.singles.map(|c| c as f64 / dt),
            coinc: raw.coinc.map(|c| c as f64 / dt),
            err: raw.err as f64 / dt,
            dt,
        })
    }
}
