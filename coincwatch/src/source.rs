//! Sample sources: live framed stream, live query protocol, synthetic

use anyhow::{bail, Context, Result};
use coinctools::wire::{DecodeEvent, FrameDecoder};
use coinctools::RawSample;
use rand::Rng;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use tracing::warn;

/// Anything that can produce the next counter readout
pub trait SampleSource {
    /// `None` means no new sample this tick, or an exhausted source
    fn sample(&mut self) -> Result<Option<RawSample>>;
}

/// Decodes the counter's binary frame stream from a byte source
///
/// Frames decoded faster than ticks consume them wait in the queue; they
/// are never dropped. Malformed frames are logged and skipped.
pub struct FrameSource<R: Read> {
    rdr: R,
    decoder: FrameDecoder,
    queue: VecDeque<RawSample>,
    eof: bool,
}

impl<R: Read> FrameSource<R> {
    pub fn new(rdr: R) -> Self {
        FrameSource {
            rdr,
            decoder: FrameDecoder::new(),
            queue: VecDeque::new(),
            eof: false,
        }
    }
}

impl<R: Read> SampleSource for FrameSource<R> {
    fn sample(&mut self) -> Result<Option<RawSample>> {
        if self.queue.is_empty() && !self.eof {
            let mut chunk = [0u8; 256];
            let n = self.rdr.read(&mut chunk)?;
            if n == 0 {
                self.eof = true;
            }
            for event in self.decoder.feed(&chunk[..n]) {
                match event {
                    DecodeEvent::Frame(f) => self.queue.push_back(f.to_sample()),
                    DecodeEvent::Malformed { len } => {
                        warn!(len, "malformed frame discarded");
                    }
                }
            }
        }
        Ok(self.queue.pop_front())
    }
}

/// Polls the counter over its text protocol: send `c`, read back one line
/// of nine space-separated counts (four singles, four coincidences, err)
pub struct QuerySource<T: Read + Write> {
    port: BufReader<T>,
}

impl<T: Read + Write> QuerySource<T> {
    pub fn new(port: T) -> Self {
        QuerySource {
            port: BufReader::new(port),
        }
    }
}

impl<T: Read + Write> SampleSource for QuerySource<T> {
    fn sample(&mut self) -> Result<Option<RawSample>> {
        self.port.get_mut().write_all(b"c\n")?;
        self.port.get_mut().flush()?;

        let mut line = String::new();
        if self.port.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let mut toks = line.split_whitespace();
        let mut fields = [0u64; 9];
        let mut n = 0;
        for (slot, tok) in fields.iter_mut().zip(toks.by_ref()) {
            *slot = tok
                .parse()
                .with_context(|| format!("bad count field {:?}", tok))?;
            n += 1;
        }
        // A long response is as suspect as a short one
        let total = n + toks.count();
        if total != 9 {
            bail!("expected 9 count fields, got {}", total);
        }
        Ok(Some(RawSample {
            singles: [fields[0], fields[1], fields[2], fields[3]],
            coinc: [fields[4], fields[5], fields[6], fields[7]],
            err: fields[8],
        }))
    }
}

/// Typical bench counts used to seed the synthetic generator
pub const MOCK_BASELINE: [u64; 9] = [57000, 27000, 27000, 100, 3000, 3000, 10, 60, 0];

/// Synthetic generator for working away from the device: baseline counts
/// with 10% uniform jitter per field
pub struct MockSource {
    rng: rand::rngs::ThreadRng,
}

impl MockSource {
    pub fn new() -> Self {
        MockSource {
            rng: rand::thread_rng(),
        }
    }

    fn jitter(&mut self, base: u64) -> u64 {
        ((1.0 + 0.1 * self.rng.gen::<f64>()) * base as f64) as u64
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for MockSource {
    fn sample(&mut self) -> Result<Option<RawSample>> {
        let mut f = [0u64; 9];
        for (slot, &base) in f.iter_mut().zip(MOCK_BASELINE.iter()) {
            *slot = self.jitter(base);
        }
        Ok(Some(RawSample {
            singles: [f[0], f[1], f[2], f[3]],
            coinc: [f[4], f[5], f[6], f[7]],
            err: f[8],
        }))
    }
}
