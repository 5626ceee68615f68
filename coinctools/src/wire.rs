//! Wire format for the counter's binary readout: terminator-delimited
//! frames of eight little-endian 40-bit unsigned fields
//!
//! A frame is the 40 bytes preceding a `0x7F` terminator, in field order
//! `[A, B, B', C, AB, AB', NA, ABB']`. Any other length between
//! terminators is a malformed frame, reported and discarded. A data byte
//! equal to the terminator is indistinguishable from a real terminator;
//! the decoder reports the resulting short frames rather than trying to
//! resynchronize.

use crate::RawSample;
use thiserror::Error;

/// Delimiter byte between frames
pub const TERMINATOR: u8 = 0x7F;
/// Bytes per field (40-bit little-endian unsigned)
pub const FIELD_BYTES: usize = 5;
/// Fields per frame
pub const FRAME_FIELDS: usize = 8;
/// Payload bytes per frame, exclusive of the terminator
pub const FRAME_BYTES: usize = FIELD_BYTES * FRAME_FIELDS;

const FIELD_MAX: u64 = (1 << (8 * FIELD_BYTES)) - 1;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("field {index} value {value} exceeds 40 bits")]
    FieldOverflow { index: usize, value: u64 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One complete frame of eight 40-bit counters
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct RawFrame(pub [u64; FRAME_FIELDS]);

impl RawFrame {
    /// Partition the frame into singles and coincidences. The 8-field
    /// frame carries no error scalar; that field is reserved.
    pub fn to_sample(&self) -> RawSample {
        let RawFrame(f) = self;
        RawSample {
            singles: [f[0], f[1], f[2], f[3]],
            coinc: [f[4], f[5], f[6], f[7]],
            err: 0,
        }
    }
}

/// Outcome of one terminator observation
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum DecodeEvent {
    Frame(RawFrame),
    /// Buffer between terminators was not exactly [`FRAME_BYTES`] long
    Malformed { len: usize },
}

/// Incremental decoder over an unstructured byte stream
///
/// The accumulation buffer persists across [`feed`](FrameDecoder::feed)
/// calls, so the stream may be fed in arbitrary chunks. One decoder
/// instance must own the connection for its lifetime.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        FrameDecoder { buf: Vec::with_capacity(FRAME_BYTES) }
    }

    /// Consume a chunk of bytes, yielding an event per terminator seen
    pub fn feed<'a, 'b>(&'a mut self, bytes: &'b [u8]) -> Feed<'a, 'b> {
        Feed {
            decoder: self,
            bytes: bytes.iter(),
        }
    }

    fn terminate(&mut self) -> DecodeEvent {
        let event = if self.buf.len() == FRAME_BYTES {
            let mut fields = [0u64; FRAME_FIELDS];
            for (field, group) in fields.iter_mut().zip(self.buf.chunks_exact(FIELD_BYTES)) {
                *field = group
                    .iter()
                    .enumerate()
                    .map(|(i, &b)| (b as u64) << (8 * i))
                    .sum();
            }
            DecodeEvent::Frame(RawFrame(fields))
        } else {
            DecodeEvent::Malformed { len: self.buf.len() }
        };
        self.buf.clear();
        event
    }
}

/// Lazy event iterator returned by [`FrameDecoder::feed`]
pub struct Feed<'a, 'b> {
    decoder: &'a mut FrameDecoder,
    bytes: std::slice::Iter<'b, u8>,
}

impl Iterator for Feed<'_, '_> {
    type Item = DecodeEvent;

    fn next(&mut self) -> Option<DecodeEvent> {
        for &b in self.bytes.by_ref() {
            if b == TERMINATOR {
                return Some(self.decoder.terminate());
            }
            self.decoder.buf.push(b);
        }
        None
    }
}

/// Serialize eight counter values to the wire format, terminator included
pub fn encode(fields: &[u64; FRAME_FIELDS], wtr: &mut impl std::io::Write) -> Result<(), WireError> {
    for (index, &value) in fields.iter().enumerate() {
        if value > FIELD_MAX {
            return Err(WireError::FieldOverflow { index, value });
        }
        let le = value.to_le_bytes();
        wtr.write_all(&le[..FIELD_BYTES])?;
    }
    wtr.write_all(&[TERMINATOR])?;
    Ok(())
}
