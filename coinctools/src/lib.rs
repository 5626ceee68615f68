pub mod cfg;
pub mod rate;
pub mod stat;
pub mod wire;

/// One decoded readout from the coincidence counter
///
/// Singles are `[A, B, B', C]` and coincidences `[AB, AB', BB', ABB']`.
/// The unit labels its third coincidence channel `NA`, but it carries the
/// B-B' coincidence count.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct RawSample {
    /// Counts on the four singles channels
    pub singles: [u64; 4],
    /// Counts on the four coincidence channels
    pub coinc: [u64; 4],
    /// Error scalar reported by the text protocol; zero for binary frames
    pub err: u64,
}

pub const SINGLES_LABELS: [&str; 4] = ["A", "B", "B'", "C"];
pub const COINC_LABELS: [&str; 4] = ["AB", "AB'", "BB'", "ABB'"];
