pub mod capture;
pub mod driver;
pub mod source;
pub mod timer;

use argh::FromArgs;
use coinctools::cfg::{self, Monitor};
use std::path::PathBuf;
use std::time::Duration;

/// Live monitor for the coincidence counter: rates, windowed statistics, and g2
#[derive(Debug, FromArgs, Clone)]
pub struct CliArgs {
    /// tick period in ms
    #[argh(option, default = "100")]
    pub tick_rate: u64,
    /// monitor config file path
    #[argh(option)]
    pub config: Option<String>,
    /// use synthetic data instead of a device
    #[argh(switch)]
    pub mock: bool,
    /// serial device path, read as a binary frame stream
    #[argh(option)]
    pub port: Option<String>,
    /// poll the device over its text protocol instead of the frame stream
    #[argh(switch)]
    pub query: bool,
    /// capture file path; starts a capture on launch
    #[argh(option)]
    pub capture: Option<String>,
    /// capture duration in seconds
    #[argh(option)]
    pub capture_secs: Option<u64>,
    /// stop after this many seconds
    #[argh(option)]
    pub limit: Option<u64>,
    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,
}

impl CliArgs {
    /// A capture requested up front, from the CLI or the config file.
    /// `--capture-secs` without a path captures to a generated
    /// timestamped file; the duration is clamped to the supported range.
    pub fn capture_request(&self, config: &Monitor) -> Option<(Option<PathBuf>, Duration)> {
        if self.capture.is_none() && self.capture_secs.is_none() && config.capture_file.is_none()
        {
            return None;
        }
        let path = self
            .capture
            .clone()
            .map(PathBuf::from)
            .or_else(|| config.capture_file.clone());
        let limit = self
            .capture_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.capture_duration())
            .clamp(cfg::CAPTURE_MIN, cfg::CAPTURE_MAX);
        Some((path, limit))
    }
}

pub enum Event {
    Tick,
}
