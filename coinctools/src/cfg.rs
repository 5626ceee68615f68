//! Monitor run configuration
//!
//! A `Monitor` is declared in a JSON file and loaded by the watch binary.
//! All fields are optional apart from the description; unset fields take
//! the defaults below. Out-of-range values are clamped by the accessor
//! methods rather than rejected, so a hand-edited file cannot take the
//! monitor down.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const WINDOW_DEFAULT: usize = 20;
pub const WINDOW_MIN: usize = 10;
pub const WINDOW_MAX: usize = 300;

pub const CAPTURE_DEFAULT: Duration = Duration::from_secs(5);
pub const CAPTURE_MIN: Duration = Duration::from_secs(1);
pub const CAPTURE_MAX: Duration = Duration::from_secs(30);

/// Declaration of a monitoring run
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Monitor {
    pub description: String,
    /// Use the synthetic sample generator instead of a device
    pub mock: Option<bool>,
    /// Points kept per channel window
    pub window: Option<usize>,
    /// Capture destination; a timestamped name is generated when unset
    pub capture_file: Option<PathBuf>,
    /// Capture duration, parsed as in [humantime](https://docs.rs/humantime/),
    /// e.g. `5s` or `1min 30s`
    #[serde(default, with = "humantime_serde")]
    pub capture_limit: Option<Duration>,
    /// Singles chart y-range, carried for the presentation layer
    pub singles_scale: Option<(f64, f64)>,
    /// Coincidence chart y-range, carried for the presentation layer
    pub coinc_scale: Option<(f64, f64)>,
}

impl Monitor {
    /// Window capacity clamped to [`WINDOW_MIN`]..=[`WINDOW_MAX`]
    pub fn window_capacity(&self) -> usize {
        self.window
            .unwrap_or(WINDOW_DEFAULT)
            .clamp(WINDOW_MIN, WINDOW_MAX)
    }

    /// Capture limit clamped to [`CAPTURE_MIN`]..=[`CAPTURE_MAX`]
    pub fn capture_duration(&self) -> Duration {
        self.capture_limit
            .unwrap_or(CAPTURE_DEFAULT)
            .clamp(CAPTURE_MIN, CAPTURE_MAX)
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Monitor {
            description: String::new(),
            mock: None,
            window: None,
            capture_file: None,
            capture_limit: None,
            singles_scale: None,
            coinc_scale: None,
        }
    }
}
