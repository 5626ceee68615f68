//! Rolling-window statistics and the g2 correlation estimator

use std::collections::VecDeque;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum StatError {
    #[error("window holds no samples")]
    EmptyWindow,
    #[error("zero sum or mean in a g2 denominator")]
    DivisionByZero,
}

/// Fixed-capacity FIFO of per-channel rates
///
/// `push` appends and then evicts the oldest entries until the window fits
/// its capacity, so a capacity reduction drains on subsequent pushes
/// rather than truncating in place.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    buf: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        RollingWindow {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.buf.push_back(value);
        while self.buf.len() > self.capacity {
            self.buf.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Takes effect on the next push; an over-full window is not truncated
    /// immediately
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.buf.iter()
    }

    pub fn sum(&self) -> f64 {
        self.buf.iter().sum()
    }

    pub fn mean(&self) -> Result<f64, StatError> {
        if self.buf.is_empty() {
            return Err(StatError::EmptyWindow);
        }
        Ok(self.sum() / self.buf.len() as f64)
    }

    /// Population standard deviation (denominator n)
    pub fn stddev(&self) -> Result<f64, StatError> {
        let mean = self.mean()?;
        let var = self
            .buf
            .iter()
            .map(|&x| (x - mean) * (x - mean))
            .sum::<f64>()
            / self.buf.len() as f64;
        Ok(var.sqrt())
    }
}

/// The six channel windows the pipeline maintains
#[derive(Clone, Debug)]
pub struct ChannelWindows {
    pub a: RollingWindow,
    pub b: RollingWindow,
    pub ab: RollingWindow,
    pub abp: RollingWindow,
    pub abbp: RollingWindow,
    pub bbp: RollingWindow,
}

impl ChannelWindows {
    pub fn new(capacity: usize) -> Self {
        ChannelWindows {
            a: RollingWindow::new(capacity),
            b: RollingWindow::new(capacity),
            ab: RollingWindow::new(capacity),
            abp: RollingWindow::new(capacity),
            abbp: RollingWindow::new(capacity),
            bbp: RollingWindow::new(capacity),
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        for w in [
            &mut self.a,
            &mut self.b,
            &mut self.ab,
            &mut self.abp,
            &mut self.abbp,
            &mut self.bbp,
        ] {
            w.set_capacity(capacity);
        }
    }
}

/// Derived correlation values, recomputed fresh each tick
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Correlation {
    /// Gated (3-detector) second-order coherence
    pub g2: f64,
    /// Propagated standard deviation of `g2`
    pub g2_dev: f64,
    /// 2-detector (non-gated) variant, `Σbb'` in place of `Σa`
    pub g2_2d: f64,
    /// Uncertainty on the 2-detector variant; see note on [`g2`]
    pub g2_2d_dev: f64,
    /// Standard deviations separating `g2` from the classical bound of 1
    pub sigma_below_one: f64,
}

/// Calculate the second-order degree of coherence, or g^(2) function, from
/// windowed singles and coincidence rates, as measured with a gated
/// Hanbury Brown-Twiss setup.
///
/// `g2 = (Σa · Σabb') / (Σab · Σab')`, sums taken over each window's
/// current contents. The uncertainty propagates the four windows'
/// fractional deviations in quadrature, assuming independent channel
/// fluctuations.
///
/// The 2-detector uncertainty reuses the gated formula verbatim (with the
/// `a` window) rather than recomputing from `bb'`. That reuse is the
/// established analysis convention for this instrument and is preserved
/// here; build with the `exact-2d-dev` feature to recompute from the
/// `bb'` window instead.
pub fn g2(w: &ChannelWindows) -> Result<Correlation, StatError> {
    if w.a.is_empty()
        || w.ab.is_empty()
        || w.abp.is_empty()
        || w.abbp.is_empty()
        || w.bbp.is_empty()
    {
        return Err(StatError::EmptyWindow);
    }

    let sum_a = w.a.sum();
    let sum_ab = w.ab.sum();
    let sum_abp = w.abp.sum();
    let sum_abbp = w.abbp.sum();
    let sum_bbp = w.bbp.sum();

    let denom = sum_ab * sum_abp;
    if denom == 0.0 {
        return Err(StatError::DivisionByZero);
    }

    let g2 = sum_a * sum_abbp / denom;
    let g2_2d = sum_bbp * sum_abbp / denom;

    let g2_dev = g2 * frac_dev_quadrature(&w.a, &w.ab, &w.abp, &w.abbp)?;
    #[cfg(not(feature = "exact-2d-dev"))]
    let g2_2d_dev = g2 * frac_dev_quadrature(&w.a, &w.ab, &w.abp, &w.abbp)?;
    #[cfg(feature = "exact-2d-dev")]
    let g2_2d_dev = g2_2d * frac_dev_quadrature(&w.bbp, &w.ab, &w.abp, &w.abbp)?;

    Ok(Correlation {
        g2,
        g2_dev,
        g2_2d,
        g2_2d_dev,
        sigma_below_one: (1.0 - g2) / g2_dev,
    })
}

/// sqrt of the sum of squared fractional deviations of four windows
fn frac_dev_quadrature(
    n: &RollingWindow,
    ab: &RollingWindow,
    abp: &RollingWindow,
    abbp: &RollingWindow,
) -> Result<f64, StatError> {
    let mut acc = 0.0;
    for w in [n, ab, abp, abbp] {
        let mean = w.mean()?;
        if mean == 0.0 {
            return Err(StatError::DivisionByZero);
        }
        let frac = w.stddev()? / mean;
        acc += frac * frac;
    }
    Ok(acc.sqrt())
}
