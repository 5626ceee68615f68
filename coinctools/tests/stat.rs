use coinctools::stat::{g2, ChannelWindows, RollingWindow, StatError};

#[test]
fn fifo_eviction_keeps_the_newest() {
    let mut w = RollingWindow::new(5);
    for i in 0..12 {
        w.push(i as f64);
    }
    assert_eq!(w.len(), 5);
    let contents: Vec<f64> = w.iter().copied().collect();
    assert_eq!(contents, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
}

#[test]
fn capacity_change_drains_on_next_push() {
    let mut w = RollingWindow::new(10);
    for i in 0..10 {
        w.push(i as f64);
    }
    w.set_capacity(4);
    // No instant truncation
    assert_eq!(w.len(), 10);
    w.push(10.0);
    assert_eq!(w.len(), 4);
    let contents: Vec<f64> = w.iter().copied().collect();
    assert_eq!(contents, vec![7.0, 8.0, 9.0, 10.0]);
}

#[test]
fn repeated_value_has_zero_stddev() {
    let mut w = RollingWindow::new(20);
    for _ in 0..15 {
        w.push(3.25);
    }
    assert_eq!(w.mean().unwrap(), 3.25);
    assert_eq!(w.stddev().unwrap(), 0.0);
}

#[test]
fn population_stddev() {
    let mut w = RollingWindow::new(10);
    for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
        w.push(v);
    }
    // Classic example: population variance 4, stddev 2
    assert_eq!(w.mean().unwrap(), 5.0);
    assert!((w.stddev().unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn empty_window_errors() {
    let w = RollingWindow::new(10);
    assert_eq!(w.mean(), Err(StatError::EmptyWindow));
    assert_eq!(w.stddev(), Err(StatError::EmptyWindow));
}

fn windows_with(a: f64, b: f64, ab: f64, abp: f64, abbp: f64, bbp: f64) -> ChannelWindows {
    let mut w = ChannelWindows::new(20);
    w.a.push(a);
    w.b.push(b);
    w.ab.push(ab);
    w.abp.push(abp);
    w.abbp.push(abbp);
    w.bbp.push(bbp);
    return w;
}

#[test]
fn g2_reference_values() {
    let w = windows_with(57000.0, 27000.0, 3000.0, 3000.0, 60.0, 10.0);
    let c = g2(&w).unwrap();
    // (57000 * 60) / (3000 * 3000) = 0.38
    assert!((c.g2 - 0.38).abs() < 1e-12);
    // (10 * 60) / (3000 * 3000)
    assert!((c.g2_2d - 10.0 * 60.0 / 9e6).abs() < 1e-15);
    // Single-entry windows have zero deviation
    assert_eq!(c.g2_dev, 0.0);
    assert_eq!(c.g2_2d_dev, 0.0);
}

#[test]
fn g2_dev_propagates_fractional_deviations() {
    let mut w = ChannelWindows::new(20);
    // Two-point windows with equal fractional deviation on each channel:
    // mean 10, population stddev 2, so sigma/mu = 0.2 in all four terms
    for v in [8.0, 12.0] {
        w.a.push(v * 100.0);
        w.ab.push(v);
        w.abp.push(v);
        w.abbp.push(v / 10.0);
        w.bbp.push(v);
    }
    let c = g2(&w).unwrap();
    let expect_dev = c.g2 * (4.0f64 * 0.2 * 0.2).sqrt();
    assert!((c.g2_dev - expect_dev).abs() < 1e-12);
    assert!((c.sigma_below_one - (1.0 - c.g2) / c.g2_dev).abs() < 1e-12);
    // Default build reuses the gated formula for the 2-detector deviation
    #[cfg(not(feature = "exact-2d-dev"))]
    assert_eq!(c.g2_2d_dev, c.g2_dev);
}

#[test]
fn empty_channel_window_is_an_error() {
    let mut w = ChannelWindows::new(20);
    w.a.push(1.0);
    w.ab.push(1.0);
    w.abp.push(1.0);
    w.abbp.push(1.0);
    // bbp never filled
    assert_eq!(g2(&w), Err(StatError::EmptyWindow));
}

#[test]
fn zero_denominator_is_an_error() {
    let w = windows_with(57000.0, 27000.0, 0.0, 3000.0, 60.0, 10.0);
    assert_eq!(g2(&w), Err(StatError::DivisionByZero));
}

#[test]
fn zero_mean_in_fractional_term_is_an_error() {
    // Sums are fine but the abbp mean is zero
    let mut w = windows_with(57000.0, 27000.0, 3000.0, 3000.0, 60.0, 10.0);
    w.abbp.push(-60.0);
    assert_eq!(g2(&w), Err(StatError::DivisionByZero));
}

#[test]
fn capacity_applies_across_all_channels() {
    let mut w = ChannelWindows::new(10);
    w.set_capacity(12);
    for win in [&w.a, &w.b, &w.ab, &w.abp, &w.abbp, &w.bbp] {
        assert_eq!(win.capacity(), 12);
    }
}
