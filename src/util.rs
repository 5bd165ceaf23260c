/// Percentage of known cards, rounded half away from zero. An empty session scores 0.
pub fn score_percent(known: usize, total: usize) -> u32 {
    match total {
        positive if positive > 0 => ((200 * known + total) / (2 * total)) as u32,
        _ => 0,
    }
}

/// Fraction of the queue already answered, for progress gauges
pub fn progress_ratio(done: usize, total: usize) -> f64 {
    match total {
        positive if positive > 0 => (done as f64 / total as f64).clamp(0.0, 1.0),
        _ => 0.0,
    }
}
