//! Plain statistics over event timestamps.

/// Mean gap between consecutive timestamps.
///
/// Timestamps must be sorted ascending. Returns `None` with fewer than two.
#[expect(
    clippy::cast_precision_loss,
    reason = "match clocks are far below 2^52 seconds"
)]
pub fn mean_gap(timestamps: &[u32]) -> Option<f64> {
    if timestamps.len() < 2 {
        return None;
    }
    let total: u64 = timestamps
        .windows(2)
        .map(|pair| u64::from(pair[1].saturating_sub(pair[0])))
        .sum();
    Some(total as f64 / (timestamps.len() - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_gap_needs_two_timestamps() {
        assert_eq!(mean_gap(&[]), None);
        assert_eq!(mean_gap(&[42]), None);
    }

    #[test]
    fn test_mean_gap_averages_consecutive_differences() {
        assert_eq!(mean_gap(&[10, 40, 100]), Some(45.0));
        assert_eq!(mean_gap(&[10, 10]), Some(0.0));
    }
}
