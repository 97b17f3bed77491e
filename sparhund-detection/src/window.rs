//! Sliding time-window counting shared by the rate-based detectors.

/// Largest number of events falling inside any window of `width_us`
/// microseconds. Two events share a window when their timestamps differ by
/// less than `width_us`. Input order does not matter.
pub fn peak_count(timestamps: &mut [u64], width_us: u64) -> usize {
    let width_us = width_us.max(1);
    timestamps.sort_unstable();
    let mut peak = 0;
    let mut start = 0;
    for end in 0..timestamps.len() {
        while timestamps[end] - timestamps[start] >= width_us {
            start += 1;
        }
        peak = peak.max(end - start + 1);
    }
    peak
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty() {
        assert_eq!(peak_count(&mut [], 1_000), 0);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let mut ts = [0, 500, 999, 1_000];
        assert_eq!(peak_count(&mut ts, 1_000), 3);
    }

    #[test]
    fn test_unsorted_input() {
        let mut ts = [5_000, 10, 20, 4_990, 30];
        assert_eq!(peak_count(&mut ts, 100), 3);
    }

    proptest! {
        #[test]
        fn peak_bounded_by_len(mut ts in proptest::collection::vec(0u64..10_000, 0..200), width in 1u64..5_000) {
            let len = ts.len();
            let peak = peak_count(&mut ts, width);
            prop_assert!(peak <= len);
            prop_assert_eq!(peak == 0, len == 0);
        }

        #[test]
        fn wider_window_never_lowers_peak(mut ts in proptest::collection::vec(0u64..10_000, 1..200), width in 1u64..5_000) {
            let narrow = peak_count(&mut ts, width);
            let wide = peak_count(&mut ts, width * 2);
            prop_assert!(wide >= narrow);
        }
    }
}
