//! Pixel-intensity statistics.

/// Round to exactly two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean, median and population standard deviation of a sample set,
/// each rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelStatistics {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Compute statistics over the samples; `None` for an empty slice.
pub fn pixel_statistics(samples: &[f64]) -> Option<PixelStatistics> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    Some(PixelStatistics {
        mean: round2(mean),
        median: round2(median),
        std: round2(std),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(1.2345), 1.23);
        assert_eq!(round2(1.239), 1.24);
        assert_eq!(round2(-3.14159), -3.14);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn statistics_of_known_samples() {
        // population std of [2,4,4,4,5,5,7,9] is exactly 2
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = pixel_statistics(&samples).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.median, 4.5);
        assert_eq!(stats.std, 2.0);
    }

    #[test]
    fn median_of_odd_count() {
        let stats = pixel_statistics(&[9.0, 1.0, 5.0]).unwrap();
        assert_eq!(stats.median, 5.0);
    }

    #[test]
    fn single_sample() {
        let stats = pixel_statistics(&[42.0]).unwrap();
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.median, 42.0);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    fn statistics_are_rounded() {
        // mean 1.25/3 = 0.41666..., std and median likewise truncated to 2dp
        let stats = pixel_statistics(&[0.25, 0.5, 0.5]).unwrap();
        assert_eq!(stats.mean, 0.42);
        assert_eq!(stats.median, 0.5);
    }

    #[test]
    fn empty_samples_have_no_statistics() {
        assert!(pixel_statistics(&[]).is_none());
    }
}
