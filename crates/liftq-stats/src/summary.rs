//! Summary statistics over a set of `f32` samples.

/// Count, extremes, mean and standard deviation of a sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub std_dev: f32,
}

impl SummaryStats {
    /// Computes statistics over the given samples.
    ///
    /// Returns `None` for an empty sample set.
    ///
    /// # Examples
    ///
    /// ```
    /// # use liftq_stats::SummaryStats;
    /// let stats = SummaryStats::from_samples([4.0, 1.0, 2.0, 5.0]).unwrap();
    /// assert_eq!(stats.count, 4);
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// ```
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn from_samples<I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut count = 0usize;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f32;
        let mut sum_squares = 0.0f32;
        for sample in samples {
            count += 1;
            min = min.min(sample);
            max = max.max(sample);
            sum += sample;
            sum_squares += sample * sample;
        }
        if count == 0 {
            return None;
        }

        let n = count as f32;
        let mean = sum / n;
        let variance = (sum_squares / n - mean * mean).max(0.0);
        Some(Self {
            count,
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_statistics() {
        assert_eq!(SummaryStats::from_samples(std::iter::empty::<f32>()), None);
    }

    #[test]
    fn single_sample_has_zero_spread() {
        let stats = SummaryStats::from_samples([2.5]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.min, 2.5);
        assert_eq!(stats.max, 2.5);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn spread_matches_a_hand_computed_case() {
        // samples 2 and 4: mean 3, variance 1
        let stats = SummaryStats::from_samples([2.0, 4.0]).unwrap();
        assert_eq!(stats.mean, 3.0);
        assert!((stats.std_dev - 1.0).abs() < 1e-6);
    }
}
