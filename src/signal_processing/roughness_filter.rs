use super::{Filter, SinglePole};
use crate::config::FilterConfig;

/// Snapshot of the two held outputs of a [`RoughnessFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterState {
    pub hp_prev: f64,
    pub lp_prev: f64,
}

/// Two cascaded single-pole stages applied to bias-corrected accelerometer
/// samples.
///
/// Stage one is designed from the high-pass cutoff and stage two from the
/// low-pass cutoff. Both stages use the recursive smoothing form and stage
/// one's recursive output is passed straight to stage two (the input minus
/// that output is never taken). Published roughness values are calibrated
/// against exactly this transfer function.
///
/// State is held for the lifetime of the filter; it is not cleared between
/// windows or recording sessions.
#[derive(Debug, Clone)]
pub struct RoughnessFilter {
    highpass: SinglePole,
    lowpass: SinglePole,
}

impl RoughnessFilter {
    /// Create the cascade for a nominal sample rate in Hz
    pub fn new(config: &FilterConfig, sample_rate: f64) -> Self {
        Self {
            highpass: SinglePole::with_cutoff(sample_rate, config.highpass_cutoff_hz),
            lowpass: SinglePole::with_cutoff(sample_rate, config.lowpass_cutoff_hz),
        }
    }

    /// Subtract `bias` from a raw reading and run it through both stages
    pub fn process_with_bias(&mut self, raw: f64, bias: f64) -> f64 {
        self.process(raw - bias)
    }

    /// Like [`process_with_bias`](Self::process_with_bias), but an input that
    /// would drive either stage out of the finite range is rejected: the
    /// state stays as it was and `None` is returned.
    pub fn try_process_with_bias(&mut self, raw: f64, bias: f64) -> Option<f64> {
        let saved = (self.highpass.clone(), self.lowpass.clone());
        let output = self.process_with_bias(raw, bias);

        if output.is_finite() && self.highpass.prev().is_finite() {
            Some(output)
        } else {
            (self.highpass, self.lowpass) = saved;
            None
        }
    }

    pub fn state(&self) -> FilterState {
        FilterState {
            hp_prev: self.highpass.prev(),
            lp_prev: self.lowpass.prev(),
        }
    }

    /// Smoothing factors of (stage one, stage two)
    pub fn alphas(&self) -> (f64, f64) {
        (self.highpass.alpha(), self.lowpass.alpha())
    }
}

impl Filter for RoughnessFilter {
    fn process(&mut self, sample: f64) -> f64 {
        let hp = self.highpass.process(sample);
        self.lowpass.process(hp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn default_filter() -> RoughnessFilter {
        RoughnessFilter::new(&FilterConfig::default(), 50.0)
    }

    #[test]
    fn test_matches_reference_recursion() {
        let mut filter = default_filter();
        let (a_hp, a_lp) = filter.alphas();

        let inputs = [0.3, -1.2, 0.8, 2.5, -0.4, 0.0, 1.1];
        let mut hp_prev = 0.0;
        let mut lp_prev = 0.0;
        for &x in &inputs {
            let hp = hp_prev + a_hp * (x - hp_prev);
            hp_prev = hp;
            let lp = lp_prev + a_lp * (hp - lp_prev);
            lp_prev = lp;

            assert_relative_eq!(filter.process(x), lp, max_relative = 1e-12);
        }

        let state = filter.state();
        assert_relative_eq!(state.hp_prev, hp_prev, max_relative = 1e-12);
        assert_relative_eq!(state.lp_prev, lp_prev, max_relative = 1e-12);
    }

    #[test]
    fn test_bias_is_subtracted_before_filtering() {
        let mut with_bias = default_filter();
        let mut shifted = default_filter();

        for i in 0..20 {
            let raw = 9.81 + (i as f64 * 0.3).sin();
            let a = with_bias.process_with_bias(raw, 9.81);
            let b = shifted.process(raw - 9.81);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_overflowing_input_leaves_state_untouched() {
        let mut filter = default_filter();
        assert!(filter.try_process_with_bias(f64::MAX, 0.0).is_some());
        let before = filter.state();

        // MAX - (-MAX) overflows inside stage one
        assert_eq!(filter.try_process_with_bias(-f64::MAX, 0.0), None);
        assert_eq!(filter.state(), before);

        let mut reference = default_filter();
        reference.process(f64::MAX);
        assert_eq!(filter.try_process_with_bias(0.1, 0.0), Some(reference.process(0.1)));
    }

    #[test]
    fn test_first_stage_tracks_input_level() {
        // The first stage settles at the input level rather than rejecting it.
        let mut filter = default_filter();
        let mut buffer = vec![1.0; 5000];
        filter.process_buffer(&mut buffer);

        let state = filter.state();
        assert!((state.hp_prev - 1.0).abs() < 1e-9);
        assert!((state.lp_prev - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_input_keeps_zero_state() {
        let mut filter = default_filter();
        let mut buffer = vec![0.0; 200];
        filter.process_buffer(&mut buffer);

        assert!(buffer.iter().all(|&v| v == 0.0));
        assert_eq!(filter.state(), FilterState::default());
    }
}
