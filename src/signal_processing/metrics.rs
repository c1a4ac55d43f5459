use crate::error::{RciError, Result};

/// Roughness statistics of one completed window
///
/// - `roughness`: RMS of the filtered values
/// - `vdv`: fourth-power vibration dose, `(mean |v|^4)^(1/4)`
/// - `crest_factor`: peak over RMS; `None` when the RMS is exactly zero
/// - `peak`: largest absolute value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMetrics {
    pub roughness: f64,
    pub vdv: f64,
    pub crest_factor: Option<f64>,
    pub peak: f64,
}

impl WindowMetrics {
    /// Compute all statistics over a non-empty window
    ///
    /// # Errors
    /// Returns `RciError::InsufficientData` for an empty slice
    pub fn compute(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(RciError::InsufficientData {
                needed: 1,
                available: 0,
            });
        }

        let peak = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));

        let (mut roughness, mut vdv) = power_means(values, 1.0);
        if !(roughness.is_finite() && vdv.is_finite()) && peak.is_finite() {
            // Squares overflowed; normalise by the peak first
            let (r, v) = power_means(values, peak);
            roughness = r * peak;
            vdv = v * peak;
        }
        let crest_factor = if roughness == 0.0 {
            None
        } else {
            Some(peak / roughness)
        };

        Ok(Self {
            roughness,
            vdv,
            crest_factor,
            peak,
        })
    }
}

/// RMS and fourth-power mean root of `values / scale`
fn power_means(values: &[f64], scale: f64) -> (f64, f64) {
    let n = values.len() as f64;
    let mean_square = values.iter().map(|v| (v / scale).powi(2)).sum::<f64>() / n;
    let mean_fourth = values.iter().map(|v| (v / scale).abs().powi(4)).sum::<f64>() / n;
    (mean_square.sqrt(), mean_fourth.powf(0.25))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_window() {
        let values = [1.0, -2.0, 3.0, -4.0];
        let metrics = WindowMetrics::compute(&values).unwrap();

        let rms = ((1.0 + 4.0 + 9.0 + 16.0) / 4.0f64).sqrt();
        let vdv = ((1.0 + 16.0 + 81.0 + 256.0) / 4.0f64).powf(0.25);

        assert_relative_eq!(metrics.roughness, rms, max_relative = 1e-12);
        assert_relative_eq!(metrics.vdv, vdv, max_relative = 1e-12);
        assert_relative_eq!(metrics.peak, 4.0);
        assert_relative_eq!(metrics.crest_factor.unwrap(), 4.0 / rms, max_relative = 1e-12);
    }

    #[test]
    fn test_all_zero_window_has_no_crest_factor() {
        let metrics = WindowMetrics::compute(&[0.0; 50]).unwrap();
        assert_eq!(metrics.roughness, 0.0);
        assert_eq!(metrics.vdv, 0.0);
        assert_eq!(metrics.peak, 0.0);
        assert_eq!(metrics.crest_factor, None);
    }

    #[test]
    fn test_constant_window_crest_factor_is_one() {
        let metrics = WindowMetrics::compute(&[-0.5; 10]).unwrap();
        assert_relative_eq!(metrics.roughness, 0.5);
        assert_relative_eq!(metrics.vdv, 0.5, max_relative = 1e-12);
        assert_relative_eq!(metrics.crest_factor.unwrap(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_vdv_weights_peaks_more_than_rms() {
        let mut values = vec![0.1; 49];
        values.push(5.0);
        let metrics = WindowMetrics::compute(&values).unwrap();
        assert!(metrics.vdv > metrics.roughness);
        assert!(metrics.crest_factor.unwrap() > 5.0);
    }

    #[test]
    fn test_huge_values_stay_finite() {
        let values = [1e200, -1e200, 1e200, -1e200];
        let metrics = WindowMetrics::compute(&values).unwrap();
        assert_relative_eq!(metrics.roughness, 1e200, max_relative = 1e-12);
        assert_relative_eq!(metrics.vdv, 1e200, max_relative = 1e-12);
        assert_relative_eq!(metrics.crest_factor.unwrap(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_empty_window_is_an_error() {
        assert!(matches!(
            WindowMetrics::compute(&[]),
            Err(RciError::InsufficientData {
                needed: 1,
                available: 0
            })
        ));
    }
}
