/// Common trait for per-sample filters
///
/// Implemented by [`SinglePole`](super::SinglePole) and
/// [`RoughnessFilter`](super::RoughnessFilter).
pub trait Filter {
    /// Process a single sample through the filter
    fn process(&mut self, sample: f64) -> f64;

    /// Process a buffer of samples in-place
    fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
