/// Batches filtered samples into fixed-size windows.
///
/// A window is handed out only when it holds exactly `capacity` samples.
/// Partial windows are never flushed; [`discard`](Self::discard) drops them.
#[derive(Debug, Clone)]
pub struct WindowAccumulator {
    buffer: Vec<f64>,
    capacity: usize,
}

impl WindowAccumulator {
    /// Create an accumulator for windows of `capacity` samples.
    ///
    /// A zero capacity is treated as one sample per window.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample; returns the completed window when this sample fills it
    pub fn push(&mut self, value: f64) -> Option<Vec<f64>> {
        self.buffer.push(value);

        if self.buffer.len() >= self.capacity {
            let window = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.capacity));
            Some(window)
        } else {
            None
        }
    }

    /// Drop the partial window, returning how many samples were in it
    pub fn discard(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emits_exactly_at_capacity() {
        let mut window = WindowAccumulator::new(3);

        assert!(window.push(1.0).is_none());
        assert!(window.push(2.0).is_none());
        assert_eq!(window.len(), 2);

        let full = window.push(3.0).expect("window should complete");
        assert_eq!(full, vec![1.0, 2.0, 3.0]);
        assert!(window.is_empty());
    }

    #[test]
    fn test_consecutive_windows_do_not_overlap() {
        let mut window = WindowAccumulator::new(4);
        let completed: Vec<Vec<f64>> = (0..10).filter_map(|i| window.push(i as f64)).collect();

        assert_eq!(completed.len(), 2);
        assert_eq!(completed[0], vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(completed[1], vec![4.0, 5.0, 6.0, 7.0]);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_discard_drops_partial_window() {
        let mut window = WindowAccumulator::new(50);
        for i in 0..30 {
            assert!(window.push(i as f64).is_none());
        }

        assert_eq!(window.discard(), 30);
        assert!(window.is_empty());

        // A fresh window needs the full capacity again
        for i in 0..49 {
            assert!(window.push(i as f64).is_none());
        }
        assert_eq!(window.push(49.0).map(|w| w.len()), Some(50));
    }

    #[test]
    fn test_zero_capacity_means_single_sample_windows() {
        let mut window = WindowAccumulator::new(0);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.push(7.0), Some(vec![7.0]));
    }
}
