//! Rolling average over the most recent angle samples.
//!
//! Damps per-frame landmark jitter before thresholds are applied.

use std::collections::VecDeque;

/// Default number of samples averaged per tracked angle
pub const DEFAULT_BUFFER_SIZE: usize = 10;

/// Fixed-capacity FIFO of valid samples for one tracked angle
#[derive(Debug, Clone)]
pub struct SmoothingBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SmoothingBuffer {
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a sample and return the current average.
    ///
    /// An absent sample leaves the buffer untouched, so the previous average
    /// is returned again. `None` only while the buffer is empty.
    pub fn push(&mut self, raw: Option<f32>) -> Option<f32> {
        if let Some(value) = raw {
            self.samples.push_back(value);
            while self.samples.len() > self.capacity {
                self.samples.pop_front();
            }
        }
        self.average()
    }

    pub fn average(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f32>() / self.samples.len() as f32)
    }

    /// Change capacity, keeping the newest samples.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SmoothingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_rolling_mean_evicts_oldest() {
        let mut buffer = SmoothingBuffer::new(3);
        let outputs: Vec<f32> = [10.0, 20.0, 30.0, 40.0]
            .into_iter()
            .map(|v| buffer.push(Some(v)).unwrap())
            .collect();

        let expected = [10.0, 15.0, 20.0, 30.0];
        for (got, want) in outputs.iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-4);
        }
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_empty_buffer_has_no_average() {
        let mut buffer = SmoothingBuffer::default();
        assert_eq!(buffer.push(None), None);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_clear_then_single_sample() {
        let mut buffer = SmoothingBuffer::new(4);
        buffer.push(Some(100.0));
        buffer.push(Some(120.0));
        buffer.clear();

        assert_eq!(buffer.average(), None);
        assert_eq!(buffer.push(Some(42.0)), Some(42.0));
    }

    #[test]
    fn test_resize_keeps_newest() {
        let mut buffer = SmoothingBuffer::new(5);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            buffer.push(Some(v));
        }
        buffer.resize(2);

        assert_eq!(buffer.len(), 2);
        assert_abs_diff_eq!(buffer.average().unwrap(), 4.5, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut buffer = SmoothingBuffer::new(0);
        buffer.push(Some(1.0));
        buffer.push(Some(9.0));
        assert_eq!(buffer.average(), Some(9.0));
    }

    proptest! {
        #[test]
        fn absent_sample_keeps_average(
            values in prop::collection::vec(0.0f32..180.0, 0..25),
            capacity in 1usize..12,
        ) {
            let mut buffer = SmoothingBuffer::new(capacity);
            for v in &values {
                buffer.push(Some(*v));
            }
            let before = buffer.average();
            prop_assert_eq!(buffer.push(None), before);
            prop_assert_eq!(buffer.len(), values.len().min(capacity));
        }

        #[test]
        fn average_stays_within_window_bounds(
            values in prop::collection::vec(0.0f32..180.0, 1..25),
            capacity in 1usize..12,
        ) {
            let mut buffer = SmoothingBuffer::new(capacity);
            let mut last = None;
            for v in &values {
                last = buffer.push(Some(*v));
            }
            let window = &values[values.len().saturating_sub(capacity)..];
            let lo = window.iter().cloned().fold(f32::INFINITY, f32::min);
            let hi = window.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let avg = last.unwrap();
            prop_assert!(avg >= lo - 1e-3 && avg <= hi + 1e-3);
        }
    }
}
