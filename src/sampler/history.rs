use std::collections::VecDeque;

/// Fixed-capacity ring buffer of trend samples.
///
/// Once full, each append evicts the logical-oldest value; the buffer never
/// grows past its capacity. A capacity request of zero is clamped to 1.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T> HistoryBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn append(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }
}

impl<T: Clone> HistoryBuffer<T> {
    pub fn values_oldest_first(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }

    pub fn values_newest_first(&self) -> Vec<T> {
        self.values.iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_most_recent_values_once_full() {
        let mut buffer = HistoryBuffer::new(5);
        for i in 0..10 {
            buffer.append(f64::from(i));
        }
        assert_eq!(buffer.values_oldest_first(), vec![5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(buffer.values_newest_first(), vec![9.0, 8.0, 7.0, 6.0, 5.0]);
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn append_before_capacity_preserves_order() {
        let mut buffer = HistoryBuffer::new(3);
        buffer.append(1);
        buffer.append(2);
        assert_eq!(buffer.values_oldest_first(), vec![1, 2]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let mut buffer = HistoryBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.append(7);
        buffer.append(8);
        assert_eq!(buffer.values_oldest_first(), vec![8]);
    }

    #[test]
    fn empty_buffer_reports_empty() {
        let buffer: HistoryBuffer<f64> = HistoryBuffer::new(4);
        assert!(buffer.is_empty());
        assert!(buffer.values_oldest_first().is_empty());
        assert!(buffer.values_newest_first().is_empty());
    }
}
