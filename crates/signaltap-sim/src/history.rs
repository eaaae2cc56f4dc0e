//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Fixed-capacity sensor history ring buffer."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use serde::Serialize;

/// Samples kept per sensor (one minute at 1 Hz).
pub const SENSOR_HISTORY_LEN: usize = 60;

/// History buffer sized for sensor sparklines.
pub type SensorHistory = HistoryRingBuffer<SENSOR_HISTORY_LEN>;

/// Circular buffer that overwrites its oldest sample once full.
///
/// `head` is the next write position; the logical sequence oldest → newest is
/// `buffer[(head - count + i + N) % N]` for `i` in `0..count`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRingBuffer<const N: usize> {
    buffer: [f32; N],
    head: usize,
    count: usize,
}

impl<const N: usize> HistoryRingBuffer<N> {
    pub fn new() -> Self {
        Self {
            buffer: [0.0; N],
            head: 0,
            count: 0,
        }
    }

    pub fn push(&mut self, value: f32) {
        if N == 0 {
            return;
        }
        self.buffer[self.head] = value;
        self.head = (self.head + 1) % N;
        self.count = (self.count + 1).min(N);
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Next write position in the raw buffer.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Raw storage in slot order.
    pub fn raw(&self) -> &[f32; N] {
        &self.buffer
    }

    /// Sample at logical position `index`, where `0` is the oldest retained sample.
    pub fn get(&self, index: usize) -> Option<f32> {
        if index >= self.count {
            return None;
        }
        let slot = (self.head + N - self.count + index) % N;
        Some(self.buffer[slot])
    }

    pub fn latest(&self) -> Option<f32> {
        self.count.checked_sub(1).and_then(|last| self.get(last))
    }

    /// Iterate samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.count).filter_map(move |index| self.get(index))
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.iter().collect()
    }
}

impl<const N: usize> Default for HistoryRingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Serialize for HistoryRingBuffer<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_has_no_samples() {
        let history = SensorHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 60);
        assert_eq!(history.get(0), None);
        assert_eq!(history.latest(), None);
    }

    #[test]
    fn partial_fill_preserves_order() {
        let mut history = SensorHistory::new();
        for value in [1.0, 2.0, 3.0] {
            history.push(value);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.head(), 3);
        assert_eq!(history.to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(history.latest(), Some(3.0));
    }

    #[test]
    fn sixty_one_pushes_keep_newest_sixty() {
        let mut history = SensorHistory::new();
        for value in 0..61 {
            history.push(value as f32);
        }
        assert_eq!(history.len(), 60);
        assert_eq!(history.head(), 1);
        let expected: Vec<f32> = (1..61).map(|v| v as f32).collect();
        assert_eq!(history.to_vec(), expected);
        assert_eq!(history.get(0), Some(1.0));
        assert_eq!(history.latest(), Some(60.0));
    }

    #[test]
    fn wraparound_overwrites_oldest_slot() {
        let mut history = HistoryRingBuffer::<4>::new();
        for value in 0..10 {
            history.push(value as f32);
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.to_vec(), vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(history.raw(), &[8.0, 9.0, 6.0, 7.0]);
    }

    #[test]
    fn serializes_in_logical_order() {
        let mut history = HistoryRingBuffer::<3>::new();
        for value in [1.5, 2.5, 3.5, 4.5] {
            history.push(value);
        }
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, "[2.5,3.5,4.5]");
    }
}
