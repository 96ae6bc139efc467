/// Number of prices kept per instrument for charting
pub const HISTORY_CAPACITY: usize = 10;

/// Fixed-capacity circular buffer of prices
///
/// Storage is allocated once. `push` is O(1): when full, the write slot
/// wraps onto the oldest element, so the buffer can never exceed its
/// capacity.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    /// Pre-allocated slots, only the first `len` are meaningful before wrap
    slots: Box<[f64]>,
    /// Index of the oldest element
    head: usize,
    len: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer with the given capacity (must be > 0)
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "History capacity must be greater than 0");
        Self {
            slots: vec![0.0; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Create a buffer holding a single seed value
    pub fn seeded(value: f64) -> Self {
        let mut buffer = Self::with_capacity(HISTORY_CAPACITY);
        buffer.push(value);
        buffer
    }

    /// Append a value, evicting the oldest one if the buffer is full
    #[inline]
    pub fn push(&mut self, value: f64) {
        let capacity = self.slots.len();
        if self.len < capacity {
            self.slots[(self.head + self.len) % capacity] = value;
            self.len += 1;
        } else {
            self.slots[self.head] = value;
            self.head = (self.head + 1) % capacity;
        }
    }

    /// Most recently pushed value
    pub fn last(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.slots.len();
        Some(self.slots[(self.head + self.len - 1) % capacity])
    }

    /// Values from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let capacity = self.slots.len();
        (0..self.len).map(move |i| self.slots[(self.head + i) % capacity])
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
