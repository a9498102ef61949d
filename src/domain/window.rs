//! Sample Window
//!
//! Fixed-capacity ring buffers holding the most recent spread observations.
//! Three parallel buffers (open spread, close spread, timestamp) share one
//! head/length pair, so a single insert stays O(1) and the window never
//! reallocates after construction.

/// Bounded history of spread observations.
///
/// Occupancy grows to `capacity` and then cycles forever: once full, each
/// insert overwrites the oldest slot (strict FIFO). Values are stored as
/// plain percentages; timestamps are epoch milliseconds.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    capacity: usize,
    open_spreads: Vec<f64>,
    close_spreads: Vec<f64>,
    timestamps: Vec<i64>,
    /// Index of the oldest slot (also the next write position once full)
    head: usize,
    len: usize,
}

impl SampleWindow {
    /// Create an empty window with the given fixed capacity.
    ///
    /// Capacity must be validated by the caller; the window itself assumes
    /// `capacity > 0`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            open_spreads: Vec::with_capacity(capacity),
            close_spreads: Vec::with_capacity(capacity),
            timestamps: Vec::with_capacity(capacity),
            head: 0,
            len: 0,
        }
    }

    /// Append one observation, evicting the oldest when full.
    pub fn record(&mut self, open_spread: f64, close_spread: f64, timestamp: i64) {
        if self.len < self.capacity {
            self.open_spreads.push(open_spread);
            self.close_spreads.push(close_spread);
            self.timestamps.push(timestamp);
            self.len += 1;
        } else {
            self.open_spreads[self.head] = open_spread;
            self.close_spreads[self.head] = close_spread;
            self.timestamps[self.head] = timestamp;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Number of observations currently held, never above capacity.
    pub fn occupancy(&self) -> usize {
        self.len
    }

    /// Fixed capacity chosen at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the window has reached full capacity.
    pub fn is_saturated(&self) -> bool {
        self.len == self.capacity
    }

    /// Open-spread values currently held, in storage order.
    ///
    /// Slot order is unspecified (the ring overwrites in place); callers
    /// computing order-independent statistics can use the slice directly.
    pub fn open_values(&self) -> &[f64] {
        &self.open_spreads[..self.len]
    }

    /// Close-spread values currently held, in storage order.
    pub fn close_values(&self) -> &[f64] {
        &self.close_spreads[..self.len]
    }

    /// Timestamp of the oldest held observation, if any.
    pub fn first_timestamp(&self) -> Option<i64> {
        if self.len == 0 {
            return None;
        }
        let oldest = if self.len < self.capacity { 0 } else { self.head };
        Some(self.timestamps[oldest])
    }

    /// Timestamp of the newest held observation, if any.
    pub fn last_timestamp(&self) -> Option<i64> {
        if self.len == 0 {
            return None;
        }
        let newest = if self.len < self.capacity {
            self.len - 1
        } else {
            (self.head + self.capacity - 1) % self.capacity
        };
        Some(self.timestamps[newest])
    }

    /// Elapsed milliseconds between the oldest and newest observations.
    ///
    /// Defined only once the window is saturated; before that the span is
    /// reported as 0 rather than a partial duration.
    pub fn window_span_ms(&self) -> i64 {
        if !self.is_saturated() {
            return 0;
        }
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(window: &mut SampleWindow, n: usize) {
        for i in 0..n {
            window.record(i as f64, i as f64 * 2.0, 1_000 + i as i64);
        }
    }

    #[test]
    fn test_empty_window() {
        let window = SampleWindow::new(5);
        assert_eq!(window.occupancy(), 0);
        assert!(!window.is_saturated());
        assert_eq!(window.first_timestamp(), None);
        assert_eq!(window.last_timestamp(), None);
        assert_eq!(window.window_span_ms(), 0);
    }

    #[test]
    fn test_occupancy_capped_at_capacity() {
        let mut window = SampleWindow::new(5);
        fill(&mut window, 12);
        assert_eq!(window.occupancy(), 5);
        assert_eq!(window.capacity(), 5);
        assert!(window.is_saturated());
    }

    #[test]
    fn test_fifo_eviction() {
        let mut window = SampleWindow::new(3);
        fill(&mut window, 3);
        assert!(window.open_values().contains(&0.0));

        // One more insert pushes out the first value
        window.record(99.0, 99.0, 2_000);
        assert_eq!(window.occupancy(), 3);
        assert!(!window.open_values().contains(&0.0));
        assert!(window.open_values().contains(&99.0));
        assert!(window.close_values().contains(&99.0));
    }

    #[test]
    fn test_parallel_buffers_stay_aligned() {
        let mut window = SampleWindow::new(2);
        window.record(1.0, 10.0, 100);
        window.record(2.0, 20.0, 200);
        window.record(3.0, 30.0, 300);

        assert_eq!(window.open_values().len(), window.close_values().len());
        assert!(window.open_values().contains(&3.0));
        assert!(window.close_values().contains(&30.0));
        assert!(!window.open_values().contains(&1.0));
        assert!(!window.close_values().contains(&10.0));
    }

    #[test]
    fn test_span_zero_before_saturation() {
        let mut window = SampleWindow::new(10);
        fill(&mut window, 9);
        assert_eq!(window.window_span_ms(), 0);
    }

    #[test]
    fn test_span_after_saturation() {
        let mut window = SampleWindow::new(4);
        window.record(0.0, 0.0, 1_000);
        window.record(0.0, 0.0, 1_100);
        window.record(0.0, 0.0, 1_250);
        window.record(0.0, 0.0, 1_500);
        assert_eq!(window.window_span_ms(), 500);

        // Eviction moves the oldest edge forward
        window.record(0.0, 0.0, 1_900);
        assert_eq!(window.first_timestamp(), Some(1_100));
        assert_eq!(window.last_timestamp(), Some(1_900));
        assert_eq!(window.window_span_ms(), 800);
    }
}
