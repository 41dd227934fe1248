//! Small utilities to manage bounded history buffers for charts.

use std::collections::VecDeque;

/// Points kept per traffic series.
pub const TRAFFIC_WINDOW: usize = 20;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    while dq.len() >= cap.max(1) {
        dq.pop_front();
    }
    dq.push_back(v);
}

#[derive(Debug, Clone, PartialEq)]
pub struct TracePoint {
    pub label: String,
    pub value: f64,
}

// One chart series: a FIFO window of labelled samples
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    points: VecDeque<TracePoint>,
    cap: usize,
}

impl TraceBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, label: String, value: f64) {
        push_capped(&mut self.points, TracePoint { label, value }, self.cap);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TracePoint> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.back().map(|p| p.value)
    }

    pub fn peak(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }

    /// Chart coordinates: x is the slot index inside the window.
    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.value))
            .collect()
    }
}

/// Sent/received series that always advance together.
#[derive(Debug, Clone)]
pub struct TrafficTraces {
    pub sent: TraceBuffer,
    pub received: TraceBuffer,
}

impl TrafficTraces {
    pub fn new(cap: usize) -> Self {
        Self {
            sent: TraceBuffer::new(cap),
            received: TraceBuffer::new(cap),
        }
    }

    pub fn push(&mut self, label: String, sent: f64, received: f64) {
        self.sent.push(label.clone(), sent);
        self.received.push(label, received);
    }

    pub fn first_label(&self) -> Option<&str> {
        self.sent.points.front().map(|p| p.label.as_str())
    }

    pub fn last_label(&self) -> Option<&str> {
        self.sent.points.back().map(|p| p.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_capped_evicts_oldest() {
        let mut dq = VecDeque::new();
        for i in 0..5 {
            push_capped(&mut dq, i, 3);
        }
        assert_eq!(dq, VecDeque::from(vec![2, 3, 4]));
    }

    #[test]
    fn traffic_window_never_exceeds_cap() {
        let mut t = TrafficTraces::new(TRAFFIC_WINDOW);
        for i in 0..57 {
            t.push(format!("t{i}"), i as f64, (i * 2) as f64);
            assert!(t.sent.len() <= TRAFFIC_WINDOW);
            assert!(t.received.len() <= TRAFFIC_WINDOW);
        }
        assert_eq!(t.sent.len(), TRAFFIC_WINDOW);
        // 57 pushes, window of 20: the first survivor is sample 37
        assert_eq!(t.first_label(), Some("t37"));
        assert_eq!(t.last_label(), Some("t56"));
        assert_eq!(t.sent.latest(), Some(56.0));
        assert_eq!(t.received.peak(), 112.0);
    }

    #[test]
    fn xy_indexes_from_zero() {
        let mut b = TraceBuffer::new(3);
        b.push("a".into(), 1.0);
        b.push("b".into(), 4.0);
        assert_eq!(b.xy(), vec![(0.0, 1.0), (1.0, 4.0)]);
    }
}
