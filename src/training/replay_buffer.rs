use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::ai::Transition;

/// Fixed-capacity ring buffer of transitions. When full, the oldest entry is
/// overwritten by the newest.
pub struct ReplayBuffer {
    buffer: Vec<Transition>,
    capacity: usize,
    position: usize,
    rng: StdRng,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_os_rng())
    }

    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: StdRng) -> Self {
        assert!(capacity > 0, "replay capacity must be > 0");
        ReplayBuffer {
            buffer: Vec::with_capacity(capacity),
            capacity,
            position: 0,
            rng,
        }
    }

    /// Add a transition. Overwrites the oldest when full.
    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(transition);
        } else {
            self.buffer[self.position] = transition;
        }
        self.position = (self.position + 1) % self.capacity;
    }

    /// Sample `batch_size` distinct transitions.
    pub fn sample(&mut self, batch_size: usize) -> Vec<Transition> {
        let len = self.buffer.len();
        assert!(batch_size <= len, "Not enough transitions to sample");
        let indices = index::sample(&mut self.rng, len, batch_size);
        indices.iter().map(|i| self.buffer[i].clone()).collect()
    }

    /// Sample `min(batch_size, len)` distinct transitions; empty when the
    /// buffer is empty.
    pub fn sample_up_to(&mut self, batch_size: usize) -> Vec<Transition> {
        let n = batch_size.min(self.len());
        if n == 0 {
            return Vec::new();
        }
        self.sample(n)
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        // `position` is the oldest slot once the buffer has wrapped
        let split = if self.buffer.len() < self.capacity {
            0
        } else {
            self.position
        };
        self.buffer[split..].iter().chain(self.buffer[..split].iter())
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

    fn transition(tag: usize) -> Transition {
        Transition {
            observation: vec![-1.0; 4],
            action: tag,
            reward: 10.0,
            next_observation: vec![0.0; 4],
            terminal: false,
        }
    }

    fn actions(buf: &ReplayBuffer) -> Vec<usize> {
        buf.iter().map(|t| t.action).collect()
    }

    #[test]
    fn test_push_and_len() {
        let mut buf = ReplayBuffer::new(10);
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());

        buf.push(transition(0));
        assert_eq!(buf.len(), 1);

        for i in 1..10 {
            buf.push(transition(i));
        }
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn test_capacity_three_keeps_newest() {
        let mut buf = ReplayBuffer::new(3);
        for i in 1..=4 {
            buf.push(transition(i));
        }
        assert_eq!(actions(&buf), vec![2, 3, 4]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buf = ReplayBuffer::new(5);
        for i in 0..=5 {
            buf.push(transition(i));
            assert!(buf.len() <= buf.capacity());
        }
        let kept = actions(&buf);
        assert!(!kept.contains(&0), "oldest should be evicted");
        assert_eq!(kept.last(), Some(&5));

        for i in 6..23 {
            buf.push(transition(i));
        }
        assert_eq!(actions(&buf), vec![18, 19, 20, 21, 22]);
    }

    #[test]
    fn test_iter_before_wrap_is_insertion_order() {
        let mut buf = ReplayBuffer::new(8);
        for i in 0..3 {
            buf.push(transition(i));
        }
        assert_eq!(actions(&buf), vec![0, 1, 2]);
    }

    #[test]
    fn test_sample_is_without_replacement() {
        let mut buf = ReplayBuffer::with_seed(100, 5);
        for i in 0..50 {
            buf.push(transition(i));
        }
        let mut batch: Vec<usize> = buf.sample(50).iter().map(|t| t.action).collect();
        batch.sort_unstable();
        assert_eq!(batch, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_up_to_clamps() {
        let mut buf = ReplayBuffer::new(10);
        assert!(buf.sample_up_to(4).is_empty());

        buf.push(transition(0));
        buf.push(transition(1));
        assert_eq!(buf.sample_up_to(4).len(), 2);
        assert_eq!(buf.sample_up_to(1).len(), 1);
    }

    #[test]
    #[should_panic(expected = "Not enough transitions")]
    fn test_sample_too_many() {
        let mut buf = ReplayBuffer::new(10);
        buf.push(transition(0));
        buf.sample(5);
    }
}
