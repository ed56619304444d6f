use duet_core::CandidateInit;
use std::collections::VecDeque;

/// Remote candidates that arrived before the remote description, in arrival
/// order.
#[derive(Debug, Default)]
pub struct CandidateBuffer {
    queue: VecDeque<CandidateInit>,
}

impl CandidateBuffer {
    pub fn push(&mut self, candidate: CandidateInit) {
        self.queue.push_back(candidate);
    }

    /// Empties the buffer, oldest first.
    pub fn drain(&mut self) -> Vec<CandidateInit> {
        self.queue.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
