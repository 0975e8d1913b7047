//! Priority queue for chunk generation based on distance to the viewer

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::voxel::chunk::ChunkCoord;

/// Priority step function of Chebyshev distance (lower is served first).
///
/// The three nearest rings get their own levels; farther chunks get `3 + d`.
pub fn priority_for_distance(distance: i32) -> u32 {
    match distance {
        d if d <= 0 => 0,
        1 => 1,
        2 => 2,
        d => 3 + d as u32,
    }
}

/// A chunk waiting to be generated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationJob {
    pub coord: ChunkCoord,
    pub priority: u32,
    /// Enqueue order; breaks priority ties first-in first-out
    pub timestamp: u64,
}

impl Ord for GenerationJob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.timestamp.cmp(&other.timestamp))
            .then(self.coord.cmp(&other.coord))
    }
}

impl PartialOrd for GenerationJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of generation jobs keyed by `(priority, timestamp)`
#[derive(Default)]
pub struct JobQueue {
    heap: BinaryHeap<Reverse<GenerationJob>>,
    next_timestamp: u64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `coord` at `priority`. O(log n).
    ///
    /// Does not check for an existing job at `coord`; callers `remove` first
    /// when re-prioritizing.
    pub fn push(&mut self, coord: ChunkCoord, priority: u32) -> GenerationJob {
        let job = GenerationJob { coord, priority, timestamp: self.next_timestamp };
        self.next_timestamp += 1;
        self.heap.push(Reverse(job));
        job
    }

    /// Put a job back with its original timestamp.
    pub fn requeue(&mut self, job: GenerationJob) {
        self.heap.push(Reverse(job));
    }

    /// Most urgent job. O(log n).
    pub fn pop(&mut self) -> Option<GenerationJob> {
        self.heap.pop().map(|Reverse(job)| job)
    }

    pub fn peek(&self) -> Option<&GenerationJob> {
        self.heap.peek().map(|Reverse(job)| job)
    }

    /// Remove every job for `coord`. O(n). Returns whether one was found.
    pub fn remove(&mut self, coord: ChunkCoord) -> bool {
        let before = self.heap.len();
        self.heap.retain(|Reverse(job)| job.coord != coord);
        self.heap.len() != before
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.heap.iter().any(|Reverse(job)| job.coord == coord)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
