/// Bounded max-heap used by the k-nearest queries.
///
/// Keeps the `k` best results seen so far; the worst of them sits on top
/// and doubles as the branch-and-bound pruning distance.
/// Ties on distance are broken by id so every structure returns the same set.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use super::entity::QueryResult;

struct Candidate(QueryResult);

impl Candidate {
    fn key_cmp(a: &QueryResult, b: &QueryResult) -> Ordering {
        a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: larger distance = higher priority
        Candidate::key_cmp(&self.0, &other.0)
    }
}

pub(crate) struct KNearest {
    k: usize,
    heap: BinaryHeap<Candidate>,
}

impl KNearest {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.min(1024)),
        }
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// Current pruning distance: infinite until `k` results are held.
    pub fn bound(&self) -> f32 {
        if self.is_full() {
            self.heap.peek().map_or(f32::INFINITY, |c| c.0.distance)
        } else {
            f32::INFINITY
        }
    }

    pub fn offer(&mut self, result: QueryResult) {
        if self.k == 0 {
            return;
        }
        if !self.is_full() {
            self.heap.push(Candidate(result));
            return;
        }
        let replace = self
            .heap
            .peek()
            .is_some_and(|top| Candidate::key_cmp(&result, &top.0) == Ordering::Less);
        if replace {
            self.heap.pop();
            self.heap.push(Candidate(result));
        }
    }

    /// Results in ascending distance order
    pub fn into_sorted_vec(self) -> Vec<QueryResult> {
        self.heap.into_sorted_vec().into_iter().map(|c| c.0).collect()
    }
}

#[cfg(test)]
#[path = "knn_tests.rs"]
mod tests;
