use rayon::prelude::*;

use crate::color::{self, FloatColor};
use crate::histogram::WeightedPoint;

/// Static split of a point slice into one contiguous chunk per worker.
///
/// Every chunk holds `len / workers` points except the last, which also takes
/// the remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Partition {
    workers: usize,
    chunk_len: usize,
}

impl Partition {
    pub(crate) fn new(len: usize, workers: usize) -> Self {
        let workers = workers.clamp(1, len.max(1));
        Self {
            workers,
            chunk_len: len / workers,
        }
    }

    #[cfg(test)]
    pub(crate) fn workers(&self) -> usize {
        self.workers
    }

    /// Borrow `items` as disjoint mutable chunks.
    ///
    /// `items` must have the length the partition was built for.
    pub(crate) fn split<'a, T>(&self, mut items: &'a mut [T]) -> Vec<&'a mut [T]> {
        let mut chunks = Vec::with_capacity(self.workers);
        for _ in 1..self.workers {
            let (head, tail) = std::mem::take(&mut items).split_at_mut(self.chunk_len);
            chunks.push(head);
            items = tail;
        }
        chunks.push(items);
        chunks
    }
}

/// Move every point to its nearest centroid and return how many moved.
///
/// Chunks run in parallel; each worker counts its own changes and the counts
/// are summed once all workers have joined. When `first_round` is set every
/// point is counted, since it is receiving its first real assignment.
pub(crate) fn assign(
    points: &mut [WeightedPoint],
    centroids: &[FloatColor],
    partition: &Partition,
    first_round: bool,
) -> usize {
    partition
        .split(points)
        .into_par_iter()
        .map(|chunk| assign_chunk(chunk, centroids, first_round))
        .sum()
}

fn assign_chunk(chunk: &mut [WeightedPoint], centroids: &[FloatColor], first_round: bool) -> usize {
    let mut changed = 0;
    for point in chunk {
        let old = point.cluster;
        let mut best = old;
        let mut best_distance = color::distance_squared(point.color, centroids[old]);
        for (i, &centroid) in centroids.iter().enumerate() {
            let distance = color::distance_squared(point.color, centroid);
            if distance < best_distance {
                best_distance = distance;
                best = i;
            }
        }
        if best != old || first_round {
            point.cluster = best;
            changed += 1;
        }
    }
    changed
}
