use rand::Rng;

use crate::color::{self, FloatColor};
use crate::histogram::WeightedPoint;
use crate::quantize::assign::{self, Partition};
use crate::quantize::{seed, update};

/// Everything one attempt mutates. Built fresh for every attempt so that
/// assignments and seeding caches never leak between attempts.
pub(crate) struct AttemptState {
    points: Vec<WeightedPoint>,
    centroids: Vec<FloatColor>,
    partition: Partition,
    assigned: bool,
}

impl AttemptState {
    pub(crate) fn new(points: &[WeightedPoint], workers: usize) -> Self {
        let mut points = points.to_vec();
        points.iter_mut().for_each(WeightedPoint::reset);
        let partition = Partition::new(points.len(), workers);
        Self {
            points,
            centroids: Vec::new(),
            partition,
            assigned: false,
        }
    }

    pub(crate) fn seed<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) {
        self.centroids = seed::kmeans_plus_plus(&mut self.points, k, rng);
        self.assigned = false;
    }

    /// One assignment round; returns the number of points that changed cluster.
    pub(crate) fn assign(&mut self) -> usize {
        let changed = assign::assign(
            &mut self.points,
            &self.centroids,
            &self.partition,
            !self.assigned,
        );
        self.assigned = true;
        changed
    }

    /// Returns the total centroid movement.
    pub(crate) fn update_centroids(&mut self) -> f64 {
        update::recompute_centroids(&self.points, &mut self.centroids)
    }

    pub(crate) fn error(&self) -> f64 {
        weighted_error(&self.points, &self.centroids)
    }

    pub(crate) fn centroids(&self) -> &[FloatColor] {
        &self.centroids
    }

    #[cfg(test)]
    pub(crate) fn points(&self) -> &[WeightedPoint] {
        &self.points
    }
}

/// Sum over all points of `weight * distance` to the assigned centroid.
pub(crate) fn weighted_error(points: &[WeightedPoint], centroids: &[FloatColor]) -> f64 {
    points
        .iter()
        .map(|p| color::distance_squared(p.color, centroids[p.cluster]).sqrt() * p.weight as f64)
        .sum()
}

#[cfg(test)]
pub(crate) fn weighted_squared_error(points: &[WeightedPoint], centroids: &[FloatColor]) -> f64 {
    points
        .iter()
        .map(|p| color::distance_squared(p.color, centroids[p.cluster]) * p.weight as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Srgb;
    use rand::SeedableRng;
    use rand_xoshiro::Xoroshiro128PlusPlus;

    fn random_points(rng: &mut Xoroshiro128PlusPlus, n: usize) -> Vec<WeightedPoint> {
        (0..n)
            .map(|_| {
                let color = Srgb::new(rng.random(), rng.random(), rng.random());
                WeightedPoint::new(color, rng.random_range(1..20))
            })
            .collect()
    }

    #[test]
    fn squared_error_never_increases_between_rounds() {
        for seed in 0..50 {
            let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
            let n = rng.random_range(8..60);
            let k = rng.random_range(2..6);
            let points = random_points(&mut rng, n);

            let mut state = AttemptState::new(&points, 3);
            state.seed(k, &mut rng);

            // Assignment and the mean update each minimize the weighted sum of
            // squared distances for the other half held fixed. The ranking score
            // weights the unsquared distance and can rise between rounds.
            let mut previous = f64::INFINITY;
            for _ in 0..100 {
                let changed = state.assign();
                let error = weighted_squared_error(state.points(), state.centroids());
                assert!(error <= previous + 1e-9, "seed {seed}: {error} > {previous}");
                previous = error;
                if changed == 0 {
                    break;
                }
                state.update_centroids();
                let error = weighted_squared_error(state.points(), state.centroids());
                assert!(error <= previous + 1e-9, "seed {seed}: {error} > {previous}");
                previous = error;
            }
        }
    }

    #[test]
    fn first_round_counts_every_point() {
        let points = vec![WeightedPoint::new(Srgb::new(0.2, 0.2, 0.2), 1); 6];
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
        let mut state = AttemptState::new(&points, 4);
        state.seed(1, &mut rng);

        assert_eq!(state.assign(), 6);
        assert_eq!(state.assign(), 0);
    }

    #[test]
    fn fresh_state_resets_points() {
        let mut dirty = WeightedPoint::new(Srgb::new(0.1, 0.2, 0.3), 4);
        dirty.cluster = 3;
        dirty.distance = 0.0;

        let state = AttemptState::new(&[dirty], 1);
        assert_eq!(state.points()[0].cluster(), 0);
        assert_eq!(state.points()[0].distance, f64::MAX);
    }

    #[test]
    fn error_weights_distance() {
        let mut far = WeightedPoint::new(Srgb::new(1.0, 0.0, 0.0), 3);
        far.cluster = 0;
        let near = WeightedPoint::new(Srgb::new(0.0, 0.0, 0.0), 10);
        let centroids = [Srgb::new(0.0, 0.0, 0.0)];

        assert!((weighted_error(&[far, near], &centroids) - 3.0).abs() < 1e-12);
    }
}
