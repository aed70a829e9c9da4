use rand::Rng;

use crate::color::{self, FloatColor};
use crate::histogram::WeightedPoint;

/// k-means++ seeding.
///
/// Chosen points are swapped into the prefix `points[..k]`, so a point can
/// never be drawn twice. Each unchosen point keeps the smallest squared
/// distance seen to any chosen centroid in `WeightedPoint::distance`; only the
/// most recent centroid has to be measured per round. The caches must be
/// reset before calling.
///
/// Returns the colors of the chosen points, at most `points.len()` of them.
pub(crate) fn kmeans_plus_plus<R: Rng + ?Sized>(
    points: &mut [WeightedPoint],
    k: usize,
    rng: &mut R,
) -> Vec<FloatColor> {
    let n = points.len();
    let k = k.min(n);
    if k == 0 {
        return Vec::new();
    }

    points.swap(0, rng.random_range(0..n));

    for chosen in 1..k {
        let latest = points[chosen - 1].color;

        let mut sum = 0.0;
        for point in &mut points[chosen..] {
            let distance = color::distance_squared(point.color, latest);
            if distance < point.distance {
                point.distance = distance;
            }
            sum += point.distance;
        }

        let threshold = rng.random::<f64>() * sum;

        // Rounding can keep the running sum from ever passing the threshold.
        let mut next = n - 1;
        let mut running = 0.0;
        for (i, point) in points.iter().enumerate().skip(chosen) {
            running += point.distance;
            if running > threshold {
                next = i;
                break;
            }
        }

        points.swap(chosen, next);
    }

    points[..k].iter().map(|p| p.color).collect()
}
