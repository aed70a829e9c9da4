use palette::Srgb;

use crate::color::{self, FloatColor};
use crate::histogram::WeightedPoint;

/// Replace each centroid with the weighted mean of the points assigned to it.
///
/// A centroid with no assigned weight keeps its previous position. Returns the
/// summed Euclidean distance the centroids moved.
pub(crate) fn recompute_centroids(points: &[WeightedPoint], centroids: &mut [FloatColor]) -> f64 {
    let mut sums = vec![[0.0f64; 3]; centroids.len()];
    let mut weights = vec![0u64; centroids.len()];

    for point in points {
        let w = point.weight as f64;
        let sum = &mut sums[point.cluster];
        sum[0] += point.color.red * w;
        sum[1] += point.color.green * w;
        sum[2] += point.color.blue * w;
        weights[point.cluster] += point.weight;
    }

    let mut movement = 0.0;
    for ((centroid, sum), &weight) in centroids.iter_mut().zip(&sums).zip(&weights) {
        if weight == 0 {
            continue;
        }
        let w = weight as f64;
        let mean = Srgb::new(sum[0] / w, sum[1] / w, sum[2] / w);
        movement += color::distance_squared(mean, *centroid).sqrt();
        *centroid = mean;
    }
    movement
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(v: f64, weight: u64, cluster: usize) -> WeightedPoint {
        let mut p = WeightedPoint::new(Srgb::new(v, v, v), weight);
        p.cluster = cluster;
        p
    }

    #[test]
    fn weighted_mean() {
        let points = [point(0.0, 3, 0), point(1.0, 1, 0), point(0.5, 2, 1)];
        let mut centroids = vec![Srgb::new(0.0, 0.0, 0.0), Srgb::new(0.5, 0.5, 0.5)];

        let movement = recompute_centroids(&points, &mut centroids);

        assert!((centroids[0].red - 0.25).abs() < 1e-12);
        assert!((centroids[1].green - 0.5).abs() < 1e-12);
        assert!((movement - (3.0f64 * 0.25 * 0.25).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_cluster_is_left_alone() {
        let points = [point(0.2, 1, 0), point(0.4, 1, 0)];
        let stale = Srgb::new(0.9, 0.1, 0.3);
        let mut centroids = vec![Srgb::new(0.0, 0.0, 0.0), stale];

        recompute_centroids(&points, &mut centroids);

        assert_eq!(centroids[1], stale);
        assert!((centroids[0].blue - 0.3).abs() < 1e-12);
    }
}
