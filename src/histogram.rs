//! Weighted point set construction.
//!
//! Samples from any number of textures are counted per distinct color, then
//! every distinct color becomes one [`WeightedPoint`] at full brightness plus
//! `levels - 1` darker copies at `l / levels` brightness. Every copy carries
//! the full observed count of its source color.

use std::collections::HashMap;

use log::info;

use crate::color::{self, FloatColor, IntColor};
use crate::error::{Error, Result};

/// A distinct color and how often it was observed, plus the per-attempt
/// clustering state attached to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedPoint {
    pub color: FloatColor,
    pub weight: u64,
    /// Index of the centroid this point is assigned to.
    pub(crate) cluster: usize,
    /// Smallest squared distance to any centroid chosen so far while seeding.
    pub(crate) distance: f64,
}

impl WeightedPoint {
    pub fn new(color: FloatColor, weight: u64) -> Self {
        Self {
            color,
            weight,
            cluster: 0,
            distance: f64::MAX,
        }
    }

    pub fn cluster(&self) -> usize {
        self.cluster
    }

    /// Clear the assignment and seeding cache.
    pub(crate) fn reset(&mut self) {
        self.cluster = 0;
        self.distance = f64::MAX;
    }
}

/// The output of the histogram step, ready to be clustered.
#[derive(Clone, Debug)]
pub struct PointSet {
    points: Vec<WeightedPoint>,
    distinct_colors: usize,
    samples: u64,
}

impl PointSet {
    pub fn points(&self) -> &[WeightedPoint] {
        &self.points
    }

    /// Number of distinct colors observed, before brightness expansion.
    pub fn distinct_colors(&self) -> usize {
        self.distinct_colors
    }

    /// Number of samples ingested.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Sparse occurrence counter keyed by packed `0xRRGGBB`.
#[derive(Clone, Debug, Default)]
pub struct Histogram {
    counts: HashMap<u32, u64>,
    samples: u64,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every sample of one texture.
    pub fn add(&mut self, samples: &[IntColor]) {
        for &sample in samples {
            *self.counts.entry(color::pack(sample)).or_insert(0) += 1;
        }
        self.samples += samples.len() as u64;
    }

    pub fn distinct_colors(&self) -> usize {
        self.counts.len()
    }

    /// Expand the counted colors into weighted points.
    ///
    /// Points are emitted in ascending color order so that a seeded run does
    /// not depend on hash iteration order.
    pub fn into_points(self, levels: usize) -> Result<PointSet> {
        if levels == 0 {
            return Err(Error::InvalidParameter {
                name: "levels",
                value: levels.to_string(),
            });
        }

        let mut keys: Vec<u32> = self.counts.keys().copied().collect();
        keys.sort_unstable();

        info!("Total number of pure colors: {}", keys.len());

        let mut points = Vec::with_capacity(keys.len() * levels);
        for key in keys {
            let weight = self.counts[&key];
            let full = color::to_float(color::unpack(key));
            points.push(WeightedPoint::new(full, weight));
            for l in 1..levels {
                let k = l as f64 / levels as f64;
                points.push(WeightedPoint::new(color::scaled(full, k), weight));
            }
        }

        info!("Total number of all colors: {}", points.len());

        if points.is_empty() {
            return Err(Error::InvalidInput);
        }

        Ok(PointSet {
            points,
            distinct_colors: self.counts.len(),
            samples: self.samples,
        })
    }
}

/// Count `textures` and expand them with [`Histogram::into_points`].
pub fn build<I, S>(textures: I, levels: usize) -> Result<PointSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[IntColor]>,
{
    let mut histogram = Histogram::new();
    for texture in textures {
        histogram.add(texture.as_ref());
    }
    histogram.into_points(levels)
}
