//! Palette quantization by weighted k-means.
//!
//! Each attempt seeds centroids with k-means++, then alternates parallel
//! nearest-centroid assignment with weighted-mean centroid updates until no
//! point changes cluster or the step budget runs out. A final assignment
//! pass lines the clusters up with the last centroids before the attempt is
//! scored. Several independent attempts are run and the one with the lowest
//! weighted error wins.
//!
//! ```
//! use palette::Srgb;
//! use texture_palette_wasm::{QuantizeOptions, quantize_textures};
//!
//! let texture = vec![Srgb::new(255u8, 0, 0), Srgb::new(0, 0, 255)];
//! let options = QuantizeOptions::new().colors(2).seed(1);
//! let result = quantize_textures([texture], &options).unwrap();
//! assert_eq!(result.palette().len(), 3);
//! ```

mod assign;
mod seed;
mod state;
mod update;

use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

use crate::color::IntColor;
use crate::error::{Error, Result};
use crate::histogram::{self, PointSet};
use crate::palette::Palette;
use crate::progress::{self, LogProgress, Progress, StepReport, Stopwatch};
use state::AttemptState;

/// Largest palette the quantizer will compute, not counting the reserved entry.
pub const MAX_COLORS: usize = 256;

/// Options for a quantization run.
///
/// ```
/// # use texture_palette_wasm::QuantizeOptions;
/// QuantizeOptions::new()
///     .colors(64)
///     .levels(4)
///     .max_steps(500)
///     .max_attempts(4)
///     .seed(42);
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizeOptions {
    colors: usize,
    levels: usize,
    max_steps: usize,
    max_attempts: usize,
    seed: Option<u64>,
    workers: Option<usize>,
}

impl QuantizeOptions {
    pub const fn new() -> Self {
        Self {
            colors: 16,
            levels: 1,
            max_steps: 1000,
            max_attempts: 10,
            seed: None,
            workers: None,
        }
    }

    /// Requested palette size, `1..=256`. Reduced to the number of distinct
    /// input colors when there are fewer.
    pub const fn colors(self, colors: usize) -> Self {
        Self { colors, ..self }
    }

    /// Brightness levels generated per input color, see [`histogram`].
    ///
    /// Only [`quantize_textures`] reads this, when it builds the histogram.
    /// The other entry points take a prepared [`PointSet`] whose levels are
    /// already expanded.
    pub const fn levels(self, levels: usize) -> Self {
        Self { levels, ..self }
    }

    /// Refinement steps per attempt.
    pub const fn max_steps(self, max_steps: usize) -> Self {
        Self { max_steps, ..self }
    }

    /// Independent attempts; at least one is always run.
    pub const fn max_attempts(self, max_attempts: usize) -> Self {
        Self { max_attempts, ..self }
    }

    /// Seed the random source for reproducible results.
    pub const fn seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    /// Number of assignment workers. Defaults to the rayon pool size.
    pub const fn workers(self, workers: usize) -> Self {
        Self {
            workers: Some(workers),
            ..self
        }
    }

    pub const fn get_colors(&self) -> usize {
        self.colors
    }

    pub const fn get_levels(&self) -> usize {
        self.levels
    }

    pub const fn get_max_steps(&self) -> usize {
        self.max_steps
    }

    pub const fn get_max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub const fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_COLORS).contains(&self.colors) {
            return Err(Error::InvalidParameter {
                name: "colors",
                value: self.colors.to_string(),
            });
        }
        Ok(())
    }

    fn rng(&self) -> Xoroshiro128PlusPlus {
        match self.seed {
            Some(seed) => Xoroshiro128PlusPlus::seed_from_u64(seed),
            None => Xoroshiro128PlusPlus::from_rng(&mut rand::rng()),
        }
    }
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Record of a palette size reduced to the number of distinct colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped {
    pub requested: usize,
    pub actual: usize,
}

/// Result of a quantization run.
#[derive(Debug, Clone)]
pub struct Quantized {
    palette: Palette,
    error: f64,
    best_attempt: usize,
    attempt_errors: Vec<f64>,
    clamped: Option<Clamped>,
}

impl Quantized {
    /// Palette of the best attempt, followed by the reserved entry.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn into_palette(self) -> Palette {
        self.palette
    }

    /// Weighted error of the best attempt.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// One-based number of the attempt that produced the palette.
    pub fn best_attempt(&self) -> usize {
        self.best_attempt
    }

    pub fn attempt_errors(&self) -> &[f64] {
        &self.attempt_errors
    }

    pub fn clamped(&self) -> Option<Clamped> {
        self.clamped
    }

    /// Palette entries computed by clustering, without the reserved entry.
    pub fn cluster_colors(&self) -> &[IntColor] {
        let colors = self.palette.colors();
        &colors[..colors.len().saturating_sub(1)]
    }
}

/// Build the histogram of `textures` and quantize it, logging progress.
pub fn quantize_textures<I, S>(textures: I, options: &QuantizeOptions) -> Result<Quantized>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[IntColor]>,
{
    options.validate()?;
    let points = histogram::build(textures, options.levels)?;
    quantize(&points, options)
}

/// Quantize a prepared point set, logging progress.
pub fn quantize(points: &PointSet, options: &QuantizeOptions) -> Result<Quantized> {
    quantize_with(points, options, &mut LogProgress)
}

/// Quantize a prepared point set, reporting progress to `progress`.
pub fn quantize_with<P: Progress + ?Sized>(
    points: &PointSet,
    options: &QuantizeOptions,
    progress: &mut P,
) -> Result<Quantized> {
    let mut rng = options.rng();
    quantize_with_rng(points, options, &mut rng, progress)
}

/// Quantize with an explicit random source. `options.seed` is ignored.
pub fn quantize_with_rng<R, P>(
    points: &PointSet,
    options: &QuantizeOptions,
    rng: &mut R,
    progress: &mut P,
) -> Result<Quantized>
where
    R: Rng + ?Sized,
    P: Progress + ?Sized,
{
    options.validate()?;
    if points.is_empty() {
        return Err(Error::InvalidInput);
    }

    let requested = options.colors;
    let k = requested.min(points.distinct_colors());
    let clamped = (k < requested).then(|| {
        warn!("Palette size reduced from {requested} to {k}: not enough distinct colors");
        Clamped {
            requested,
            actual: k,
        }
    });

    let workers = options.workers.unwrap_or_else(rayon::current_num_threads);
    let max_attempts = options.max_attempts.max(1);
    let max_steps = options.max_steps;
    let total_steps = max_steps * max_attempts;
    let clock = Stopwatch::start();

    let mut best: Option<(f64, usize, Palette)> = None;
    let mut attempt_errors = Vec::with_capacity(max_attempts);

    for attempt in 1..=max_attempts {
        let mut state = AttemptState::new(points.points(), workers);
        state.seed(k, rng);

        for step in 1..=max_steps {
            let changed = state.assign();
            let movement = if changed == 0 {
                0.0
            } else {
                state.update_centroids()
            };

            let elapsed = clock.elapsed();
            let done = step + (attempt - 1) * max_steps;
            progress.step(&StepReport {
                attempt,
                max_attempts,
                step,
                max_steps,
                movement,
                changed,
                elapsed,
                remaining: progress::estimate_remaining(elapsed, done, total_steps),
            });

            if changed == 0 {
                break;
            }
        }

        // The last update may have moved centroids after the last assignment.
        state.assign();
        let error = state.error();
        progress.attempt_finished(attempt, error);
        attempt_errors.push(error);

        if best.as_ref().is_none_or(|(best_error, _, _)| error < *best_error) {
            best = Some((error, attempt, Palette::from_centroids(state.centroids())));
        }
    }

    let Some((error, best_attempt, palette)) = best else {
        return Err(Error::InvalidInput);
    };
    info!("Most successful attempt is {best_attempt} (error {error:.5})");

    Ok(Quantized {
        palette,
        error,
        best_attempt,
        attempt_errors,
        clamped,
    })
}
