//! Progress reporting for long palette runs.

use std::time::Duration;

use log::{debug, info};

/// Snapshot emitted after every refinement step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub attempt: usize,
    pub max_attempts: usize,
    pub step: usize,
    pub max_steps: usize,
    /// Summed centroid movement of the step, zero on the converging step.
    pub movement: f64,
    pub changed: usize,
    pub elapsed: Duration,
    /// Estimate assuming every remaining attempt uses its full step budget.
    pub remaining: Duration,
}

/// Receives progress from the quantizer. Purely advisory.
pub trait Progress {
    fn step(&mut self, report: &StepReport);

    fn attempt_finished(&mut self, _attempt: usize, _error: f64) {}
}

impl<F> Progress for F
where
    F: FnMut(&StepReport),
{
    fn step(&mut self, report: &StepReport) {
        self(report)
    }
}

/// Writes progress through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn step(&mut self, r: &StepReport) {
        debug!(
            "Att {:2} / {} | Step {:4} / {} | Dist {:10.5} | Ch {:10} | El {} | Rem {}",
            r.attempt,
            r.max_attempts,
            r.step,
            r.max_steps,
            r.movement,
            r.changed,
            format_duration(r.elapsed),
            format_duration(r.remaining),
        );
    }

    fn attempt_finished(&mut self, attempt: usize, error: f64) {
        info!("Attempt {attempt} finished with error {error:.5}");
    }
}

/// Format as `hh h mm m ss s`, blanking leading zero units.
pub fn format_duration(duration: Duration) -> String {
    let total = (duration.as_secs_f64().round()) as u64;
    let (h, m, s) = (total / 3600, total / 60 % 60, total % 60);

    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{h:2} h "));
    } else {
        out.push_str("     ");
    }
    if m > 0 {
        out.push_str(&format!("{m:2} m "));
    } else {
        out.push_str("     ");
    }
    out.push_str(&format!("{s:2} s"));
    out
}

/// Estimate the time left given how many of `total` steps took `elapsed`.
pub(crate) fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Duration {
    if done == 0 {
        return Duration::ZERO;
    }
    elapsed.mul_f64(total.saturating_sub(done) as f64 / done as f64)
}

/// Wall clock that degrades to zero where `Instant` is unavailable.
pub(crate) struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
}

impl Stopwatch {
    pub(crate) fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed()
        }
        #[cfg(target_arch = "wasm32")]
        {
            Duration::ZERO
        }
    }
}
