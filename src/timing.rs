//! Wall-clock timing of full passes over the sampled patches.
//!
//! The loop mirrors an interactive `timeit`: `repeats` runs of `loops` passes each,
//! no warm-up, and nothing done about the page cache between loaders.

use std::fmt;
use std::hint::black_box;
use std::time::Instant;

use anyhow::{ensure, Result};
use log::debug;
use statrs::statistics::{Data, Distribution};

use crate::manifest::PatchId;

#[derive(Clone, Debug)]
pub struct TimingReport {
    pub label: String,
    pub patches: usize,
    pub loops: usize,
    /// Seconds per pass, one entry per run.
    pub pass_secs: Vec<f64>,
    pub mean_secs: f64,
    pub std_dev_secs: f64,
}

impl TimingReport {
    fn from_passes(label: &str, patches: usize, loops: usize, pass_secs: Vec<f64>) -> Self {
        let data = Data::new(pass_secs.clone());
        let mean_secs = data.mean().unwrap_or(f64::NAN);
        // a single run has no spread
        let std_dev_secs = data.std_dev().filter(|s| s.is_finite()).unwrap_or(0.0);
        Self {
            label: label.to_string(),
            patches,
            loops,
            pass_secs,
            mean_secs,
            std_dev_secs,
        }
    }

    pub fn runs(&self) -> usize {
        self.pass_secs.len()
    }

    pub fn patches_per_sec(&self) -> f64 {
        if self.mean_secs > 0.0 {
            self.patches as f64 / self.mean_secs
        } else {
            f64::INFINITY
        }
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ± {} per loop (mean ± std. dev. of {} run{}, {} loop{} each), {:.1} patches/s",
            self.label,
            format_seconds(self.mean_secs),
            format_seconds(self.std_dev_secs),
            self.runs(),
            if self.runs() == 1 { "" } else { "s" },
            self.loops,
            if self.loops == 1 { "" } else { "s" },
            self.patches_per_sec(),
        )
    }
}

/// Time `repeats` runs of `loops` full passes of `load` over `ids`.
///
/// The first loader error aborts the measurement.
pub fn time_passes<T, F>(label: &str, ids: &[PatchId], repeats: usize, loops: usize, mut load: F) -> Result<TimingReport>
where
    F: FnMut(&PatchId) -> Result<T>,
{
    ensure!(repeats >= 1, "need at least one run, got {}", repeats);
    ensure!(loops >= 1, "need at least one loop per run, got {}", loops);

    let mut pass_secs = Vec::with_capacity(repeats);
    for run in 0..repeats {
        let start = Instant::now();
        for _ in 0..loops {
            for id in ids {
                black_box(load(id)?);
            }
        }
        let per_pass = start.elapsed().as_secs_f64() / loops as f64;
        debug!("{} run #{} => {:.6} s per pass", label, run + 1, per_pass);
        pass_secs.push(per_pass);
    }
    Ok(TimingReport::from_passes(label, ids.len(), loops, pass_secs))
}

/// Render a duration in the largest unit that keeps it at or above one.
pub fn format_seconds(secs: f64) -> String {
    if !secs.is_finite() {
        return format!("{} s", secs);
    }
    let (value, unit) = if secs >= 1.0 || secs == 0.0 {
        (secs, "s")
    } else if secs >= 1e-3 {
        (secs * 1e3, "ms")
    } else if secs >= 1e-6 {
        (secs * 1e6, "µs")
    } else {
        (secs * 1e9, "ns")
    };
    format!("{:.3} {}", value, unit)
}
