//----------------------------------------
// Power result types
//----------------------------------------
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::estimator::types::EffectFit;

/// Settings for the bootstrap power simulator. `cores = 0` runs
/// replicates on the global rayon pool; any other value builds a
/// dedicated pool of that size. `patience` only matters when the
/// simulator drives a sample-size search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootSettings {
    pub n_sim: usize,
    pub seed: u64,
    pub cores: usize,
    pub patience: usize,
    pub max_failure_frac: f64,
}

impl Default for BootSettings {
    fn default() -> Self {
        Self {
            n_sim: 1000,
            seed: 24601,
            cores: 0,
            patience: 5,
            max_failure_frac: 0.1,
        }
    }
}

/// Cooperative cancellation flag. The bootstrap simulator checks it at
/// the start of each replicate; replicates already running finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One requested sample size with its closed-form power.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerRow {
    /// Subjects per sample unit (per arm, or per stratum for the
    /// stratified models)
    pub n_per_unit: usize,
    pub power: f64,
}

/// Analytic power summary: the pilot fit it is derived from plus one
/// row per requested sample size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerAnalysis {
    pub fit: EffectFit,
    pub alpha: f64,
    pub rows: Vec<PowerRow>,
    pub messages: Vec<String>,
}

/// One bootstrap-simulated sample size with replicate accounting.
/// `power` is the rejection fraction among replicates whose refit
/// succeeded; failed refits and cancelled replicates never enter the
/// denominator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootPowerRow {
    pub n_per_unit: usize,
    pub power: f64,
    pub n_requested: usize,
    pub n_fit_ok: usize,
    pub n_fit_failed: usize,
    pub n_skipped: usize,
    pub reliable: bool,
}

/// Bootstrap power summary across the requested sample sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootPowerAnalysis {
    pub fit: EffectFit,
    pub alpha: f64,
    pub rows: Vec<BootPowerRow>,
    pub messages: Vec<String>,
}

pub(crate) fn dropped_weight_message(fit: &EffectFit) -> Option<String> {
    if fit.n_dropped_weights > 0 {
        Some(format!(
            "{} subjects were dropped for undefined censoring weights",
            fit.n_dropped_weights
        ))
    } else {
        None
    }
}
