//----------------------------------------
// search types
//----------------------------------------
use serde::{Deserialize, Serialize};

use crate::error::RmstPowerErr;
use crate::estimator::types::EffectFit;
use crate::search::error::SearchErr;

/// Settings for the iterative sample-size search. Candidates run from
/// `n_start` upward in increments of `n_step`, never past
/// `max_n_per_arm` (read per stratum for the stratified models).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    pub target_power: f64,
    pub n_start: usize,
    pub n_step: usize,
    pub max_n_per_arm: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            target_power: 0.8,
            n_start: 10,
            n_step: 10,
            max_n_per_arm: 1000,
        }
    }
}

impl SearchSettings {
    pub(crate) fn validate(&self) -> Result<(), RmstPowerErr> {
        if self.n_step == 0 {
            return Err(SearchErr::ZeroStep.into());
        }
        if self.n_start == 0 {
            return Err(SearchErr::ZeroStart.into());
        }
        if self.n_start > self.max_n_per_arm {
            return Err(SearchErr::StartBeyondMax {
                start: self.n_start,
                max: self.max_n_per_arm,
            }
            .into());
        }
        if !(self.target_power > 0.0 && self.target_power < 1.0) {
            return Err(SearchErr::TargetOutOfBounds(self.target_power).into());
        }
        Ok(())
    }
}

/// Terminal state of a sample-size search. Exhaustion and stalling are
/// reported here rather than as errors so callers can still read the
/// best attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// Smallest candidate whose power met the target
    Succeeded,
    /// Candidate grid exhausted below the target; best attempt reported
    ExhaustedMaxN,
    /// Power stopped improving for `patience` consecutive candidates
    Stalled,
}

/// One evaluated candidate, in evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStep {
    pub n_per_unit: usize,
    pub power: f64,
}

/// Kernel-level outcome before the pilot fit and diagnostics are
/// attached.
#[derive(Debug)]
pub(crate) struct SearchOutcome {
    pub status: SearchStatus,
    pub n_per_unit: usize,
    pub power: f64,
    pub steps: Vec<SearchStep>,
}

/// Search result reported to callers: terminal status, the sample size
/// and power it settled on, the pilot fit behind the power oracle, and
/// the full evaluation trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSizeResult {
    pub status: SearchStatus,
    pub n_per_unit: usize,
    pub power: f64,
    pub fit: EffectFit,
    pub steps: Vec<SearchStep>,
    pub messages: Vec<String>,
}

/// Running search position; owned by the kernel and destroyed when the
/// search returns.
#[derive(Debug)]
pub(crate) struct SearchState {
    pub current_n: usize,
    pub best_power: f64,
    pub best_n: usize,
    pub stagnation: usize,
}
