//----------------------------------------
// effect estimator types
//----------------------------------------
use crate::stats::normal::two_sided_p_value;
use serde::{Deserialize, Serialize};

/// The five effect-model variants. All of them estimate one arm
/// coefficient on the restricted-mean-survival scale; they differ in
/// weighting, stratification, and outcome transform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Weighted regression of min(T, L) on arm and linear terms
    Linear,
    /// Stratum-centered weighted regression, additive effect
    AdditiveStratified,
    /// Stratum-centered weighted regression of ln(min(T, L)); a
    /// log-linear surrogate for the iterative multiplicative estimator
    MultiplicativeStratified,
    /// Jackknife pseudo-value regression with smooth covariate terms
    GamPseudoObs,
    /// Linear model with multi-cause censoring weights and a
    /// hazard-corrected robust variance
    DependentCensoring,
}

impl ModelKind {
    pub fn requires_strata(&self) -> bool {
        matches!(
            self,
            ModelKind::AdditiveStratified | ModelKind::MultiplicativeStratified
        )
    }

    pub fn sample_unit(&self) -> SampleUnit {
        if self.requires_strata() {
            SampleUnit::PerStratum
        } else {
            SampleUnit::PerArm
        }
    }
}

/// What one unit of the sample-size axis means for a fitted model.
/// Stratified designs are sized per stratum, everything else per arm
/// under equal allocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleUnit {
    PerArm,
    PerStratum,
}

/// Treatment-effect estimate from one pilot-data fit. `variance_unit`
/// is calibrated so that the standard error at a design with N
/// subjects per sample unit is sqrt(variance_unit / N).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectFit {
    pub coefficient: f64,
    pub variance_unit: f64,
    /// Standard error at the pilot sample itself
    pub standard_error: f64,
    /// Two-sided p-value for the arm coefficient, normal reference
    pub p_value: f64,
    /// Subjects entering the regression
    pub n_used: usize,
    /// Outcome-complete subjects excluded for undefined weights
    pub n_dropped_weights: usize,
    pub sample_unit: SampleUnit,
}

impl EffectFit {
    /// Assembles the reported estimate from the arm coefficient and its
    /// pilot-level robust variance. `n_units` is how many sample units
    /// the pilot frame of `n_frame` subjects represents (2 arms, or the
    /// stratum count), which calibrates variance_unit so that
    /// sqrt(variance_unit / N) is the standard error of a design with N
    /// subjects per unit.
    pub(crate) fn from_arm_estimate(
        coefficient: f64,
        var_pilot: f64,
        n_frame: usize,
        n_units: f64,
        sample_unit: SampleUnit,
        n_used: usize,
        n_dropped_weights: usize,
    ) -> EffectFit {
        let standard_error = var_pilot.max(0.0).sqrt();
        let p_value = if standard_error > 0.0 {
            two_sided_p_value(coefficient / standard_error)
        } else if coefficient == 0.0 {
            1.0
        } else {
            0.0
        };
        EffectFit {
            coefficient,
            variance_unit: var_pilot.max(0.0) * n_frame as f64 / n_units,
            standard_error,
            p_value,
            n_used,
            n_dropped_weights,
            sample_unit,
        }
    }
}
