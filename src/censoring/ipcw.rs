//----------------------------------------
// Inverse probability of censoring weights
//----------------------------------------
use crate::censoring::cox::CoxFit;
use crate::censoring::km::KaplanMeier;
use crate::censoring::types::CensoringWeights;
use crate::data::frame::ModelFrame;
use crate::error::RmstPowerErr;

/// Observation recoded against the truncation horizon. A subject whose
/// follow-up reaches the horizon has a fully known truncated outcome
/// (it is exactly the horizon), so it counts as outcome-complete even
/// when the raw status says censored.
#[derive(Debug, Clone)]
pub(crate) struct HorizonOutcome {
    /// min(observed time, horizon)
    pub obs_time: Vec<f64>,
    /// 1 when min(T, L) is known: an event before the horizon, or
    /// follow-up reaching it
    pub complete: Vec<u8>,
}

pub(crate) fn recode_for_horizon(time: &[f64], status: &[u8], horizon: f64) -> HorizonOutcome {
    let mut obs_time = Vec::with_capacity(time.len());
    let mut complete = Vec::with_capacity(time.len());
    for (&t, &s) in time.iter().zip(status.iter()) {
        if t >= horizon {
            obs_time.push(horizon);
            complete.push(1);
        } else {
            obs_time.push(t);
            complete.push(s);
        }
    }
    HorizonOutcome { obs_time, complete }
}

/// Single-cause weights: Kaplan-Meier of the censoring distribution on
/// the event/censoring-swapped recode, then 1 / G(Y) at each
/// outcome-complete subject's own time. A zero censoring-survival
/// estimate drops the subject with a diagnostic count instead of
/// producing an infinite weight.
pub(crate) fn single_cause_weights(frame: &ModelFrame, horizon: f64) -> CensoringWeights {
    let recoded = recode_for_horizon(&frame.time, &frame.status, horizon);
    let g = KaplanMeier::fit_censoring(&recoded.obs_time, &recoded.complete);

    let mut weights = vec![];
    let mut retained = vec![];
    let mut n_dropped = 0usize;
    for i in 0..frame.n() {
        if recoded.complete[i] != 1 {
            continue;
        }
        let surv = g.survival_at(recoded.obs_time[i]);
        if surv > 0.0 {
            weights.push(1.0 / surv);
            retained.push(i);
        } else {
            n_dropped += 1;
        }
    }
    if n_dropped > 0 {
        tracing::warn!(
            n_dropped,
            "subjects with undefined censoring weight excluded from regression"
        );
    }
    CensoringWeights {
        weights,
        retained,
        n_dropped,
    }
}

/// One fitted censoring-cause hazard model plus the cause indicator it
/// was fit to, kept around so the dependent-censoring variance can
/// reconstruct each subject's contribution to the estimated hazards.
#[derive(Debug, Clone)]
pub(crate) struct CauseSpecificModel {
    pub fit: CoxFit,
    pub cause_event: Vec<u8>,
}

#[derive(Debug, Clone)]
pub(crate) struct MultiCauseWeights {
    pub weights: CensoringWeights,
    pub models: Vec<CauseSpecificModel>,
    /// Covariate columns the hazard models condition on (arm followed
    /// by the linear terms), one row set shared by all causes
    pub hazard_covariates: Vec<Vec<f64>>,
}

/// Multi-cause weights for dependent censoring: one cause-specific
/// proportional-hazards fit per censoring cause, weight =
/// exp(sum over causes of the cumulative hazard at min(T, L)).
/// Cause 1 is the dependent-censoring indicator; cause 2 is any
/// remaining censoring. Hazard models are fit on raw follow-up times
/// and only evaluated at the truncated outcome.
pub(crate) fn multi_cause_weights(
    frame: &ModelFrame,
    horizon: f64,
    dep_cens: &[u8],
) -> Result<MultiCauseWeights, RmstPowerErr> {
    let n = frame.n();
    let recoded = recode_for_horizon(&frame.time, &frame.status, horizon);

    let mut hazard_covariates: Vec<Vec<f64>> =
        vec![frame.arm.iter().map(|&a| a as f64).collect()];
    for (_, col) in &frame.linear {
        hazard_covariates.push(col.clone());
    }

    let cause_one: Vec<u8> = dep_cens.to_vec();
    let cause_two: Vec<u8> = frame
        .status
        .iter()
        .zip(dep_cens.iter())
        .map(|(&s, &d)| u8::from(s == 0 && d == 0))
        .collect();

    let mut models = vec![];
    for cause_event in [cause_one, cause_two] {
        let fit = CoxFit::fit(&frame.time, &cause_event, &hazard_covariates)?;
        models.push(CauseSpecificModel { fit, cause_event });
    }

    let mut weights = vec![];
    let mut retained = vec![];
    let mut x_row = vec![0.0; hazard_covariates.len()];
    for i in 0..n {
        if recoded.complete[i] != 1 {
            continue;
        }
        for (j, col) in hazard_covariates.iter().enumerate() {
            x_row[j] = col[i];
        }
        let total_hazard: f64 = models
            .iter()
            .map(|m| m.fit.cumulative_hazard_at(recoded.obs_time[i], &x_row))
            .sum();
        weights.push(total_hazard.exp());
        retained.push(i);
    }

    Ok(MultiCauseWeights {
        weights: CensoringWeights {
            weights,
            retained,
            n_dropped: 0,
        },
        models,
        hazard_covariates,
    })
}
