//----------------------------------------
// Dependent-censoring effect model
//----------------------------------------
use crate::censoring::ipcw::{CauseSpecificModel, MultiCauseWeights, multi_cause_weights};
use crate::data::error::DataValidationErr;
use crate::data::frame::ModelFrame;
use crate::error::RmstPowerErr;
use crate::estimator::design::{Design, complete_case_design};
use crate::estimator::types::{EffectFit, SampleUnit};
use crate::estimator::wls::{WlsFit, fit_wls, sandwich_from_scores};
use itertools::Itertools;
use ndarray::Array2;

/// Linear-model regression with multi-cause censoring weights. The
/// robust variance augments each subject's weighted-regression score
/// with the first-order influence it exerts on the estimated baseline
/// hazards of every censoring cause, which is where the extra
/// variability of estimated (rather than known) weights lives. The
/// cause-model coefficients themselves are held fixed in the
/// correction.
pub(crate) fn fit_depcens(frame: &ModelFrame, horizon: f64) -> Result<EffectFit, RmstPowerErr> {
    let dep_cens = frame.dep_cens.as_ref().ok_or_else(|| {
        Into::<RmstPowerErr>::into(DataValidationErr::RoleNotSupplied(
            "dependent-censoring status",
        ))
    })?;
    let mc = multi_cause_weights(frame, horizon, dep_cens)?;
    let design = complete_case_design(frame, horizon, &mc.weights)?;
    let wls = fit_wls(&design.x, &design.y, &design.w)?;
    let covariance = corrected_covariance(frame, &design, &wls, &mc);
    Ok(EffectFit::from_arm_estimate(
        wls.beta[design.arm_col],
        covariance[[design.arm_col, design.arm_col]],
        frame.n(),
        2.0,
        SampleUnit::PerArm,
        wls.n_used,
        mc.weights.n_dropped,
    ))
}

fn corrected_covariance(
    frame: &ModelFrame,
    design: &Design,
    wls: &WlsFit,
    mc: &MultiCauseWeights,
) -> Array2<f64> {
    let n = frame.n();
    let p = design.x.ncols();
    let mut scores = Array2::<f64>::zeros((n, p));

    for (r, &i) in design.rows.iter().enumerate() {
        let s = design.w[r] * wls.residuals[r];
        for j in 0..p {
            scores[[i, j]] += s * design.x[[r, j]];
        }
    }

    for model in &mc.models {
        add_hazard_correction(frame, design, wls, model, &mc.hazard_covariates, &mut scores);
    }

    sandwich_from_scores(&wls.bread_inv, &scores)
}

/// Influence of each subject's censoring-process martingale on the
/// fitted coefficients through the weights. With
/// q(t) = sum over retained m with outcome >= t of w_m e_m x_m h_m
/// (h = relative hazard under this cause), the counting part adds
/// q(T_i)/S0(T_i) at the subject's own cause event and the compensator
/// subtracts h_i * sum over jumps up to T_i of d * q / S0^2.
fn add_hazard_correction(
    frame: &ModelFrame,
    design: &Design,
    wls: &WlsFit,
    model: &CauseSpecificModel,
    hazard_covariates: &[Vec<f64>],
    scores: &mut Array2<f64>,
) {
    let jumps = &model.fit.jumps;
    if jumps.is_empty() {
        return;
    }
    let n = frame.n();
    let p = design.x.ncols();
    let n_jumps = jumps.len();

    let mut x_row = vec![0.0; hazard_covariates.len()];
    let mut exp_lp = vec![0.0; n];
    for i in 0..n {
        for (j, col) in hazard_covariates.iter().enumerate() {
            x_row[j] = col[i];
        }
        exp_lp[i] = model.fit.exp_lp(&x_row);
    }

    // Suffix accumulation of q over descending jump times
    let mut q = vec![vec![0.0; p]; n_jumps];
    let row_order: Vec<usize> = (0..design.rows.len())
        .sorted_by(|&a, &b| design.y[b].total_cmp(&design.y[a]))
        .collect();
    let mut acc = vec![0.0; p];
    let mut ptr = 0;
    for j in (0..n_jumps).rev() {
        while ptr < row_order.len() && design.y[row_order[ptr]] >= jumps[j].time {
            let r = row_order[ptr];
            let s = design.w[r] * wls.residuals[r] * exp_lp[design.rows[r]];
            for k in 0..p {
                acc[k] += s * design.x[[r, k]];
            }
            ptr += 1;
        }
        q[j] = acc.clone();
    }

    // Running compensator integrand d * q / S0^2 over ascending jumps
    let mut compensator = vec![vec![0.0; p]; n_jumps];
    let mut run = vec![0.0; p];
    for j in 0..n_jumps {
        let scale = jumps[j].d / (jumps[j].s0 * jumps[j].s0);
        for k in 0..p {
            run[k] += scale * q[j][k];
        }
        compensator[j] = run.clone();
    }

    let jump_times: Vec<f64> = jumps.iter().map(|b| b.time).collect();
    for i in 0..n {
        if model.cause_event[i] == 1 {
            // The subject's own cause event sits exactly on a jump
            let j = jump_times.partition_point(|&t| t < frame.time[i]);
            for k in 0..p {
                scores[[i, k]] += q[j][k] / jumps[j].s0;
            }
        }
        let j_up = jump_times.partition_point(|&t| t <= frame.time[i]);
        if j_up > 0 {
            for k in 0..p {
                scores[[i, k]] -= exp_lp[i] * compensator[j_up - 1][k];
            }
        }
    }
}
