//----------------------------------------
// Linear IPCW effect model
//----------------------------------------
use crate::censoring::ipcw::single_cause_weights;
use crate::data::frame::ModelFrame;
use crate::error::RmstPowerErr;
use crate::estimator::design::complete_case_design;
use crate::estimator::types::{EffectFit, SampleUnit};
use crate::estimator::wls::fit_wls;

/// Weighted regression of the truncated time on arm and linear terms
/// over outcome-complete subjects, inverse censoring weights from the
/// single-cause path.
pub(crate) fn fit_linear(frame: &ModelFrame, horizon: f64) -> Result<EffectFit, RmstPowerErr> {
    let cw = single_cause_weights(frame, horizon);
    let design = complete_case_design(frame, horizon, &cw)?;
    let wls = fit_wls(&design.x, &design.y, &design.w)?;
    Ok(EffectFit::from_arm_estimate(
        wls.beta[design.arm_col],
        wls.covariance[[design.arm_col, design.arm_col]],
        frame.n(),
        2.0,
        SampleUnit::PerArm,
        wls.n_used,
        cw.n_dropped,
    ))
}
