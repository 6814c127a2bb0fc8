//----------------------------------------
// Effect model dispatch
//----------------------------------------
use crate::data::frame::ModelFrame;
use crate::data::types::{PilotData, VariableRoles};
use crate::error::RmstPowerErr;
use crate::estimator::depcens::fit_depcens;
use crate::estimator::linear::fit_linear;
use crate::estimator::pseudo::fit_pseudo;
use crate::estimator::stratified::fit_stratified;
use crate::estimator::types::{EffectFit, ModelKind};

/// Estimates the restricted-mean treatment effect from pilot data.
/// `roles` maps dataset columns onto the time/status/arm roles (plus
/// strata, dependent-censoring cause, and covariate terms where the
/// chosen model uses them) and `horizon` is the truncation time L.
/// The returned fit carries the arm coefficient, its pilot standard
/// error and p-value, and the variance-per-sample-unit that the power
/// calculations scale by.
pub fn fit_effect(
    data: &PilotData,
    roles: &VariableRoles,
    kind: ModelKind,
    horizon: f64,
) -> Result<EffectFit, RmstPowerErr> {
    let (frame, _) = resolve_for_model(data, roles, kind, horizon)?;
    fit_effect_frame(&frame, kind, horizon)
}

/// Role resolution plus the structural checks shared by every public
/// entry point. Returns the resolved frame and any role-use
/// diagnostics that should ride on the result object.
pub(crate) fn resolve_for_model(
    data: &PilotData,
    roles: &VariableRoles,
    kind: ModelKind,
    horizon: f64,
) -> Result<(ModelFrame, Vec<String>), RmstPowerErr> {
    let frame = ModelFrame::resolve(data, roles)?;
    frame.validate_horizon(horizon)?;
    let mut messages = Vec::new();
    if !frame.smooth.is_empty() && kind != ModelKind::GamPseudoObs {
        messages.push(format!(
            "smooth terms are only used by the pseudo-observation model; \
            the {:?} model ignored them",
            kind
        ));
    }
    Ok((frame, messages))
}

/// Fits the requested effect model on a resolved frame. Smooth terms
/// are specific to the pseudo-observation model; the other models warn
/// and ignore them rather than failing the fit.
pub(crate) fn fit_effect_frame(
    frame: &ModelFrame,
    kind: ModelKind,
    horizon: f64,
) -> Result<EffectFit, RmstPowerErr> {
    if !frame.smooth.is_empty() && kind != ModelKind::GamPseudoObs {
        tracing::warn!(
            "smooth terms are mapped but the {:?} model does not use them",
            kind
        );
    }
    match kind {
        ModelKind::Linear => fit_linear(frame, horizon),
        ModelKind::AdditiveStratified => fit_stratified(frame, horizon, false),
        ModelKind::MultiplicativeStratified => fit_stratified(frame, horizon, true),
        ModelKind::GamPseudoObs => fit_pseudo(frame, horizon),
        ModelKind::DependentCensoring => fit_depcens(frame, horizon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{Column, VariableRoles};
    use crate::estimator::types::SampleUnit;
    use crate::test_util::{sim_dep_cens_pilot, sim_stratified_pilot, sim_two_arm_pilot};

    #[test]
    fn dispatch_matches_direct_linear_fit() {
        let data = sim_two_arm_pilot(60, 0.1, 0.05, 0.02, 24601);
        let roles = VariableRoles::new("time", "status", "arm");
        let frame = ModelFrame::resolve(&data, &roles).expect("failed to resolve roles");
        let via_dispatch =
            fit_effect_frame(&frame, ModelKind::Linear, 12.0).expect("failed to fit");
        let direct = fit_linear(&frame, 12.0).expect("failed to fit");
        assert_eq!(
            via_dispatch.coefficient.to_bits(),
            direct.coefficient.to_bits()
        );
        assert_eq!(
            via_dispatch.variance_unit.to_bits(),
            direct.variance_unit.to_bits()
        );
    }

    #[test]
    fn stratified_variants_share_a_unit_but_not_an_estimate() {
        let data = sim_stratified_pilot(40, 3, 0.1, 0.05, 0.02, 7);
        let roles = VariableRoles::new("time", "status", "arm").with_strata("site");
        let frame = ModelFrame::resolve(&data, &roles).expect("failed to resolve roles");
        let additive = fit_effect_frame(&frame, ModelKind::AdditiveStratified, 12.0)
            .expect("failed to fit additive model");
        let multiplicative = fit_effect_frame(&frame, ModelKind::MultiplicativeStratified, 12.0)
            .expect("failed to fit multiplicative model");
        assert_eq!(additive.sample_unit, SampleUnit::PerStratum);
        assert_eq!(multiplicative.sample_unit, SampleUnit::PerStratum);
        assert!((additive.coefficient - multiplicative.coefficient).abs() > 1e-6);
    }

    #[test]
    fn every_variant_fits_matching_data() {
        let plain = sim_two_arm_pilot(50, 0.1, 0.05, 0.02, 11);
        let plain_frame =
            ModelFrame::resolve(&plain, &VariableRoles::new("time", "status", "arm"))
                .expect("failed to resolve roles");
        assert!(fit_effect_frame(&plain_frame, ModelKind::Linear, 12.0).is_ok());
        assert!(fit_effect_frame(&plain_frame, ModelKind::GamPseudoObs, 12.0).is_ok());

        let strat = sim_stratified_pilot(40, 2, 0.1, 0.05, 0.02, 11);
        let strat_frame = ModelFrame::resolve(
            &strat,
            &VariableRoles::new("time", "status", "arm").with_strata("site"),
        )
        .expect("failed to resolve roles");
        assert!(fit_effect_frame(&strat_frame, ModelKind::AdditiveStratified, 12.0).is_ok());

        let dc = sim_dep_cens_pilot(50, 0.1, 0.05, 0.04, 0.02, 11);
        let dc_frame = ModelFrame::resolve(
            &dc,
            &VariableRoles::new("time", "status", "arm").with_dep_cens_status("dc"),
        )
        .expect("failed to resolve roles");
        assert!(fit_effect_frame(&dc_frame, ModelKind::DependentCensoring, 12.0).is_ok());
    }

    #[test]
    fn stratified_model_without_strata_role_fails() {
        let data = sim_two_arm_pilot(30, 0.1, 0.05, 0.02, 5);
        let frame = ModelFrame::resolve(&data, &VariableRoles::new("time", "status", "arm"))
            .expect("failed to resolve roles");
        let result = fit_effect_frame(&frame, ModelKind::AdditiveStratified, 12.0);
        assert!(result.is_err());
    }

    #[test]
    fn public_fit_validates_the_horizon() {
        let data = sim_two_arm_pilot(30, 0.1, 0.05, 0.02, 5);
        let roles = VariableRoles::new("time", "status", "arm");
        assert!(fit_effect(&data, &roles, ModelKind::Linear, 0.0).is_err());
        assert!(fit_effect(&data, &roles, ModelKind::Linear, 1.0e9).is_err());
        assert!(fit_effect(&data, &roles, ModelKind::Linear, 10.0).is_ok());
    }

    #[test]
    fn ignored_smooth_terms_produce_a_message() {
        let data = PilotData::new(vec![
            Column::new("time", vec![3.0, 6.0, 4.0, 8.0]),
            Column::new("status", vec![1.0, 1.0, 1.0, 1.0]),
            Column::new("arm", vec![0.0, 1.0, 0.0, 1.0]),
            Column::new("age", vec![50.0, 61.0, 47.0, 55.0]),
        ])
        .expect("failed to construct pilot data");
        let roles = VariableRoles::new("time", "status", "arm").with_smooth_terms(["age"]);
        let (_, messages) = resolve_for_model(&data, &roles, ModelKind::Linear, 6.0)
            .expect("failed to resolve roles");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("ignored"));
        let (_, none) = resolve_for_model(&data, &roles, ModelKind::GamPseudoObs, 6.0)
            .expect("failed to resolve roles");
        assert!(none.is_empty());
    }
}
