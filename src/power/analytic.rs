//----------------------------------------
// Closed-form power
//----------------------------------------
use crate::data::types::{PilotData, VariableRoles};
use crate::error::RmstPowerErr;
use crate::estimator::fit::{fit_effect_frame, resolve_for_model};
use crate::estimator::types::{EffectFit, ModelKind};
use crate::power::types::{PowerAnalysis, PowerRow, dropped_weight_message};
use crate::stats::normal::{critical_value, std_normal_cdf};

/// Closed-form power across the requested sample sizes: one pilot fit,
/// then Phi(|beta| / se_N - z_{1-alpha/2}) at each N, where se_N scales
/// the pilot variance to a design with N subjects per sample unit. The
/// fit behind the rows is reported alongside them. Deterministic;
/// identical inputs reproduce identical output bit for bit.
pub fn compute_power_analytical(
    data: &PilotData,
    roles: &VariableRoles,
    kind: ModelKind,
    horizon: f64,
    sample_sizes: &[usize],
    alpha: f64,
) -> Result<PowerAnalysis, RmstPowerErr> {
    let (frame, messages) = resolve_for_model(data, roles, kind, horizon)?;
    let fit = fit_effect_frame(&frame, kind, horizon)?;
    let mut analysis = analytic_power_analysis(fit, sample_sizes, alpha)?;
    analysis.messages.extend(messages);
    Ok(analysis)
}

/// Power of the two-sided level-alpha test at a design with
/// `n_per_unit` subjects per sample unit, holding the pilot effect and
/// variance fixed: Phi(|beta| / sqrt(variance_unit / N) - z_{1-alpha/2})
pub(crate) fn analytic_power(
    fit: &EffectFit,
    n_per_unit: usize,
    alpha: f64,
) -> Result<f64, RmstPowerErr> {
    let z_crit = critical_value(alpha)?;
    let se_n = (fit.variance_unit / n_per_unit as f64).sqrt();
    if se_n == 0.0 {
        // Zero pilot variance collapses the test to a sign check
        return Ok(if fit.coefficient == 0.0 { 0.0 } else { 1.0 });
    }
    Ok(std_normal_cdf(fit.coefficient.abs() / se_n - z_crit))
}

pub(crate) fn analytic_power_analysis(
    fit: EffectFit,
    sample_sizes: &[usize],
    alpha: f64,
) -> Result<PowerAnalysis, RmstPowerErr> {
    let mut rows = Vec::with_capacity(sample_sizes.len());
    for &n in sample_sizes {
        rows.push(PowerRow {
            n_per_unit: n,
            power: analytic_power(&fit, n, alpha)?,
        });
    }
    let messages = dropped_weight_message(&fit).into_iter().collect();
    Ok(PowerAnalysis {
        fit,
        alpha,
        rows,
        messages,
    })
}
