//----------------------------------------
// Sample size entry points
//----------------------------------------
use crate::data::types::{PilotData, VariableRoles};
use crate::error::RmstPowerErr;
use crate::estimator::fit::{fit_effect_frame, resolve_for_model};
use crate::estimator::types::{EffectFit, ModelKind};
use crate::power::analytic::analytic_power;
use crate::power::boot::{row_messages, sample_units, simulate_row};
use crate::power::types::{BootSettings, CancelToken, dropped_weight_message};
use crate::search::sample_size::search_sample_size;
use crate::search::types::{SampleSizeResult, SearchOutcome, SearchSettings, SearchStatus};
use crate::stats::normal::critical_value;

/// Smallest sample size per unit whose closed-form power meets the
/// target. Candidates walk n_start, n_start + n_step, and so on up to
/// max_n_per_arm; running out of candidates is reported as a result
/// status carrying the best attempt, not as an error.
pub fn compute_ss_analytical(
    data: &PilotData,
    roles: &VariableRoles,
    kind: ModelKind,
    horizon: f64,
    settings: &SearchSettings,
    alpha: f64,
) -> Result<SampleSizeResult, RmstPowerErr> {
    let (frame, mut messages) = resolve_for_model(data, roles, kind, horizon)?;
    let fit = fit_effect_frame(&frame, kind, horizon)?;
    let outcome = search_sample_size(settings, None, |n| analytic_power(&fit, n, alpha))?;
    messages.extend(dropped_weight_message(&fit));
    Ok(finish(outcome, fit, settings, messages))
}

/// Bootstrap-mode search. Every candidate runs a full simulation row
/// with the same replicate accounting as `compute_power_boot`, so the
/// per-candidate power is Monte Carlo; `boot.patience` bounds
/// consecutive non-improving candidates to keep simulation noise from
/// walking a hopeless search all the way to max_n_per_arm.
pub fn compute_ss_boot(
    data: &PilotData,
    roles: &VariableRoles,
    kind: ModelKind,
    horizon: f64,
    search: &SearchSettings,
    boot: &BootSettings,
    alpha: f64,
    cancel: Option<&CancelToken>,
) -> Result<SampleSizeResult, RmstPowerErr> {
    let (frame, mut messages) = resolve_for_model(data, roles, kind, horizon)?;
    critical_value(alpha)?;
    let fit = fit_effect_frame(&frame, kind, horizon)?;
    let n_units = sample_units(&frame, kind);

    //----------------------------------------
    // Search over the simulated-power oracle
    //----------------------------------------
    let mut row_notes: Vec<String> = Vec::new();
    let run = |notes: &mut Vec<String>| {
        search_sample_size(search, Some(boot.patience), |n| {
            let row = simulate_row(&frame, kind, horizon, n, n_units, alpha, boot, cancel);
            row_messages(&row, notes);
            Ok(row.power)
        })
    };
    let outcome = match boot.cores {
        0 => run(&mut row_notes)?,
        cores => rayon::ThreadPoolBuilder::new()
            .num_threads(cores)
            .build()
            .expect("failed to build bootstrap thread pool")
            .install(|| run(&mut row_notes))?,
    };

    messages.extend(dropped_weight_message(&fit));
    messages.extend(row_notes);
    Ok(finish(outcome, fit, search, messages))
}

fn finish(
    outcome: SearchOutcome,
    fit: EffectFit,
    settings: &SearchSettings,
    mut messages: Vec<String>,
) -> SampleSizeResult {
    match outcome.status {
        SearchStatus::Succeeded => {}
        SearchStatus::ExhaustedMaxN => messages.push(format!(
            "target power {} not reached by max_n_per_arm = {}; best attempt reached {:.4} at n = {}",
            settings.target_power, settings.max_n_per_arm, outcome.power, outcome.n_per_unit
        )),
        SearchStatus::Stalled => messages.push(format!(
            "power stopped improving before reaching the target {}; best attempt reached {:.4} at n = {}",
            settings.target_power, outcome.power, outcome.n_per_unit
        )),
    }
    SampleSizeResult {
        status: outcome.status,
        n_per_unit: outcome.n_per_unit,
        power: outcome.power,
        fit,
        steps: outcome.steps,
        messages,
    }
}
