//----------------------------------------
// Bootstrap power simulation
//----------------------------------------
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::data::frame::ModelFrame;
use crate::data::types::{PilotData, VariableRoles};
use crate::error::RmstPowerErr;
use crate::estimator::fit::{fit_effect_frame, resolve_for_model};
use crate::estimator::types::ModelKind;
use crate::power::types::{
    BootPowerAnalysis, BootPowerRow, BootSettings, CancelToken, dropped_weight_message,
};
use crate::stats::normal::critical_value;

/// Bootstrap power across the requested sample sizes. Each replicate
/// resamples N times n_units subjects with replacement from the pilot,
/// refits the chosen model, and tests at level alpha; the power at one
/// N is the rejection fraction over replicates whose refit succeeded.
/// Replicate seeds derive from the base seed plus the replicate index,
/// so a fixed seed reproduces results for any `cores`. `cancel` stops
/// the simulation between replicates.
pub fn compute_power_boot(
    data: &PilotData,
    roles: &VariableRoles,
    kind: ModelKind,
    horizon: f64,
    sample_sizes: &[usize],
    settings: &BootSettings,
    alpha: f64,
    cancel: Option<&CancelToken>,
) -> Result<BootPowerAnalysis, RmstPowerErr> {
    let (frame, messages) = resolve_for_model(data, roles, kind, horizon)?;
    let mut analysis =
        boot_power_analysis(&frame, kind, horizon, sample_sizes, alpha, settings, cancel)?;
    analysis.messages.extend(messages);
    Ok(analysis)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Replicate {
    Pass,
    Fail,
    FitError,
    Skipped,
}

/// How many sample units the frame represents under the given model:
/// one per stratum for the stratified variants, two arms otherwise.
pub(crate) fn sample_units(frame: &ModelFrame, kind: ModelKind) -> usize {
    match (&frame.strata, kind.requires_strata()) {
        (Some(s), true) => s.n_levels(),
        _ => 2,
    }
}

/// One resampled pseudo-trial: draw rows with replacement, refit the
/// chosen model, test at level alpha. The replicate RNG depends only on
/// the base seed and the replicate index, so results do not depend on
/// worker count or completion order.
fn run_replicate(
    frame: &ModelFrame,
    kind: ModelKind,
    horizon: f64,
    n_draw: usize,
    alpha: f64,
    seed: u64,
    index: u64,
    cancel: Option<&CancelToken>,
) -> Replicate {
    if cancel.is_some_and(|c| c.is_cancelled()) {
        return Replicate::Skipped;
    }
    let mut rng = StdRng::seed_from_u64(seed + index);
    let rows: Vec<usize> = (0..n_draw).map(|_| rng.gen_range(0..frame.n())).collect();
    let resampled = frame.subset(&rows);
    match fit_effect_frame(&resampled, kind, horizon) {
        Ok(fit) if fit.p_value < alpha => Replicate::Pass,
        Ok(_) => Replicate::Fail,
        Err(_) => Replicate::FitError,
    }
}

/// Simulated power at one sample size. Failed refits are excluded from
/// the rejection denominator and counted; a failure fraction above
/// `max_failure_frac` marks the row unreliable.
pub(crate) fn simulate_row(
    frame: &ModelFrame,
    kind: ModelKind,
    horizon: f64,
    n_per_unit: usize,
    n_units: usize,
    alpha: f64,
    settings: &BootSettings,
    cancel: Option<&CancelToken>,
) -> BootPowerRow {
    let n_draw = n_per_unit * n_units;
    let outcomes: Vec<Replicate> = (0..settings.n_sim as u64)
        .into_par_iter()
        .map(|i| run_replicate(frame, kind, horizon, n_draw, alpha, settings.seed, i, cancel))
        .collect();

    let mut n_pass = 0usize;
    let mut n_fit_ok = 0usize;
    let mut n_fit_failed = 0usize;
    let mut n_skipped = 0usize;
    for outcome in &outcomes {
        match outcome {
            Replicate::Pass => {
                n_pass += 1;
                n_fit_ok += 1;
            }
            Replicate::Fail => n_fit_ok += 1,
            Replicate::FitError => n_fit_failed += 1,
            Replicate::Skipped => n_skipped += 1,
        }
    }
    let power = if n_fit_ok > 0 {
        n_pass as f64 / n_fit_ok as f64
    } else {
        0.0
    };
    let reliable = n_fit_ok > 0
        && n_fit_failed as f64 / (n_fit_ok + n_fit_failed) as f64 <= settings.max_failure_frac;
    BootPowerRow {
        n_per_unit,
        power,
        n_requested: settings.n_sim,
        n_fit_ok,
        n_fit_failed,
        n_skipped,
        reliable,
    }
}

pub(crate) fn boot_power_analysis(
    frame: &ModelFrame,
    kind: ModelKind,
    horizon: f64,
    sample_sizes: &[usize],
    alpha: f64,
    settings: &BootSettings,
    cancel: Option<&CancelToken>,
) -> Result<BootPowerAnalysis, RmstPowerErr> {
    // Alpha is validated once up front; replicates compare p-values
    // against it directly
    critical_value(alpha)?;
    let fit = fit_effect_frame(frame, kind, horizon)?;
    let n_units = sample_units(frame, kind);

    let simulate = || -> Vec<BootPowerRow> {
        sample_sizes
            .iter()
            .map(|&n| simulate_row(frame, kind, horizon, n, n_units, alpha, settings, cancel))
            .collect()
    };
    let rows = match settings.cores {
        0 => simulate(),
        cores => rayon::ThreadPoolBuilder::new()
            .num_threads(cores)
            .build()
            .expect("failed to build bootstrap thread pool")
            .install(simulate),
    };

    let mut messages: Vec<String> = dropped_weight_message(&fit).into_iter().collect();
    for row in &rows {
        row_messages(row, &mut messages);
    }
    Ok(BootPowerAnalysis {
        fit,
        alpha,
        rows,
        messages,
    })
}

/// Diagnostics a simulated row should surface on the result object.
pub(crate) fn row_messages(row: &BootPowerRow, out: &mut Vec<String>) {
    if row.n_skipped > 0 {
        out.push(format!(
            "bootstrap at n = {}: cancelled with {} of {} replicates skipped",
            row.n_per_unit, row.n_skipped, row.n_requested
        ));
    }
    if !row.reliable {
        out.push(format!(
            "bootstrap at n = {}: {} of {} replicate refits failed; power estimate is unreliable",
            row.n_per_unit,
            row.n_fit_failed,
            row.n_fit_ok + row.n_fit_failed
        ));
    }
}
