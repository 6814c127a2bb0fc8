//----------------------------------------
// Sample size search kernel
//----------------------------------------
use crate::error::RmstPowerErr;
use crate::search::types::{SearchOutcome, SearchSettings, SearchState, SearchStatus, SearchStep};

/// Walks the candidate grid upward until the oracle's power meets the
/// target; an exact tie counts as success. `patience` bounds
/// consecutive non-improving candidates and is only supplied by the
/// bootstrap path, where Monte Carlo noise can keep a hopeless search
/// wandering; a patience of zero disables the stall check. The same
/// kernel serves the analytic and bootstrap oracles.
pub(crate) fn search_sample_size<F>(
    settings: &SearchSettings,
    patience: Option<usize>,
    mut power_at: F,
) -> Result<SearchOutcome, RmstPowerErr>
where
    F: FnMut(usize) -> Result<f64, RmstPowerErr>,
{
    settings.validate()?;
    let mut state = SearchState {
        current_n: settings.n_start,
        best_power: f64::NEG_INFINITY,
        best_n: settings.n_start,
        stagnation: 0,
    };
    let mut steps = Vec::new();
    loop {
        let power = power_at(state.current_n)?;
        steps.push(SearchStep {
            n_per_unit: state.current_n,
            power,
        });

        if power >= settings.target_power {
            return Ok(SearchOutcome {
                status: SearchStatus::Succeeded,
                n_per_unit: state.current_n,
                power,
                steps,
            });
        }
        if power > state.best_power {
            state.best_power = power;
            state.best_n = state.current_n;
            state.stagnation = 0;
        } else {
            state.stagnation += 1;
        }
        if state.current_n + settings.n_step > settings.max_n_per_arm {
            return Ok(SearchOutcome {
                status: SearchStatus::ExhaustedMaxN,
                n_per_unit: state.best_n,
                power: state.best_power,
                steps,
            });
        }
        if patience.is_some_and(|p| p > 0 && state.stagnation >= p) {
            return Ok(SearchOutcome {
                status: SearchStatus::Stalled,
                n_per_unit: state.best_n,
                power: state.best_power,
                steps,
            });
        }
        state.current_n += settings.n_step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::error::NormalDistErr;

    fn settings(target: f64, start: usize, step: usize, max: usize) -> SearchSettings {
        SearchSettings {
            target_power: target,
            n_start: start,
            n_step: step,
            max_n_per_arm: max,
        }
    }

    #[test]
    fn returns_smallest_qualifying_candidate() {
        let outcome = search_sample_size(
            &settings(0.45, 10, 10, 1000),
            None, // patience
            |n| Ok((n as f64 / 100.0).min(1.0)),
        )
        .expect("search failed");
        assert_eq!(outcome.status, SearchStatus::Succeeded);
        assert_eq!(outcome.n_per_unit, 50);
        assert!((outcome.power - 0.5).abs() < 1e-12);
        assert_eq!(outcome.steps.len(), 5);
        assert_eq!(outcome.steps[0].n_per_unit, 10);
    }

    #[test]
    fn exact_tie_with_target_succeeds() {
        let outcome = search_sample_size(
            &settings(0.8, 10, 10, 1000),
            None, // patience
            |n| Ok(if n >= 30 { 0.8 } else { 0.1 }),
        )
        .expect("search failed");
        assert_eq!(outcome.status, SearchStatus::Succeeded);
        assert_eq!(outcome.n_per_unit, 30);
        assert_eq!(outcome.power, 0.8);
    }

    #[test]
    fn grid_exhaustion_reports_best_attempt() {
        let outcome = search_sample_size(
            &settings(0.9, 10, 10, 50),
            None, // patience
            |n| Ok(0.1 + n as f64 / 1000.0),
        )
        .expect("search failed");
        assert_eq!(outcome.status, SearchStatus::ExhaustedMaxN);
        assert_eq!(outcome.n_per_unit, 50);
        assert!((outcome.power - 0.15).abs() < 1e-12);
        assert_eq!(outcome.steps.len(), 5);
    }

    #[test]
    fn stalls_after_patience_non_improving_steps() {
        let trace = [0.3, 0.5, 0.45, 0.44, 0.43, 0.42, 0.41];
        let mut calls = 0usize;
        let outcome = search_sample_size(&settings(0.9, 10, 10, 10_000), Some(3), |_| {
            let power = trace[calls];
            calls += 1;
            Ok(power)
        })
        .expect("search failed");
        assert_eq!(outcome.status, SearchStatus::Stalled);
        assert_eq!(outcome.n_per_unit, 20); // best candidate was the second
        assert!((outcome.power - 0.5).abs() < 1e-12);
        assert_eq!(outcome.steps.len(), 5); // 0.5 then three non-improving
    }

    #[test]
    fn no_patience_walks_to_exhaustion() {
        let outcome = search_sample_size(
            &settings(0.9, 10, 10, 300),
            None, // patience
            |_| Ok(0.2),
        )
        .expect("search failed");
        assert_eq!(outcome.status, SearchStatus::ExhaustedMaxN);
        assert_eq!(outcome.steps.len(), 30);
    }

    #[test]
    fn zero_patience_disables_the_stall_check() {
        let outcome = search_sample_size(&settings(0.9, 10, 10, 100), Some(0), |_| Ok(0.2))
            .expect("search failed");
        assert_eq!(outcome.status, SearchStatus::ExhaustedMaxN);
    }

    #[test]
    fn oracle_errors_propagate() {
        let result = search_sample_size(&settings(0.8, 10, 10, 100), None, |_| {
            Err(NormalDistErr::BadAlpha(2.0).into())
        });
        assert!(result.is_err());
    }

    #[test]
    fn invalid_settings_never_call_the_oracle() {
        let mut calls = 0usize;
        let result = search_sample_size(&settings(0.8, 0, 10, 100), None, |_| {
            calls += 1;
            Ok(1.0)
        });
        assert!(result.is_err());
        assert_eq!(calls, 0);
    }
}
