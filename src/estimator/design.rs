//----------------------------------------
// Regression design construction
//----------------------------------------
use crate::censoring::types::CensoringWeights;
use crate::data::frame::{ModelFrame, Strata};
use crate::error::RmstPowerErr;
use crate::estimator::error::EstimationErr;
use ndarray::{Array1, Array2};

/// Response, regressors, and weights ready for the least-squares core.
/// `rows` maps design rows back to frame rows (needed when variance
/// corrections have to revisit the raw data), and `arm_col` locates
/// the treatment coefficient.
#[derive(Debug, Clone)]
pub(crate) struct Design {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub w: Array1<f64>,
    pub arm_col: usize,
    pub rows: Vec<usize>,
}

/// Intercept + arm + linear terms over the weight-retained subjects,
/// outcome min(T, L). Shared by the plain and dependent-censoring
/// variants.
pub(crate) fn complete_case_design(
    frame: &ModelFrame,
    horizon: f64,
    cw: &CensoringWeights,
) -> Result<Design, RmstPowerErr> {
    if cw.retained.is_empty() {
        return Err(EstimationErr::NoSubjectsRetained.into());
    }
    let n = cw.retained.len();
    let p = 2 + frame.linear.len();
    let mut x = Array2::<f64>::zeros((n, p));
    let mut y = Array1::<f64>::zeros(n);
    for (r, &i) in cw.retained.iter().enumerate() {
        y[r] = frame.time[i].min(horizon);
        x[[r, 0]] = 1.0;
        x[[r, 1]] = frame.arm[i] as f64;
        for (j, (_, col)) in frame.linear.iter().enumerate() {
            x[[r, 2 + j]] = col[i];
        }
    }
    Ok(Design {
        x,
        y,
        w: Array1::from(cw.weights.clone()),
        arm_col: 1,
        rows: cw.retained.clone(),
    })
}

/// Stratum-centered design: arm + linear terms with the weighted
/// within-stratum mean of the outcome and of every regressor removed,
/// no intercept. With `log_outcome` the response is ln(min(T, L)),
/// the multiplicative surrogate. Every stratum must keep at least one
/// usable subject per arm or the centered columns lose the contrast.
pub(crate) fn stratified_design(
    frame: &ModelFrame,
    strata: &Strata,
    horizon: f64,
    cw: &CensoringWeights,
    log_outcome: bool,
) -> Result<Design, RmstPowerErr> {
    if cw.retained.is_empty() {
        return Err(EstimationErr::NoSubjectsRetained.into());
    }
    let n = cw.retained.len();
    let p = 1 + frame.linear.len();
    let n_strata = strata.n_levels();

    let mut arm_counts = vec![[0usize; 2]; n_strata];
    for &i in &cw.retained {
        arm_counts[strata.ids[i]][frame.arm[i] as usize] += 1;
    }
    for (s, counts) in arm_counts.iter().enumerate() {
        for arm in 0..2 {
            if counts[arm] == 0 {
                return Err(EstimationErr::DegenerateStratum {
                    label: strata.levels[s],
                    arm: arm as u8,
                }
                .into());
            }
        }
    }

    let mut x = Array2::<f64>::zeros((n, p));
    let mut y = Array1::<f64>::zeros(n);
    for (r, &i) in cw.retained.iter().enumerate() {
        let outcome = frame.time[i].min(horizon);
        y[r] = if log_outcome {
            if outcome <= 0.0 {
                return Err(EstimationErr::NonPositiveOutcome(outcome).into());
            }
            outcome.ln()
        } else {
            outcome
        };
        x[[r, 0]] = frame.arm[i] as f64;
        for (j, (_, col)) in frame.linear.iter().enumerate() {
            x[[r, 1 + j]] = col[i];
        }
    }

    // Weighted within-stratum means of response and regressors
    let mut w_sum = vec![0.0; n_strata];
    let mut y_sum = vec![0.0; n_strata];
    let mut x_sum = vec![vec![0.0; p]; n_strata];
    for (r, &i) in cw.retained.iter().enumerate() {
        let s = strata.ids[i];
        let wi = cw.weights[r];
        w_sum[s] += wi;
        y_sum[s] += wi * y[r];
        for j in 0..p {
            x_sum[s][j] += wi * x[[r, j]];
        }
    }
    for (r, &i) in cw.retained.iter().enumerate() {
        let s = strata.ids[i];
        y[r] -= y_sum[s] / w_sum[s];
        for j in 0..p {
            x[[r, j]] -= x_sum[s][j] / w_sum[s];
        }
    }

    Ok(Design {
        x,
        y,
        w: Array1::from(cw.weights.clone()),
        arm_col: 0,
        rows: cw.retained.clone(),
    })
}

/// Unweighted design over all subjects for the pseudo-value model:
/// intercept + arm + linear terms + a compact cubic basis per smooth
/// term.
pub(crate) fn pseudo_design(
    frame: &ModelFrame,
    pseudo_values: &[f64],
) -> Result<Design, RmstPowerErr> {
    let n = frame.n();
    let p = 2 + frame.linear.len() + SMOOTH_BASIS_DIM * frame.smooth.len();
    let mut x = Array2::<f64>::zeros((n, p));
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        y[i] = pseudo_values[i];
        x[[i, 0]] = 1.0;
        x[[i, 1]] = frame.arm[i] as f64;
        for (j, (_, col)) in frame.linear.iter().enumerate() {
            x[[i, 2 + j]] = col[i];
        }
    }
    let mut col0 = 2 + frame.linear.len();
    for (_, values) in &frame.smooth {
        let basis = smooth_basis(values)?;
        for i in 0..n {
            for b in 0..SMOOTH_BASIS_DIM {
                x[[i, col0 + b]] = basis[[i, b]];
            }
        }
        col0 += SMOOTH_BASIS_DIM;
    }
    Ok(Design {
        x,
        y,
        w: Array1::from(vec![1.0; n]),
        arm_col: 1,
        rows: (0..n).collect(),
    })
}

pub(crate) const SMOOTH_BASIS_DIM: usize = 4;

/// Standardized cubic polynomial plus one truncated cubic hinge at the
/// median: enough curvature for a pilot-sized smooth term without the
/// knot bookkeeping of a full spline expansion.
fn smooth_basis(values: &[f64]) -> Result<Array2<f64>, RmstPowerErr> {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    if var <= 0.0 {
        return Err(EstimationErr::SingularDesign.into());
    }
    let sd = var.sqrt();
    let z: Vec<f64> = values.iter().map(|v| (v - mean) / sd).collect();

    let mut sorted = z.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let knot = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    let mut basis = Array2::<f64>::zeros((n, SMOOTH_BASIS_DIM));
    for i in 0..n {
        basis[[i, 0]] = z[i];
        basis[[i, 1]] = z[i] * z[i];
        basis[[i, 2]] = z[i] * z[i] * z[i];
        basis[[i, 3]] = (z[i] - knot).max(0.0).powi(3);
    }
    Ok(basis)
}
