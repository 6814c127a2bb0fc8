//----------------------------------------
// Weighted least squares with robust variance
//----------------------------------------
use crate::error::RmstPowerErr;
use crate::estimator::error::EstimationErr;
use crate::stats::linalg::{invert_spd, solve_spd};
use ndarray::{Array1, Array2};

/// Solution of a weighted least-squares problem by normal equations,
/// with the heteroskedasticity-robust sandwich covariance
/// A^-1 (sum_i (w_i e_i)^2 x_i x_i') A^-1 where A = X'WX. The bread
/// inverse and residuals are kept so callers can augment the meat with
/// extra score terms.
#[derive(Debug, Clone)]
pub(crate) struct WlsFit {
    pub beta: Array1<f64>,
    pub covariance: Array2<f64>,
    pub bread_inv: Array2<f64>,
    pub residuals: Array1<f64>,
    pub n_used: usize,
}

pub(crate) fn fit_wls(
    x: &Array2<f64>,
    y: &Array1<f64>,
    w: &Array1<f64>,
) -> Result<WlsFit, RmstPowerErr> {
    let n = x.nrows();
    let p = x.ncols();
    if n == 0 {
        return Err(EstimationErr::NoSubjectsRetained.into());
    }
    if n <= p {
        return Err(EstimationErr::TooFewEvents {
            n_used: n,
            n_coef: p,
        }
        .into());
    }

    let mut a = Array2::<f64>::zeros((p, p));
    let mut b = Array1::<f64>::zeros(p);
    for i in 0..n {
        let wi = w[i];
        for j in 0..p {
            b[j] += wi * x[[i, j]] * y[i];
            for k in 0..=j {
                a[[j, k]] += wi * x[[i, j]] * x[[i, k]];
            }
        }
    }
    for j in 0..p {
        for k in j + 1..p {
            a[[j, k]] = a[[k, j]];
        }
    }

    let beta = solve_spd(&a, &b).ok_or_else(singular)?;
    let bread_inv = invert_spd(&a).ok_or_else(singular)?;

    let mut residuals = Array1::<f64>::zeros(n);
    for i in 0..n {
        let fitted: f64 = (0..p).map(|j| x[[i, j]] * beta[j]).sum();
        residuals[i] = y[i] - fitted;
    }

    let covariance = sandwich(&bread_inv, x, w, &residuals);
    Ok(WlsFit {
        beta,
        covariance,
        bread_inv,
        residuals,
        n_used: n,
    })
}

fn singular() -> RmstPowerErr {
    EstimationErr::SingularDesign.into()
}

fn sandwich(
    bread_inv: &Array2<f64>,
    x: &Array2<f64>,
    w: &Array1<f64>,
    residuals: &Array1<f64>,
) -> Array2<f64> {
    let n = x.nrows();
    let p = x.ncols();
    let mut meat = Array2::<f64>::zeros((p, p));
    for i in 0..n {
        let s = w[i] * residuals[i];
        for j in 0..p {
            for k in 0..p {
                meat[[j, k]] += s * s * x[[i, j]] * x[[i, k]];
            }
        }
    }
    bread_inv.dot(&meat).dot(bread_inv)
}

/// Robust covariance from explicit per-subject score vectors; used
/// where the meat carries correction terms beyond w * e * x.
pub(crate) fn sandwich_from_scores(bread_inv: &Array2<f64>, scores: &Array2<f64>) -> Array2<f64> {
    let n = scores.nrows();
    let p = scores.ncols();
    let mut meat = Array2::<f64>::zeros((p, p));
    for i in 0..n {
        for j in 0..p {
            for k in 0..p {
                meat[[j, k]] += scores[[i, j]] * scores[[i, k]];
            }
        }
    }
    bread_inv.dot(&meat).dot(bread_inv)
}
