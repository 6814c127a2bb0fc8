//----------------------------------------
// Small symmetric positive definite solves
//----------------------------------------
use ndarray::{Array1, Array2};

/// Lower-triangular Cholesky factor of a symmetric positive definite
/// matrix, or None when a pivot collapses (singular or indefinite
/// input). Model dimensions here are small, so a dense hand-rolled
/// factorization beats pulling in a LAPACK binding.
pub(crate) fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let p = a.nrows();
    let mut l = Array2::<f64>::zeros((p, p));
    for i in 0..p {
        for j in 0..=i {
            let mut s = a[[i, j]];
            for k in 0..j {
                s -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if s <= 1e-12 {
                    return None;
                }
                l[[i, j]] = s.sqrt();
            } else {
                l[[i, j]] = s / l[[j, j]];
            }
        }
    }
    Some(l)
}

fn forward_sub(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let p = b.len();
    let mut y = Array1::<f64>::zeros(p);
    for i in 0..p {
        let mut s = b[i];
        for k in 0..i {
            s -= l[[i, k]] * y[k];
        }
        y[i] = s / l[[i, i]];
    }
    y
}

fn back_sub(l: &Array2<f64>, y: &Array1<f64>) -> Array1<f64> {
    let p = y.len();
    let mut x = Array1::<f64>::zeros(p);
    for i in (0..p).rev() {
        let mut s = y[i];
        for k in i + 1..p {
            s -= l[[k, i]] * x[k];
        }
        x[i] = s / l[[i, i]];
    }
    x
}

/// Solves A x = b for symmetric positive definite A.
pub(crate) fn solve_spd(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let l = cholesky(a)?;
    Some(back_sub(&l, &forward_sub(&l, b)))
}

/// Inverse of a symmetric positive definite matrix, column by column.
pub(crate) fn invert_spd(a: &Array2<f64>) -> Option<Array2<f64>> {
    let p = a.nrows();
    let l = cholesky(a)?;
    let mut inv = Array2::<f64>::zeros((p, p));
    for j in 0..p {
        let mut e = Array1::<f64>::zeros(p);
        e[j] = 1.0;
        let col = back_sub(&l, &forward_sub(&l, &e));
        for i in 0..p {
            inv[[i, j]] = col[i];
        }
    }
    Some(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;
    use ndarray::arr2;

    #[test]
    fn solves_known_system() {
        let a = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
        let b = arr1(&[2.0, 5.0]);
        let x = solve_spd(&a, &b).expect("failed to solve SPD system");
        // Solution of [[4,2],[2,3]] x = [2,5] is [-0.5, 2]
        assert!((x[0] - (-0.5)).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let a = arr2(&[[5.0, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 2.0]]);
        let inv = invert_spd(&a).expect("failed to invert SPD matrix");
        let prod = a.dot(&inv);
        for i in 0..3 {
            for j in 0..3 {
                let want = if i == j { 1.0 } else { 0.0 };
                assert!((prod[[i, j]] - want).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let a = arr2(&[[1.0, 1.0], [1.0, 1.0]]);
        assert!(cholesky(&a).is_none());
        assert!(solve_spd(&a, &arr1(&[1.0, 1.0])).is_none());
    }
}
