use crate::error::RmstPowerErr;
use crate::stats::error::NormalDistErr;
use statrs::distribution::{ContinuousCDF, Normal};

pub fn std_normal_cdf(z: f64) -> f64 {
    let std_normal = Normal::new(0.0, 1.0).unwrap();
    std_normal.cdf(z)
}

pub fn std_normal_quantile(p: f64) -> Result<f64, RmstPowerErr> {
    if !(p > 0.0 && p < 1.0) {
        return Err(NormalDistErr::QuantileOutOfBounds(p).into());
    }
    let std_normal = Normal::new(0.0, 1.0).unwrap();
    Ok(std_normal.inverse_cdf(p))
}

/// Two-sided p-value for a standard-normal test statistic
pub fn two_sided_p_value(z: f64) -> f64 {
    2.0 * (1.0 - std_normal_cdf(z.abs()))
}

/// Critical value z_{1 - alpha/2} used by every power computation
pub fn critical_value(alpha: f64) -> Result<f64, RmstPowerErr> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(NormalDistErr::BadAlpha(alpha).into());
    }
    std_normal_quantile(1.0 - alpha / 2.0)
}
