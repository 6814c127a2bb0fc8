//----------------------------------------
// effect estimation errors
//----------------------------------------
use crate::error::RmstPowerErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimationErr {
    #[error("design matrix is singular or collinear")]
    SingularDesign,
    #[error("{n_used} usable subjects cannot identify {n_coef} coefficients")]
    TooFewEvents { n_used: usize, n_coef: usize },
    #[error("stratum {label} has no usable event subjects in arm {arm}")]
    DegenerateStratum { label: f64, arm: u8 },
    #[error("truncated outcome {0} is not positive, cannot take logs")]
    NonPositiveOutcome(f64),
    #[error("no subjects with a usable truncated outcome remain")]
    NoSubjectsRetained,
    #[error("censoring hazard fit did not converge")]
    CoxDidNotConverge,
}

impl Into<RmstPowerErr> for EstimationErr {
    fn into(self) -> RmstPowerErr {
        RmstPowerErr::Estimation(self)
    }
}
