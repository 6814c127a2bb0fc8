//----------------------------------------
// Crate error type
//----------------------------------------
use thiserror::Error;

pub use crate::data::error::DataValidationErr;
pub use crate::estimator::error::EstimationErr;
pub use crate::search::error::SearchErr;
pub use crate::stats::error::NormalDistErr;

#[derive(Error, Debug)]
pub enum RmstPowerErr {
    #[error("while validating pilot data: {0}")]
    DataValidation(DataValidationErr),
    #[error("while evaluating normal distribution: {0}")]
    NormalDist(NormalDistErr),
    #[error("while fitting effect model: {0}")]
    Estimation(EstimationErr),
    #[error("while configuring sample size search: {0}")]
    Search(SearchErr),
}
