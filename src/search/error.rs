//----------------------------------------
// search configuration errors
//----------------------------------------
use crate::error::RmstPowerErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchErr {
    #[error("n_step should be positive")]
    ZeroStep,
    #[error("n_start should be positive")]
    ZeroStart,
    #[error("n_start ({start}) exceeds max_n_per_arm ({max})")]
    StartBeyondMax { start: usize, max: usize },
    #[error("target power should be in (0, 1); got {0}")]
    TargetOutOfBounds(f64),
}

impl Into<RmstPowerErr> for SearchErr {
    fn into(self) -> RmstPowerErr {
        RmstPowerErr::Search(self)
    }
}
