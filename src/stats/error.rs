//----------------------------------------
// stats errors
//----------------------------------------
use crate::error::RmstPowerErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalDistErr {
    #[error("arguments to quantile function should be in (0, 1); got {0}")]
    QuantileOutOfBounds(f64),
    #[error("significance level should be in (0, 1); got {0}")]
    BadAlpha(f64),
}

impl Into<RmstPowerErr> for NormalDistErr {
    fn into(self) -> RmstPowerErr {
        RmstPowerErr::NormalDist(self)
    }
}
