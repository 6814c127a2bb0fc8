//----------------------------------------
// computation mod
//----------------------------------------
pub mod types;

pub use crate::estimator::fit::fit_effect;
pub use crate::power::analytic::compute_power_analytical;
pub use crate::power::boot::compute_power_boot;
pub use crate::search::compute_ss::{compute_ss_analytical, compute_ss_boot};
