//----------------------------------------
// Sample size search
//----------------------------------------
pub(crate) mod compute_ss;
pub mod error;
pub(crate) mod sample_size;
pub mod types;
