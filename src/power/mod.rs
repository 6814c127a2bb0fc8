//----------------------------------------
// Power calculation
//----------------------------------------
pub(crate) mod analytic;
pub(crate) mod boot;
pub mod types;
