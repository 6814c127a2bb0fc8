//----------------------------------------
// Root lib
//----------------------------------------
//! The purpose of this library is to provide utility functions for computing
//! power and sample sizes for clinical trials that compare arms on restricted
//! mean survival time. Pilot data with censoring is handled through inverse
//! probability of censoring weights, and both analytic and bootstrap power
//! calculations are supported.

mod censoring;
/// This module houses the public API for fitting effect models and computing
/// power and sample sizes
pub mod compute;
mod data;
/// This module contains error types
pub mod error;
mod estimator;
mod power;
mod search;
mod stats;
#[cfg(test)]
mod test_util;
