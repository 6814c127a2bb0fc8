//----------------------------------------
// Simulated pilot datasets for tests
//----------------------------------------
use rand::SeedableRng;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use statrs::distribution::Exp;

use crate::data::types::{Column, PilotData};

/// Two-arm pilot with exponential event times and independent
/// exponential censoring, arms alternating so the split is exactly
/// even. Arm 1 gets `lambda_trt`.
pub(crate) fn sim_two_arm_pilot(
    n_per_arm: usize,
    lambda_ctrl: f64,
    lambda_trt: f64,
    lambda_cens: f64,
    seed: u64,
) -> PilotData {
    let mut rng = StdRng::seed_from_u64(seed);
    let ctrl_exp = Exp::new(lambda_ctrl).expect("failed to construct control distribution");
    let trt_exp = Exp::new(lambda_trt).expect("failed to construct treatment distribution");
    let cens_exp = Exp::new(lambda_cens).expect("failed to construct censoring distribution");

    let n = 2 * n_per_arm;
    let mut time = Vec::with_capacity(n);
    let mut status = Vec::with_capacity(n);
    let mut arm = Vec::with_capacity(n);
    for i in 0..n {
        let a = (i % 2) as f64;
        let t_event = if a == 1.0 {
            trt_exp.sample(&mut rng)
        } else {
            ctrl_exp.sample(&mut rng)
        };
        let t_cens = cens_exp.sample(&mut rng);
        time.push(t_event.min(t_cens));
        status.push(if t_event <= t_cens { 1.0 } else { 0.0 });
        arm.push(a);
    }

    PilotData::new(vec![
        Column::new("time", time),
        Column::new("status", status),
        Column::new("arm", arm),
    ])
    .expect("failed to construct simulated pilot data")
}

/// Stratified pilot: per stratum, `n_per_arm` subjects in each arm,
/// with the baseline hazard inflated by 20% per stratum index so the
/// strata genuinely differ.
pub(crate) fn sim_stratified_pilot(
    n_per_arm: usize,
    n_strata: usize,
    lambda_ctrl: f64,
    lambda_trt: f64,
    lambda_cens: f64,
    seed: u64,
) -> PilotData {
    let mut rng = StdRng::seed_from_u64(seed);
    let cens_exp = Exp::new(lambda_cens).expect("failed to construct censoring distribution");

    let n = 2 * n_per_arm * n_strata;
    let mut time = Vec::with_capacity(n);
    let mut status = Vec::with_capacity(n);
    let mut arm = Vec::with_capacity(n);
    let mut site = Vec::with_capacity(n);
    for s in 0..n_strata {
        let scale = 1.0 + 0.2 * s as f64;
        let ctrl_exp =
            Exp::new(lambda_ctrl * scale).expect("failed to construct control distribution");
        let trt_exp =
            Exp::new(lambda_trt * scale).expect("failed to construct treatment distribution");
        for i in 0..2 * n_per_arm {
            let a = (i % 2) as f64;
            let t_event = if a == 1.0 {
                trt_exp.sample(&mut rng)
            } else {
                ctrl_exp.sample(&mut rng)
            };
            let t_cens = cens_exp.sample(&mut rng);
            time.push(t_event.min(t_cens));
            status.push(if t_event <= t_cens { 1.0 } else { 0.0 });
            arm.push(a);
            site.push((s + 1) as f64);
        }
    }

    PilotData::new(vec![
        Column::new("time", time),
        Column::new("status", status),
        Column::new("arm", arm),
        Column::new("site", site),
    ])
    .expect("failed to construct simulated pilot data")
}

/// Pilot with two competing censoring causes. The dependent cause
/// (column `dc`) hits arm 0 harder, the way informative dropout
/// usually shows up.
pub(crate) fn sim_dep_cens_pilot(
    n_per_arm: usize,
    lambda_ctrl: f64,
    lambda_trt: f64,
    lambda_dep: f64,
    lambda_other: f64,
    seed: u64,
) -> PilotData {
    let mut rng = StdRng::seed_from_u64(seed);
    let ctrl_exp = Exp::new(lambda_ctrl).expect("failed to construct control distribution");
    let trt_exp = Exp::new(lambda_trt).expect("failed to construct treatment distribution");
    let other_exp = Exp::new(lambda_other).expect("failed to construct censoring distribution");

    let n = 2 * n_per_arm;
    let mut time = Vec::with_capacity(n);
    let mut status = Vec::with_capacity(n);
    let mut arm = Vec::with_capacity(n);
    let mut dc = Vec::with_capacity(n);
    for i in 0..n {
        let a = (i % 2) as f64;
        let dep_rate = if a == 1.0 {
            lambda_dep
        } else {
            lambda_dep * 1.5
        };
        let dep_exp = Exp::new(dep_rate).expect("failed to construct dropout distribution");
        let t_event = if a == 1.0 {
            trt_exp.sample(&mut rng)
        } else {
            ctrl_exp.sample(&mut rng)
        };
        let t_dep = dep_exp.sample(&mut rng);
        let t_other = other_exp.sample(&mut rng);
        let t = t_event.min(t_dep).min(t_other);
        time.push(t);
        status.push(if t == t_event { 1.0 } else { 0.0 });
        dc.push(if t != t_event && t == t_dep { 1.0 } else { 0.0 });
        arm.push(a);
    }

    PilotData::new(vec![
        Column::new("time", time),
        Column::new("status", status),
        Column::new("arm", arm),
        Column::new("dc", dc),
    ])
    .expect("failed to construct simulated pilot data")
}
