//----------------------------------------
// Kaplan-Meier product-limit estimator
//----------------------------------------
use itertools::Itertools;

/// Product-limit survival curve. Fitting it to the usual (time, event)
/// coding gives the event-time survival function; fitting it to the
/// recoded data (event and censoring swapped) gives the censoring
/// survival function used for inverse-probability weights.
#[derive(Debug, Clone)]
pub(crate) struct KaplanMeier {
    /// Distinct times with at least one process event, ascending
    jump_times: Vec<f64>,
    /// Survival immediately after each jump time
    survival: Vec<f64>,
}

impl KaplanMeier {
    pub fn fit(time: &[f64], event: &[u8]) -> KaplanMeier {
        let n = time.len();
        let order: Vec<usize> = (0..n)
            .sorted_by(|&a, &b| time[a].total_cmp(&time[b]))
            .collect();

        let mut jump_times = vec![];
        let mut survival = vec![];
        let mut at_risk = n;
        let mut surv = 1.0;
        let mut i = 0;
        while i < n {
            let t = time[order[i]];
            let mut n_events = 0usize;
            let mut n_at_t = 0usize;
            while i + n_at_t < n && time[order[i + n_at_t]] == t {
                if event[order[i + n_at_t]] == 1 {
                    n_events += 1;
                }
                n_at_t += 1;
            }
            if n_events > 0 {
                surv *= 1.0 - (n_events as f64) / (at_risk as f64);
                jump_times.push(t);
                survival.push(surv);
            }
            at_risk -= n_at_t;
            i += n_at_t;
        }

        KaplanMeier {
            jump_times,
            survival,
        }
    }

    /// Censoring-distribution fit on horizon-recoded data. `complete`
    /// marks subjects whose truncated outcome is known; the remaining
    /// subjects are the censoring-process events. Tied outcomes resolve
    /// with primary events first, so the risk set for a censoring jump
    /// at t excludes outcome-complete subjects tied at t. Under this
    /// convention the curve can genuinely reach zero, which is the
    /// undefined-weight case the caller has to drop.
    pub fn fit_censoring(obs_time: &[f64], complete: &[u8]) -> KaplanMeier {
        let n = obs_time.len();
        let order: Vec<usize> = (0..n)
            .sorted_by(|&a, &b| obs_time[a].total_cmp(&obs_time[b]))
            .collect();

        let mut jump_times = vec![];
        let mut survival = vec![];
        let mut at_risk = n;
        let mut surv = 1.0;
        let mut i = 0;
        while i < n {
            let t = obs_time[order[i]];
            let mut n_cens = 0usize;
            let mut n_complete = 0usize;
            let mut n_at_t = 0usize;
            while i + n_at_t < n && obs_time[order[i + n_at_t]] == t {
                if complete[order[i + n_at_t]] == 1 {
                    n_complete += 1;
                } else {
                    n_cens += 1;
                }
                n_at_t += 1;
            }
            let risk = at_risk - n_complete;
            if n_cens > 0 && risk > 0 {
                surv *= 1.0 - (n_cens as f64) / (risk as f64);
                jump_times.push(t);
                survival.push(surv);
            }
            at_risk -= n_at_t;
            i += n_at_t;
        }

        KaplanMeier {
            jump_times,
            survival,
        }
    }

    /// S(t): survival just after t, i.e. the product over jumps at or
    /// before t.
    pub fn survival_at(&self, t: f64) -> f64 {
        let k = self.jump_times.partition_point(|&jt| jt <= t);
        if k == 0 { 1.0 } else { self.survival[k - 1] }
    }

    /// Area under the survival step function from 0 to `horizon`, the
    /// restricted mean of the process time.
    pub fn rmst(&self, horizon: f64) -> f64 {
        let mut area = 0.0;
        let mut prev_t = 0.0;
        let mut surv = 1.0;
        for (&t, &s) in self.jump_times.iter().zip(self.survival.iter()) {
            if t >= horizon {
                break;
            }
            area += surv * (t - prev_t);
            prev_t = t;
            surv = s;
        }
        area + surv * (horizon - prev_t)
    }
}
