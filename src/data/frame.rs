use crate::data::error::DataValidationErr;
use crate::data::types::{PilotData, VariableRoles};
use crate::error::RmstPowerErr;

/// Stratum assignment resolved from a numeric label column: `ids[i]` indexes
/// into `levels`, which holds the distinct label values in ascending order.
#[derive(Debug, Clone)]
pub(crate) struct Strata {
    pub ids: Vec<usize>,
    pub levels: Vec<f64>,
}

impl Strata {
    fn from_labels(labels: &[f64]) -> Self {
        let mut levels: Vec<f64> = labels.to_vec();
        levels.sort_by(|a, b| a.total_cmp(b));
        levels.dedup();
        let ids = labels
            .iter()
            .map(|v| levels.partition_point(|l| l.total_cmp(v).is_lt()))
            .collect();
        Self { ids, levels }
    }

    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }
}

/// Pilot data with column roles resolved into typed vectors. This is the
/// form every estimator consumes, and the unit of bootstrap resampling.
#[derive(Debug, Clone)]
pub(crate) struct ModelFrame {
    pub time: Vec<f64>,
    pub status: Vec<u8>,
    pub arm: Vec<u8>,
    pub strata: Option<Strata>,
    pub dep_cens: Option<Vec<u8>>,
    pub linear: Vec<(String, Vec<f64>)>,
    pub smooth: Vec<(String, Vec<f64>)>,
}

fn require<'a>(
    data: &'a PilotData,
    role: &'static str,
    name: &str,
) -> Result<&'a [f64], RmstPowerErr> {
    data.column(name).ok_or_else(|| {
        DataValidationErr::MissingColumn {
            role,
            name: name.to_string(),
        }
        .into()
    })
}

fn as_binary(role: &'static str, name: &str, values: &[f64]) -> Result<Vec<u8>, RmstPowerErr> {
    values
        .iter()
        .map(|&v| {
            if v == 0.0 {
                Ok(0)
            } else if v == 1.0 {
                Ok(1)
            } else {
                Err(DataValidationErr::NonBinaryColumn {
                    role,
                    name: name.to_string(),
                    value: v,
                }
                .into())
            }
        })
        .collect()
}

fn all_finite(name: &str, values: &[f64]) -> Result<(), RmstPowerErr> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DataValidationErr::NonFiniteValue {
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

impl ModelFrame {
    /// Resolves roles against the table and runs every structural check that
    /// is fatal to the call (spec: validation errors are not recovered).
    pub fn resolve(data: &PilotData, roles: &VariableRoles) -> Result<Self, RmstPowerErr> {
        let time = require(data, "time", &roles.time)?.to_vec();
        if let Some(&bad) = time.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(DataValidationErr::InvalidTime(bad).into());
        }

        let status = as_binary("status", &roles.status, require(data, "status", &roles.status)?)?;
        let arm = as_binary("arm", &roles.arm, require(data, "arm", &roles.arm)?)?;

        let strata = match &roles.strata {
            Some(name) => {
                let labels = require(data, "strata", name)?;
                all_finite(name, labels)?;
                Some(Strata::from_labels(labels))
            }
            None => None,
        };

        let dep_cens = match &roles.dep_cens_status {
            Some(name) => {
                let col = as_binary(
                    "dependent-censoring status",
                    name,
                    require(data, "dependent-censoring status", name)?,
                )?;
                // Exactly one status outcome per modeled cause
                for (row, (&s, &d)) in status.iter().zip(col.iter()).enumerate() {
                    if s == 1 && d == 1 {
                        return Err(DataValidationErr::ConflictingCauseStatus { row }.into());
                    }
                }
                Some(col)
            }
            None => None,
        };

        let mut linear = Vec::with_capacity(roles.linear_terms.len());
        for name in &roles.linear_terms {
            let col = require(data, "linear term", name)?;
            all_finite(name, col)?;
            linear.push((name.clone(), col.to_vec()));
        }
        let mut smooth = Vec::with_capacity(roles.smooth_terms.len());
        for name in &roles.smooth_terms {
            let col = require(data, "smooth term", name)?;
            all_finite(name, col)?;
            smooth.push((name.clone(), col.to_vec()));
        }

        Ok(Self {
            time,
            status,
            arm,
            strata,
            dep_cens,
            linear,
            smooth,
        })
    }

    pub fn n(&self) -> usize {
        self.time.len()
    }

    /// Horizon checks are separate from role resolution because the same
    /// resolved frame may be reused across horizons by a caller.
    pub fn validate_horizon(&self, horizon: f64) -> Result<(), RmstPowerErr> {
        if !horizon.is_finite() || horizon <= 0.0 {
            return Err(DataValidationErr::NonPositiveHorizon(horizon).into());
        }
        let max_time = self.time.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if horizon > max_time {
            return Err(DataValidationErr::HorizonBeyondData { horizon, max_time }.into());
        }
        Ok(())
    }

    /// Row subset by (possibly repeated) indices; used for bootstrap
    /// replicates. Stratum levels keep their original coding so replicate
    /// fits can detect strata that vanished in the resample.
    pub fn subset(&self, idx: &[usize]) -> ModelFrame {
        let pick_f64 = |v: &[f64]| idx.iter().map(|&i| v[i]).collect::<Vec<f64>>();
        let pick_u8 = |v: &[u8]| idx.iter().map(|&i| v[i]).collect::<Vec<u8>>();
        ModelFrame {
            time: pick_f64(&self.time),
            status: pick_u8(&self.status),
            arm: pick_u8(&self.arm),
            strata: self.strata.as_ref().map(|s| Strata {
                ids: idx.iter().map(|&i| s.ids[i]).collect(),
                levels: s.levels.clone(),
            }),
            dep_cens: self.dep_cens.as_ref().map(|d| pick_u8(d)),
            linear: self
                .linear
                .iter()
                .map(|(n, v)| (n.clone(), pick_f64(v)))
                .collect(),
            smooth: self
                .smooth
                .iter()
                .map(|(n, v)| (n.clone(), pick_f64(v)))
                .collect(),
        }
    }
}
