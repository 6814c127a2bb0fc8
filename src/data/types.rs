use serde::{Deserialize, Serialize};

use crate::data::error::DataValidationErr;
use crate::error::RmstPowerErr;

/// One named numeric column of a pilot dataset. Binary roles (status, arm,
/// dependent-censoring cause) are carried as 0.0/1.0 and checked when the
/// roles are resolved; stratum labels are carried as arbitrary numeric codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Immutable tabular pilot dataset: one row per subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotData {
    columns: Vec<Column>,
    n_rows: usize,
}

impl PilotData {
    pub fn new(columns: Vec<Column>) -> Result<Self, RmstPowerErr> {
        let n_rows = match columns.first() {
            Some(c) => c.values.len(),
            None => return Err(DataValidationErr::EmptyData.into()),
        };
        if n_rows == 0 {
            return Err(DataValidationErr::EmptyData.into());
        }
        for (i, col) in columns.iter().enumerate() {
            if col.values.len() != n_rows {
                return Err(DataValidationErr::RaggedColumns {
                    name: col.name.clone(),
                    expected: n_rows,
                    got: col.values.len(),
                }
                .into());
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(DataValidationErr::DuplicateColumn(col.name.clone()).into());
            }
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }
}

/// Maps dataset column names onto the roles the estimators need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableRoles {
    pub time: String,
    pub status: String,
    pub arm: String,
    pub strata: Option<String>,
    pub dep_cens_status: Option<String>,
    pub linear_terms: Vec<String>,
    pub smooth_terms: Vec<String>,
}

impl VariableRoles {
    pub fn new(
        time: impl Into<String>,
        status: impl Into<String>,
        arm: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            status: status.into(),
            arm: arm.into(),
            ..Default::default()
        }
    }

    pub fn with_strata(mut self, name: impl Into<String>) -> Self {
        self.strata = Some(name.into());
        self
    }

    pub fn with_dep_cens_status(mut self, name: impl Into<String>) -> Self {
        self.dep_cens_status = Some(name.into());
        self
    }

    pub fn with_linear_terms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.linear_terms = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_smooth_terms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.smooth_terms = names.into_iter().map(Into::into).collect();
        self
    }
}
