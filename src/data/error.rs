//----------------------------------------
// data validation errors
//----------------------------------------
use crate::error::RmstPowerErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataValidationErr {
    #[error("pilot dataset has no rows")]
    EmptyData,
    #[error("column {name} has {got} rows but the dataset has {expected}")]
    RaggedColumns {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("no column named {name} for the {role} role")]
    MissingColumn { role: &'static str, name: String },
    #[error("the requested model needs a {0} role but none was mapped")]
    RoleNotSupplied(&'static str),
    #[error("{role} column {name} should contain only 0/1; got {value}")]
    NonBinaryColumn {
        role: &'static str,
        name: String,
        value: f64,
    },
    #[error("observed times should be finite and non-negative; got {0}")]
    InvalidTime(f64),
    #[error("column {name} contains a non-finite value")]
    NonFiniteValue { name: String },
    #[error("truncation horizon should be positive; got {0}")]
    NonPositiveHorizon(f64),
    #[error(
        "truncation horizon {horizon} exceeds the largest observed time {max_time}; \
        power at this horizon would extrapolate beyond the pilot data"
    )]
    HorizonBeyondData { horizon: f64, max_time: f64 },
    #[error("row {row} has both the primary event and the dependent-censoring cause")]
    ConflictingCauseStatus { row: usize },
}

impl Into<RmstPowerErr> for DataValidationErr {
    fn into(self) -> RmstPowerErr {
        RmstPowerErr::DataValidation(self)
    }
}
