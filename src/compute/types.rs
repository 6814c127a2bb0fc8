//----------------------------------------
// compute mod types
//----------------------------------------

/// Default two-sided significance level for every power calculation
pub const DEFAULT_ALPHA: f64 = 0.05;

pub use crate::data::types::{Column, PilotData, VariableRoles};
pub use crate::estimator::types::{EffectFit, ModelKind, SampleUnit};
pub use crate::power::types::{
    BootPowerAnalysis, BootPowerRow, BootSettings, CancelToken, PowerAnalysis, PowerRow,
};
pub use crate::search::types::{SampleSizeResult, SearchSettings, SearchStatus, SearchStep};
