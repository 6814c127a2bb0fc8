//----------------------------------------
// censoring weight types
//----------------------------------------

/// Inverse-probability-of-censoring weights for the subjects that enter
/// a weighted regression. `retained` holds frame row indices (ascending)
/// of the subjects whose truncated outcome is known AND whose weight is
/// defined; `weights` is parallel to it. `n_dropped` counts subjects
/// with a known outcome whose weight was undefined (zero estimated
/// censoring survival) and who were therefore excluded.
///
/// Computed fresh for every fit, never persisted.
#[derive(Debug, Clone)]
pub(crate) struct CensoringWeights {
    pub weights: Vec<f64>,
    pub retained: Vec<usize>,
    pub n_dropped: usize,
}
