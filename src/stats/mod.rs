//----------------------------------------
// stats mod
//----------------------------------------
pub mod error;
pub(crate) mod linalg;
pub mod normal;
