//----------------------------------------
// data mod
//----------------------------------------
pub mod error;
pub(crate) mod frame;
pub mod types;
