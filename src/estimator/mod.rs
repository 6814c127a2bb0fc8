//----------------------------------------
// Effect estimation
//----------------------------------------
pub(crate) mod depcens;
pub(crate) mod design;
pub mod error;
pub(crate) mod fit;
pub(crate) mod linear;
pub(crate) mod pseudo;
pub(crate) mod stratified;
pub mod types;
pub(crate) mod wls;
