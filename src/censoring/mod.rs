//----------------------------------------
// censoring mod
//----------------------------------------
pub(crate) mod cox;
pub(crate) mod ipcw;
pub(crate) mod km;
pub(crate) mod types;
