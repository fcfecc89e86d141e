pub mod bundle;
pub mod storage;
