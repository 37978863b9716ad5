pub mod naming;
pub mod storage;
