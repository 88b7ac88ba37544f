pub mod starred;
pub mod storage;
