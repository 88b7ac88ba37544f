pub mod dexscreener;
pub mod settings;
pub mod storage;
pub mod time;
