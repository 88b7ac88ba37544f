pub mod commands;
pub mod pairs;
