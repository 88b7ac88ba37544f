pub mod components;
pub mod config;
pub mod db;
pub mod models;
pub mod utils;
pub mod views;
pub mod workers;
