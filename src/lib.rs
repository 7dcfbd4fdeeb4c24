#[macro_use] pub mod core;

pub mod cli;
pub mod config;
pub mod db;
pub mod formats;
pub mod model;
pub mod storage;
pub mod styling;
pub mod types;
