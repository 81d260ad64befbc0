#![forbid(unsafe_code)]

pub mod config;
pub mod model;
pub mod quiz;

pub use config::EngineConfig;
