#![forbid(unsafe_code)]

pub mod keys;
mod mapping;
pub mod repository;
pub mod sqlite;
