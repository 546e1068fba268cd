// src/io/mod.rs

pub mod reporting;
pub mod scenario;
