pub mod algorithm;
pub mod bench;
pub mod common;
pub mod config;
pub mod error;
pub mod map;
pub mod report;
pub mod scenario;
pub mod solver;
pub mod stat;
