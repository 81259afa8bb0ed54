pub mod catalog;
pub mod config;
pub mod stats;
pub mod timer;
