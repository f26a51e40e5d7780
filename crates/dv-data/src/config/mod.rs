//! Input handling configuration

pub mod null_handling;

pub use null_handling::*;
