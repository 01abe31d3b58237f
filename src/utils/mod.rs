//! Utility functions for vget

pub mod filename;

pub use filename::*;
