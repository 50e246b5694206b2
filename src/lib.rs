//! Blockout - interior scene descriptions to resolved scene graphs

pub mod core;
pub mod math;
pub mod scene;
pub mod backend;
pub mod generation;
