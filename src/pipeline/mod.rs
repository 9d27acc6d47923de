// Live frame pipeline — sampling, transform round trips, and display.

pub mod controller;
pub mod sampler;
pub mod sink;
pub mod stats;
