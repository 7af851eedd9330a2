//! Vesper Combat - turn-based combat resolution with data-driven rules

pub mod combat;
pub mod core;
pub mod rules;
