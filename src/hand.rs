//! Per-frame analysis of a single detected hand.

pub mod fingers;
pub mod identity;
pub mod landmark;
