//! Route handlers

pub mod sensors;
pub mod temperature;
