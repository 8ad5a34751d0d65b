//! Document API boundary

pub mod ports;
