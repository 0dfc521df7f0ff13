//! Port traits: the I/O seams the domain depends on.

pub mod candle_port;
pub mod config_port;
