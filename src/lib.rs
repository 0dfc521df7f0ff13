//! kuri: a sandboxed indicator scripting language for OHLCV candle data.
//!
//! Hexagonal architecture: the compiler pipeline and execution engines live in
//! [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`], and the `kuri` binary's command surface in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
