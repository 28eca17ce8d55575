//! `mapaudit` library crate.
//!
//! Re-exports the configuration and run orchestration for integration
//! testing. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod run;
