//! Background jobs for the Orta Novias backend, runnable outside the API server.
//!
//! - [`cli`]: command-line definitions.
//! - [`commands`]: one-shot reminder and retry runs plus the long-running loop.

pub mod cli;
pub mod commands;
