//! Process-level infrastructure shared by the gateway crates: command line /
//! environment configuration and console logging.

pub mod config;
pub mod logging;
