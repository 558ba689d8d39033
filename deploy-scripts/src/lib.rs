//! Scripts for provisioning, configuring and inspecting the CDP contracts.

pub mod backends;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod errors;
pub mod manifest;
pub mod scenarios;
pub mod types;
pub mod utils;
