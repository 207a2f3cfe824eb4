//! # Presence Daemon
//!
//! Process wrapper around [`presence_core`]: loads `presence.toml`, sets up
//! logging, registers log and command-hook reactions per device and drives
//! one-shot or periodic scans until interrupted.

#![allow(missing_docs)]

pub mod cli;
pub mod config;
pub mod reactions;
pub mod runner;
