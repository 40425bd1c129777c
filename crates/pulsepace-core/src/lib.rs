//! Core types and definitions for the pulsepace game loop.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, configuration, state snapshots, events, and
//! constants. It has no dependency on the ECS or any runtime framework.

pub mod actuator;
pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod display;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;
