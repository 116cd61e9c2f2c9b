//! # ML Minesweeper
//!
//! A Minesweeper engine driven by a Deep Q-Network agent that learns which
//! cell to open next. Networks are built with the Burn ML framework.
//!
//! ## Modules
//!
//! - [`game`] — Board engine: cells, lazy mine placement, flood fill, flags
//! - [`ai`] — Agent traits, DQN and random agents, Q-network, observations
//! - [`training`] — Episode loop, replay buffer, rewards, evaluation, telemetry
//! - [`checkpoint`] — Saving and loading learned parameters
//! - [`render`] — Text rendering of the board
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

#![recursion_limit = "256"]

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod render;
pub mod training;
