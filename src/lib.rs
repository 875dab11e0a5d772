//! Neon Field - animated particle network background
//!
//! Ninety drifting dots on a dark canvas, linked by faint lines when close,
//! gently pulled toward the pointer, over an indigo/purple haze.
//!
//! - `core`: simulation, rendering and lifecycle, host independent
//! - `web` (feature `wasm`): `<canvas>` host exported to JS as `NeonField`
//! - `app` (feature `gui`): native egui viewer
//! - `neon-cli` binary (feature `cli`): headless runner

pub mod config;
pub mod core;
pub mod theme;
pub mod time;

#[cfg(feature = "gui")]
pub mod app;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod web;
