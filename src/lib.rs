//! Hayfield library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is a headless runner around `HayfieldPlugin`.
//! This library crate exposes the same modules so that `tests/` integration
//! tests and embedders can import game types, systems, and resources without
//! needing a window or GPU.

pub mod shared;
pub mod config;
pub mod farming;
pub mod economy;
pub mod save;
pub mod data;
pub mod engine;

pub use engine::HayfieldPlugin;
