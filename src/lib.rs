//! Simulation core for a side-on arena survival game.
//!
//! Everything in this crate is pure game state and per-tick logic; the
//! terminal front-end in `main.rs` only feeds input snapshots in and draws
//! finished frames out.

pub mod animation;
pub mod compute;
pub mod config;
pub mod effects;
pub mod enemy;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod grenade;
pub mod player;
pub mod popup;
pub mod potion;
pub mod render;
pub mod services;
pub mod spawner;
