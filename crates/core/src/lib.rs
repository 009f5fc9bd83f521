#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Cherry Arcade front end.
//!
//! This crate hosts the game catalog, the persisted leaderboard, the
//! Cyber-Santa chat session and the navigation state used by the
//! terminal UI and any future frontends.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod leaderboard;
pub mod models;
pub mod storage;
pub mod view;

pub use catalog::Catalog;
pub use chat::{ChatSession, GeminiResponder};
pub use config::AppConfig;
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use models::Game;
pub use storage::LocalStore;
pub use view::{NavOrigin, NavTarget, View, ViewController};
