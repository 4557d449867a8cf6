//! Offline-first shopping list client.
//!
//! - [`categorize`] assigns grocery categories from item names
//! - [`sync`] queues list edits while offline and replays them on reconnect
//! - [`storage`] persists the queue (SQLite or in-memory)
//! - [`ui`] renders notifications and the grouped list in a terminal

pub mod categorize;
pub mod config;
pub mod storage;
pub mod sync;
pub mod ui;
pub mod util;
