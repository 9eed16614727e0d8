//! Personal dashboard of small trackers: projects, goals, mood, to-dos, wishlist and a household
//! budget. Everything is stored locally, either as JSON documents or JSON Lines collections, and
//! can be moved between machines with manual JSON backups.
//!

pub mod backup;
pub mod cli;
pub mod fs;
pub mod storage;
pub mod trackers;
pub mod utils;
