//! Content manager for a band website: music player, videos, photo gallery,
//! tour dates, bio and fan mail, stored in one local SQLite file.

pub mod cli;
pub mod clock;
pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod events;
pub mod gallery;
pub mod handles;
pub mod player;
pub mod session;
pub mod storage;
pub mod ui;
pub mod upload;
