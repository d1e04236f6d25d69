//! Mailbox chess engine: a sentinel-padded board with offset-table move
//! generation, attack detection and bounded make/take-back.

pub mod config;
pub mod engine;
