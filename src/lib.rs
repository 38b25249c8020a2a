//! linkbot - an IRC bot that logs a channel's traffic to an append-only
//! file and keeps a small persistent registry of named accounts.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod factory;
pub mod logger;
pub mod session;
