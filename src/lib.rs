pub mod admin;
pub mod cli;
pub mod config;
pub mod deployment;
pub mod item;
pub mod logging;
pub mod persistence;
pub mod protocol;
pub mod proxy;
pub mod registry;
pub mod server;
pub mod types;
