//! Storefront application: HTTP backend client, configuration, logging and terminal output
//! for the `storefront` command.

pub mod client;
pub mod config;
pub mod observability;
pub mod render;
