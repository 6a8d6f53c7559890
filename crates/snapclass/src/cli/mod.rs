//! Command handlers. Each submodule owns one subcommand's arguments and
//! `execute` function; `interactive` drives the same handlers from menus.

pub mod classify;
pub mod config;
pub mod fetch;
pub mod interactive;
pub mod models;
pub mod render;
pub mod reset;
pub mod types;
pub mod usage;
