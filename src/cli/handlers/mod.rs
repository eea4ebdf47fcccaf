// src/cli/handlers/mod.rs

// One module per command; each exposes `handle(args)`.

pub mod args;
pub mod command;
pub mod commons;
pub mod panel;
pub mod pick;
pub mod reset;
pub mod set;
pub mod start;
pub mod stop;
