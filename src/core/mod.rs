// src/core/mod.rs

pub mod form;
pub mod launch_parser;
pub mod override_store;
pub mod paths;
pub mod session;
