//! Photo gallery library.
//!
//! A single flat gallery of photo records kept in step with a file store and a
//! key-value store, behind a mode-specific media backend. The `gallery` binary
//! is a thin CLI over this crate.
//!
//! # Modules
//!
//! - `controller`: the gallery controller (initialize, capture, persist, delete)
//! - `backend`: native and web media backends
//! - `services`: collaborator traits and their local and mock implementations
//! - `record`: photo records and their stored form
//! - `config`: TOML configuration and service wiring
//! - `output`: robot and human output
#![forbid(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod output;
pub mod record;
pub mod services;
pub mod theme;
