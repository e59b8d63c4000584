//! # confres
//!
//! Configuration loading with environment-variable interpolation.
//!
//! `confres` reads YAML or TOML documents from a local path, a remote URL or
//! standard input, converts them into a [`serde_json::Value`] tree and
//! replaces environment-variable placeholders found in string leaves.
//!
//! ## Features
//!
//! - Shell-style placeholders: `$VAR`, `${VAR}`, `${VAR:-default}`,
//!   `${VAR:+alt}`, `${VAR:?message}` and their non-colon forms
//! - Pluggable variable sources ([`VarSource`]): process environment,
//!   in-memory maps, or a recording probe
//! - Enumeration of referenced variables without touching the environment
//! - YAML (`.yaml`, `.yml`) and TOML (`.toml`) documents
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use confres::{LoadOptions, load_config_file};
//!
//! let config = load_config_file("recipe.yml", &LoadOptions::default()).unwrap();
//! println!("{config:#}");
//! ```
//!
//! ## Modules
//!
//! - [`expand`] - Placeholder expansion engine and variable sources
//! - [`resolve`] - Recursive resolution over nested configuration values
//! - [`loader`] - Config file loading by format and location
//! - [`error`] - Error types

#[macro_use]
extern crate log;

/// Error types for loading and expansion.
pub mod error;

/// Placeholder expansion engine and variable sources.
pub mod expand;

/// Config file loading from local paths, URLs and stdin.
pub mod loader;

/// Recursive resolution of placeholders inside nested values.
pub mod resolve;

pub use error::{ConfigError, ExpandError};
pub use expand::{Expander, MapEnv, ProbeEnv, ProcessEnv, Unbound, VarSource};
pub use loader::{ConfigFormat, Fetch, HttpFetch, LoadOptions, load_config_file, load_config_file_with};
pub use resolve::{
    list_referenced_env_variables, resolve_element, resolve_element_with, resolve_env_variables,
    resolve_with,
};
pub use serde_json::Value;
