// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`vars`] submodule. `RUST_LOG` is read by the tracing filter directly.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `TALLY_STATE_DIR` if set and non-empty.
pub fn state_dir() -> Option<PathBuf> {
    non_empty_path(vars::TALLY_STATE_DIR)
}

/// Returns the value of `XDG_STATE_HOME` if set and non-empty.
pub fn xdg_state_home() -> Option<PathBuf> {
    non_empty_path(vars::XDG_STATE_HOME)
}

fn non_empty_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
