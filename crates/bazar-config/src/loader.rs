// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./bazar.toml` > `~/.config/bazar/bazar.toml` >
//! `/etc/bazar/bazar.toml` with environment variable overrides via the
//! `BAZAR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BazarConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bazar/bazar.toml` (system-wide)
/// 3. `~/.config/bazar/bazar.toml` (user XDG config)
/// 4. `./bazar.toml` (local directory)
/// 5. `BAZAR_*` environment variables
pub fn load_config() -> Result<BazarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BazarConfig::default()))
        .merge(Toml::file("/etc/bazar/bazar.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("bazar/bazar.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("bazar.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<BazarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BazarConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BazarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BazarConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BAZAR_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("BAZAR_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("recommend_", "recommend.", 1);
        mapped.into()
    })
}
