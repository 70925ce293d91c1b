//! Configuration loading from environment variables.

use crate::constants::{
    AUTO_AFFORDANCE_ENV, DEFAULT_PAINT_CHUNK, DEFAULT_TRANSIENT_FIELDS, PAINT_CHUNK_ENV,
    TRANSIENT_FIELDS_ENV,
};
use serde::Deserialize;
use std::env;

/// Runtime configuration shared by managers and renderers.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Items appended per chunk during a bulk paint.
    pub paint_chunk_size: usize,
    /// Field names excluded from snapshots.
    pub transient_fields: Vec<String>,
    /// Whether standalone managers show/hide a shared save bar themselves.
    pub auto_affordance: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paint_chunk_size: DEFAULT_PAINT_CHUNK,
            transient_fields: DEFAULT_TRANSIENT_FIELDS
                .iter()
                .map(|field| field.to_string())
                .collect(),
            auto_affordance: true,
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// # Arguments
/// - `name`: Environment variable name.
/// - `default`: Value used when the variable is missing or unrecognized.
pub fn env_flag_enabled(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(default)
}

/// Split a comma-separated field list, dropping blanks.
fn parse_field_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or invalid.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            paint_chunk_size: env::var(PAINT_CHUNK_ENV)
                .ok()
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.paint_chunk_size),
            transient_fields: env::var(TRANSIENT_FIELDS_ENV)
                .map(|raw| parse_field_list(&raw))
                .unwrap_or(defaults.transient_fields),
            auto_affordance: env_flag_enabled(AUTO_AFFORDANCE_ENV, defaults.auto_affordance),
        }
    }
}
