//! Shared constants used across Curio crates.

/// Items appended per chunk when bulk-painting a freshly shown scope.
pub const DEFAULT_PAINT_CHUNK: usize = 25;

/// Fields dropped from snapshots because they hold runtime-only references.
pub const DEFAULT_TRANSIENT_FIELDS: &[&str] = &["parent", "domElement"];

/// Key carrying the soft-delete marker on JSON records.
pub const DELETED_MARKER_KEY: &str = "_deleted";

/// Key carrying a record's stable identity.
pub const RECORD_ID_KEY: &str = "id";

/// Default tracing filter for the CLI when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "curio=info,curio_core=info";

/// Environment variable overriding [`DEFAULT_PAINT_CHUNK`].
pub const PAINT_CHUNK_ENV: &str = "CURIO_PAINT_CHUNK";

/// Environment variable holding comma-separated transient field names.
pub const TRANSIENT_FIELDS_ENV: &str = "CURIO_TRANSIENT_FIELDS";

/// Environment flag controlling whether managers drive a save bar themselves.
pub const AUTO_AFFORDANCE_ENV: &str = "CURIO_AUTO_AFFORDANCE";

/// Every variable read by `Config::from_env`.
pub const CONFIG_ENV_VARS: &[&str] = &[PAINT_CHUNK_ENV, TRANSIENT_FIELDS_ENV, AUTO_AFFORDANCE_ENV];
