//! Scoped environment overrides for configuration tests.
//!
//! Environment variables are process-global, so every override holds one
//! shared lock for its whole lifetime and restores the previous values on
//! drop.

use crate::constants::CONFIG_ENV_VARS;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// Lock serializing environment mutation across test threads.
pub(crate) fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Holds the environment lock and restores overridden variables on drop.
pub(crate) struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Apply `overrides`, where `None` unsets the variable.
    ///
    /// Blocks until no other guard is alive. A lock poisoned by a panicking
    /// test is taken over, since the previous guard already restored its
    /// variables while unwinding.
    pub(crate) fn apply(overrides: &[(&str, Option<&str>)]) -> Self {
        let lock = env_lock().lock().unwrap_or_else(PoisonError::into_inner);
        let mut saved = Vec::with_capacity(overrides.len());
        for (key, value) in overrides {
            saved.push((key.to_string(), std::env::var(key).ok()));
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
        Self { saved, _lock: lock }
    }

    /// Unset every variable read by `Config::from_env`.
    pub(crate) fn clean_config() -> Self {
        let cleared: Vec<(&str, Option<&str>)> =
            CONFIG_ENV_VARS.iter().map(|key| (*key, None)).collect();
        Self::apply(&cleared)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            match previous {
                Some(previous) => std::env::set_var(&key, previous),
                None => std::env::remove_var(&key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EnvGuard;

    const KEY: &str = "CURIO_TEST_ENV_GUARD";
    const REPEATED_KEY: &str = "CURIO_TEST_ENV_GUARD_REPEATED";

    #[test]
    fn guard_restores_previous_values() {
        {
            let _outer = EnvGuard::apply(&[(KEY, Some("before"))]);
        }
        assert!(std::env::var(KEY).is_err());

        std::env::set_var(KEY, "kept");
        {
            let _guard = EnvGuard::apply(&[(KEY, Some("after"))]);
            assert_eq!(std::env::var(KEY).ok().as_deref(), Some("after"));
        }
        assert_eq!(std::env::var(KEY).ok().as_deref(), Some("kept"));

        {
            let _guard = EnvGuard::apply(&[(KEY, None)]);
            assert!(std::env::var(KEY).is_err());
        }
        assert_eq!(std::env::var(KEY).ok().as_deref(), Some("kept"));
        std::env::remove_var(KEY);
    }

    #[test]
    fn repeated_keys_unwind_to_the_original() {
        {
            let _guard =
                EnvGuard::apply(&[(REPEATED_KEY, Some("one")), (REPEATED_KEY, Some("two"))]);
            assert_eq!(std::env::var(REPEATED_KEY).ok().as_deref(), Some("two"));
        }
        assert!(std::env::var(REPEATED_KEY).is_err());
    }
}
