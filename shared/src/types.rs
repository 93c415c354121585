//! Cross-cutting value types

use serde::{Deserialize, Serialize};

/// Result of asking an external collaborator (tax table, geo lookup,
/// exchange rates) for a value.
///
/// A slow or failing collaborator never fails the caller's request: the
/// caller gets `Degraded` carrying a safe default and decides whether to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Lookup<T> {
    /// Value produced by the collaborator (or a still-valid cache entry)
    Fresh(T),
    /// Collaborator unavailable; value is the configured fallback
    Degraded(T),
}

impl<T> Lookup<T> {
    /// Take the value regardless of where it came from
    pub fn into_value(self) -> T {
        match self {
            Lookup::Fresh(v) | Lookup::Degraded(v) => v,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Lookup::Fresh(v) | Lookup::Degraded(v) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Lookup::Degraded(_))
    }

    /// Map the carried value, keeping the freshness flag
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Fresh(v) => Lookup::Fresh(f(v)),
            Lookup::Degraded(v) => Lookup::Degraded(f(v)),
        }
    }
}
