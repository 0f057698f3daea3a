use std::collections::HashMap;

/// Read access to environment variables.
///
/// The resolver never touches `std::env` directly so that embedders and tests
/// can supply their own environment.
pub trait EnvSource: Send + Sync {
    /// Returns the raw value of `name`, or `None` if it is not set.
    fn var(&self, name: &str) -> Option<String>;

    /// Returns the value of `name` only if it is set and non-empty.
    fn non_empty(&self, name: &str) -> Option<String> {
        self.var(name).filter(|v| !v.is_empty())
    }

    /// Returns `true` if `name` holds `true` (any case) or `1`.
    fn flag(&self, name: &str) -> bool {
        self.var(name).is_some_and(|v| is_truthy(&v))
    }
}

/// Environment backed by the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment backed by an explicit map.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// `true` (case-insensitive) and `1` enable a flag; everything else disables it.
pub fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
