use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "0.0.0.0:8787";

/// Server settings, read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `POOL_BIND`
    pub bind: String,
    /// `POOL_DATA_DIR`. Unset keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// `POOL_ADMIN_TOKEN`. When set, posting results requires it as a bearer token.
    pub admin_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_string(), data_dir: None, admin_token: None }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            bind: non_empty("POOL_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            data_dir: non_empty("POOL_DATA_DIR").map(PathBuf::from),
            admin_token: non_empty("POOL_ADMIN_TOKEN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(ServerConfig::from_lookup(lookup(&[])), ServerConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("POOL_BIND", "127.0.0.1:9000"),
            ("POOL_DATA_DIR", "/var/lib/pool"),
            ("POOL_ADMIN_TOKEN", "s3cret"),
        ]));
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/pool")));
        assert_eq!(config.admin_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = ServerConfig::from_lookup(lookup(&[("POOL_ADMIN_TOKEN", "  "), ("POOL_DATA_DIR", "")]));
        assert!(config.admin_token.is_none());
        assert!(config.data_dir.is_none());
    }
}
