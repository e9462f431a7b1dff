use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Names recognized as enumerated constants without a reserved prefix.
pub const DEFAULT_ENUM_CONSTANTS: &[&str] = &["PLAY", "REW", "FF", "EMPTY", "DISCINSERT", "EJECT"];

/// Reserved prefixes of enumerated-constant names.
pub const DEFAULT_ENUM_PREFIXES: &[&str] = &["IN_"];

/// Default bound on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 500;

/// Configuration of a verification run.
///
/// ```
/// use guard_equiv::config::Config;
///
/// let config = Config::default().with_int_bits(8).with_jobs(4);
/// assert_eq!(config.int_bits, Some(8));
/// assert_eq!(config.jobs, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Width of integer variables in bits. `None` picks a width per pair.
    pub int_bits: Option<u32>,
    /// Maximum number of BDD nodes a single query may allocate.
    pub max_nodes: usize,
    /// Wall-clock bound of a single query.
    #[serde(with = "duration_millis")]
    pub timeout: Option<Duration>,
    /// Number of batch workers.
    pub jobs: usize,
    /// Deepest expression nesting accepted by the parser.
    pub max_depth: usize,
    /// Closed set of enumerated-constant names.
    pub enum_constants: Vec<String>,
    /// Reserved prefixes of enumerated-constant names.
    pub enum_prefixes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            int_bits: None,
            max_nodes: 1 << 22,
            timeout: None,
            jobs: 1,
            max_depth: DEFAULT_MAX_DEPTH,
            enum_constants: DEFAULT_ENUM_CONSTANTS.iter().map(|s| s.to_string()).collect(),
            enum_prefixes: DEFAULT_ENUM_PREFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn with_int_bits(mut self, bits: u32) -> Self {
        self.int_bits = Some(bits);
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check whether `name` denotes an enumerated constant.
    pub fn is_enum_constant(&self, name: &str) -> bool {
        self.enum_constants.iter().any(|c| c == name) || self.enum_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// Load a configuration from a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_enum_constants() {
        let config = Config::default();
        assert!(config.is_enum_constant("IN_PLAY"));
        assert!(config.is_enum_constant("IN_NO_ACTIVE_CHILD"));
        assert!(config.is_enum_constant("EJECT"));
        assert!(!config.is_enum_constant("EJECTED"));
        assert!(!config.is_enum_constant("dw.is_c1"));
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json(r#"{ "int_bits": 12, "timeout": 250 }"#).unwrap();
        assert_eq!(config.int_bits, Some(12));
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.jobs, 1);
        assert_eq!(config.max_nodes, 1 << 22);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = Config::default().with_timeout(Duration::from_secs(2)).with_jobs(0);
        assert_eq!(config.jobs, 1);
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&text).unwrap(), config);
    }
}
