//! Configuration loading from graphmark.toml
//!
//! Harness configuration can be specified in a `graphmark.toml` file in the
//! project root. The configuration is automatically discovered by walking up
//! from the current directory.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fallback worker time limit when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Fallback grace period after forced termination.
pub const DEFAULT_TERMINATION_GRACE: Duration = Duration::from_secs(2);

/// Graphmark configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphmarkConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Runner configuration for benchmark execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Wall-clock limit for a single worker (e.g., "90s", "15m", "2h")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Wait after forcibly terminating a worker, letting the OS reclaim
    /// process resources before the next run is launched (e.g., "2s")
    #[serde(default = "default_termination_grace")]
    pub termination_grace: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            termination_grace: default_termination_grace(),
        }
    }
}

fn default_timeout() -> String {
    "1h".to_string()
}
fn default_termination_grace() -> String {
    "2s".to_string()
}

impl GraphmarkConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("graphmark.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// The configured worker time limit, falling back to the default when the
    /// duration string does not parse.
    pub fn worker_timeout(&self) -> Duration {
        Self::parse_duration(&self.runner.timeout).unwrap_or(DEFAULT_TIMEOUT)
    }

    /// The configured post-termination grace period, falling back to the
    /// default when the duration string does not parse.
    pub fn termination_grace(&self) -> Duration {
        Self::parse_duration(&self.runner.termination_grace).unwrap_or(DEFAULT_TERMINATION_GRACE)
    }

    /// Parse a duration string (e.g., "500ms", "90s", "15m", "2h")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if value < 0.0 {
            return Err(anyhow::anyhow!("Negative duration: {}", s));
        }

        let seconds = match unit_part.to_lowercase().as_str() {
            "ms" => value / 1_000.0,
            "s" | "" => value,
            "m" | "min" => value * 60.0,
            "h" => value * 3_600.0,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };
        Ok(Duration::from_secs_f64(seconds))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphmarkConfig::default();
        assert_eq!(config.runner.timeout, "1h");
        assert_eq!(config.runner.termination_grace, "2s");
        assert_eq!(config.worker_timeout(), Duration::from_secs(3600));
        assert_eq!(config.termination_grace(), Duration::from_secs(2));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(
            GraphmarkConfig::parse_duration("500ms").unwrap(),
            Duration::from_millis(500)
        );
        assert_eq!(
            GraphmarkConfig::parse_duration("90s").unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(
            GraphmarkConfig::parse_duration("15m").unwrap(),
            Duration::from_secs(900)
        );
        assert_eq!(
            GraphmarkConfig::parse_duration("2h").unwrap(),
            Duration::from_secs(7200)
        );
        assert_eq!(
            GraphmarkConfig::parse_duration("1.5s").unwrap(),
            Duration::from_millis(1500)
        );
        // A bare number counts as seconds.
        assert_eq!(
            GraphmarkConfig::parse_duration("30").unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(GraphmarkConfig::parse_duration("").is_err());
        assert!(GraphmarkConfig::parse_duration("ten seconds").is_err());
        assert!(GraphmarkConfig::parse_duration("10 fortnights").is_err());
        assert!(GraphmarkConfig::parse_duration("-5s").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            timeout = "15m"
        "#;

        let config: GraphmarkConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.worker_timeout(), Duration::from_secs(900));
        // Defaults should still apply
        assert_eq!(config.runner.termination_grace, "2s");
    }

    #[test]
    fn test_unparseable_values_fall_back_to_defaults() {
        let config: GraphmarkConfig = toml::from_str(
            r#"
            [runner]
            timeout = "soon"
            termination_grace = "a bit"
        "#,
        )
        .unwrap();
        assert_eq!(config.worker_timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.termination_grace(), DEFAULT_TERMINATION_GRACE);
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphmark.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[runner]").unwrap();
        writeln!(file, "timeout = \"45s\"").unwrap();
        drop(file);

        let config = GraphmarkConfig::load(&path).unwrap();
        assert_eq!(config.worker_timeout(), Duration::from_secs(45));
    }
}
