use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates that get the configured level when `RUST_LOG` is unset
const LOGGED_CRATES: &[&str] = &["ctf_session_cli", "ctf_session_core", "ctf_session_p2p"];

/// How the CLI writes logs.
///
/// `RUST_LOG` wins when set. Otherwise everything is at `warn` except this
/// workspace's crates, which log at `default_level`, and the matchbox socket,
/// which logs at `info`.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub default_level: tracing::Level,
    /// One JSON object per line instead of human-readable output
    pub json_format: bool,
    pub show_thread_ids: bool,
    pub show_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: tracing::Level::INFO,
            json_format: false,
            show_thread_ids: false,
            show_targets: true,
        }
    }
}

impl LogConfig {
    /// Verbose, human-readable
    pub fn dev() -> Self {
        Self {
            default_level: tracing::Level::DEBUG,
            show_thread_ids: true,
            ..Default::default()
        }
    }

    /// Structured output for log collectors
    pub fn json() -> Self {
        Self {
            json_format: true,
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.default_level = level;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let mut filter = EnvFilter::new("warn");
            for krate in LOGGED_CRATES {
                if let Ok(directive) = format!("{}={}", krate, self.default_level).parse() {
                    filter = filter.add_directive(directive);
                }
            }
            if let Ok(directive) = "matchbox_socket=info".parse() {
                filter = filter.add_directive(directive);
            }
            filter
        })
    }

    /// Build the filter and layers from the CLI's `--verbose` and
    /// `--json-logs` flags
    pub fn from_flags(verbose: bool, json: bool) -> Self {
        let config = if json { Self::json() } else { Self::default() };
        if verbose {
            config.with_level(tracing::Level::DEBUG)
        } else {
            config
        }
    }

    /// Install the global subscriber. Fails if one is already set.
    pub fn init(self) -> Result<(), String> {
        let json_layer = self.json_format.then(|| {
            fmt::layer()
                .json()
                .with_target(self.show_targets)
                .with_thread_ids(self.show_thread_ids)
        });
        let text_layer = (!self.json_format).then(|| {
            fmt::layer()
                .with_target(self.show_targets)
                .with_thread_ids(self.show_thread_ids)
        });

        tracing_subscriber::registry()
            .with(self.env_filter())
            .with(json_layer)
            .with(text_layer)
            .try_init()
            .map_err(|e| format!("tracing subscriber already installed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.default_level, tracing::Level::INFO);
        assert!(!config.json_format);
        assert!(config.show_targets);
    }

    #[test]
    fn test_dev_config() {
        let config = LogConfig::dev();
        assert_eq!(config.default_level, tracing::Level::DEBUG);
        assert!(config.show_thread_ids);
    }

    #[test]
    fn test_from_flags() {
        let config = LogConfig::from_flags(true, false);
        assert_eq!(config.default_level, tracing::Level::DEBUG);
        assert!(!config.json_format);

        let config = LogConfig::from_flags(false, true);
        assert_eq!(config.default_level, tracing::Level::INFO);
        assert!(config.json_format);
    }

    #[test]
    fn test_json_config() {
        let config = LogConfig::json().with_level(tracing::Level::TRACE);
        assert!(config.json_format);
        assert_eq!(config.default_level, tracing::Level::TRACE);
    }
}
