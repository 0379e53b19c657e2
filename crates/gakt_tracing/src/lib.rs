use tracing_subscriber::EnvFilter;

pub use tracing::{debug, debug_span, error, field, info, info_span, instrument, warn, Instrument};

pub struct Config {
    pub service_name: &'static str,
    /// Turns on debug output when `RUST_LOG` is unset, e.g. for re-runs with
    /// step debug logging enabled.
    pub debug: bool,
}

/// Installs a global fmt subscriber writing to stderr. Stdout carries the
/// workflow commands read by the runner and must stay free of log lines.
pub fn setup(config: Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config));

    let res = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Err(err) = res {
        eprintln!("setting global default tracing subscriber failed: {}", err);
    }

    tracing::debug!(service.name = config.service_name, "tracing initialized");
}

fn default_filter(config: &Config) -> EnvFilter {
    let level = if config.debug { "debug" } else { "info" };
    EnvFilter::new(format!(
        "{service}={level},gakt_github={level},gakt_kms={level}",
        service = config.service_name,
        level = level,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_workspace_crates() {
        let filter = default_filter(&Config {
            service_name: "gakt_action",
            debug: true,
        });
        let rendered = filter.to_string();
        assert!(rendered.contains("gakt_action=debug"));
        assert!(rendered.contains("gakt_github=debug"));
        assert!(rendered.contains("gakt_kms=debug"));
    }

    #[test]
    fn default_filter_is_info_without_debug() {
        let filter = default_filter(&Config {
            service_name: "gakt_action",
            debug: false,
        });
        let rendered = filter.to_string();
        assert!(rendered.contains("gakt_action=info"));
        assert!(rendered.contains("gakt_github=info"));
        assert!(!rendered.contains("debug"));
    }
}
