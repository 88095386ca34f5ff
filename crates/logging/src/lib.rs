// crates/logging/src/lib.rs

//! Console output for the sync tool.
//!
//! Everything user-facing goes through `tracing`: copied paths at INFO,
//! per-entry skip reasons at DEBUG, traversal detail at TRACE. The
//! subscriber prints bare messages without timestamps or level tags, so
//! the default output reads like a plain file listing.

use std::io;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, fmt as tracing_fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Verbosity selection for one process.
#[derive(Clone, Copy, Debug)]
pub struct SubscriberConfig {
    /// Count of `-v` flags.
    pub verbose: u8,
    /// Errors only; overrides `verbose`.
    pub quiet: bool,
    pub colored: bool,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            quiet: false,
            colored: true,
        }
    }
}

fn level(cfg: &SubscriberConfig) -> LevelFilter {
    if cfg.quiet {
        LevelFilter::ERROR
    } else if cfg.verbose > 1 {
        LevelFilter::TRACE
    } else if cfg.verbose > 0 {
        LevelFilter::DEBUG
    } else {
        // Copied paths print by default.
        LevelFilter::INFO
    }
}

pub fn subscriber(
    cfg: SubscriberConfig,
) -> io::Result<Box<dyn tracing::Subscriber + Send + Sync>> {
    let filter = EnvFilter::builder()
        .with_default_directive(level(&cfg).into())
        .from_env_lossy();
    let fmt_layer = tracing_fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(false)
        .without_time()
        .with_ansi(cfg.colored);
    let registry = tracing_subscriber::registry().with(filter).with(fmt_layer);
    Ok(Box::new(registry))
}

pub fn init(cfg: SubscriberConfig) -> io::Result<()> {
    subscriber(cfg)?.init();
    Ok(())
}

pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["", "K", "M", "G", "T", "P", "E"];
    let mut size = bytes as f64;
    let mut unit = 0usize;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        size.trunc().to_string()
    } else {
        format!("{:.2}{}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_mapping() {
        let cfg = SubscriberConfig::default();
        assert_eq!(level(&cfg), LevelFilter::INFO);
        assert_eq!(
            level(&SubscriberConfig {
                verbose: 1,
                ..cfg
            }),
            LevelFilter::DEBUG
        );
        assert_eq!(
            level(&SubscriberConfig {
                verbose: 3,
                ..cfg
            }),
            LevelFilter::TRACE
        );
        assert_eq!(
            level(&SubscriberConfig {
                quiet: true,
                verbose: 2,
                ..cfg
            }),
            LevelFilter::ERROR
        );
    }

    #[test]
    fn human_bytes_scales() {
        assert_eq!(human_bytes(512), "512");
        assert_eq!(human_bytes(2048), "2.00K");
        assert_eq!(human_bytes(5 * 1024 * 1024), "5.00M");
    }
}
