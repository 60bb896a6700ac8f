use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ConfigBuilder, TermLogger};

/// Dependency modules silenced below Trace. The HTTP stack logs every
/// connection and chunk, which drowns out per-session and per-tick records.
const FILTERED_MODULES: &[&str] = &["tower", "tracing", "hyper", "axum", "reqwest", "h2"];

pub struct Logger {}

impl Logger {
    /// Installs the global console logger for the configured level.
    ///
    /// Fails only if a logger was already installed for this process.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;
        let log_config = Self::build_log_config(Self::should_filter_dependencies(level));

        TermLogger::init(
            level,
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder
            .set_time_format_rfc3339()
            .set_thread_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Error);

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
