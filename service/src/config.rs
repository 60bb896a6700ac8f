use clap::builder::TypedValueParser as _;
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::time::Duration;

/// Path prefix under which static assets are served.
pub const STATIC_PREFIX: &str = "/static";

/// Fixed path of the server-push endpoint.
pub const EVENTS_PATH: &str = "/events";

/// Which generator feeds the shared value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValueSourceKind {
    /// A random `{ name, address }` record per tick.
    Person,
    /// A monotonically increasing integer per tick.
    Counter,
}

impl fmt::Display for ValueSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueSourceKind::Person => write!(f, "person"),
            ValueSourceKind::Counter => write!(f, "counter"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 8000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Milliseconds between two refreshes of the published value
    #[arg(long, env, default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_interval_ms: u64,

    /// Generator used to produce new published values
    #[arg(long, env, value_enum, default_value_t = ValueSourceKind::Person)]
    pub value_source: ValueSourceKind,

    /// Directory served read-only under /static
    #[arg(long, env, default_value = "./static")]
    static_dir: String,

    /// Document under the static directory that / redirects to
    #[arg(long, env, default_value = "index.html")]
    index_document: String,

    /// Seconds between keep-alive comments on idle event streams (0 disables them)
    #[arg(long, env, default_value_t = 15)]
    pub keep_alive_secs: u64,

    /// Base URL of an upstream HTTP service that answers every non-streaming route.
    /// When unset, the built-in task API answers instead.
    #[arg(long, env)]
    fallback_url: Option<String>,

    /// Timeout in seconds for a request forwarded to the upstream fallback
    #[arg(long, env, default_value_t = 30)]
    pub fallback_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// `None` when keep-alive comments are disabled.
    pub fn keep_alive(&self) -> Option<Duration> {
        (self.keep_alive_secs > 0).then(|| Duration::from_secs(self.keep_alive_secs))
    }

    pub fn static_dir(&self) -> &str {
        &self.static_dir
    }

    /// Location the root route redirects to, e.g. `/static/index.html`.
    pub fn index_location(&self) -> String {
        format!(
            "{STATIC_PREFIX}/{}",
            self.index_document.trim_start_matches('/')
        )
    }

    pub fn fallback_url(&self) -> Option<&str> {
        self.fallback_url.as_deref()
    }

    pub fn set_fallback_url(mut self, fallback_url: String) -> Self {
        self.fallback_url = Some(fallback_url);
        self
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["live_gateway"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = parse(&[]);

        assert_eq!(config.port, 8000);
        assert_eq!(config.interface(), "127.0.0.1");
        assert_eq!(config.refresh_interval(), Duration::from_millis(1000));
        assert_eq!(config.value_source, ValueSourceKind::Person);
        assert_eq!(config.static_dir(), "./static");
        assert_eq!(config.index_location(), "/static/index.html");
        assert_eq!(config.keep_alive(), Some(Duration::from_secs(15)));
        assert!(config.fallback_url().is_none());
    }

    #[test]
    fn test_zero_keep_alive_disables_comments() {
        let config = parse(&["--keep-alive-secs", "0"]);
        assert_eq!(config.keep_alive(), None);
    }

    #[test]
    fn test_zero_refresh_interval_is_rejected() {
        let result = Config::try_parse_from(["live_gateway", "--refresh-interval-ms", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_value_source_accepts_counter() {
        let config = parse(&["--value-source", "counter"]);
        assert_eq!(config.value_source, ValueSourceKind::Counter);
        assert_eq!(config.value_source.to_string(), "counter");
    }

    #[test]
    fn test_index_location_strips_leading_slash() {
        let config = parse(&["--index-document", "/app/main.html"]);
        assert_eq!(config.index_location(), "/static/app/main.html");
    }

    #[test]
    fn test_fallback_url_setter_overrides_parsed_value() {
        let config = parse(&[]).set_fallback_url("http://127.0.0.1:5000".to_string());
        assert_eq!(config.fallback_url(), Some("http://127.0.0.1:5000"));
    }
}
