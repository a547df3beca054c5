// Startup settings: an optional JSON file, overridden by command line flags.

use getopts::Options;
use serde::Deserialize;
use std::path::Path;
use std::{error, fmt, fs, io};

#[derive(Debug)]
pub enum ConfigError {
    Args(getopts::Fail),
    BadValue(String),
    Io(io::Error),
    Json(serde_json::Error),
}

impl error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Args(e) => write!(f, "{e}"),
            Self::BadValue(msg) => write!(f, "{msg}"),
            Self::Io(e) => write!(f, "Cannot read config: {e}"),
            Self::Json(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl From<getopts::Fail> for ConfigError {
    fn from(e: getopts::Fail) -> Self {
        Self::Args(e)
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Connect here at startup instead of showing the port menu.
    pub port: Option<String>,
    pub baud_rate: u32,
    /// How long the hub may stay silent before a call fails.
    pub timeout_ms: u64,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { port: None, baud_rate: 115200, timeout_ms: 5000, verbose: false }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

pub enum Action {
    Run(Config),
    Help(String),
}

fn options() -> Options {
    let mut opts = Options::new();
    opts.optopt("p", "port", "Serial port to connect to at startup", "PORT");
    opts.optopt("b", "baud", "Baud rate (default 115200)", "RATE");
    opts.optopt("t", "timeout", "Idle timeout in milliseconds (default 5000)", "MS");
    opts.optopt("c", "config", "JSON config file", "FILE");
    opts.optflag("v", "verbose", "Log to stderr");
    opts.optflag("h", "help", "Print this help");
    opts
}

fn number<T: std::str::FromStr>(flag: &str, s: String) -> Result<T, ConfigError> {
    s.parse().map_err(|_| ConfigError::BadValue(format!("--{flag} expects a number, got '{s}'")))
}

/// Build the startup config from `args` (program name first).
pub fn parse_args(args: &[String]) -> Result<Action, ConfigError> {
    let opts = options();
    let matches = opts.parse(args.get(1..).unwrap_or(&[]))?;

    if matches.opt_present("h") {
        let program = args.first().map_or("spike-console", String::as_str);
        let brief = format!("Usage: {program} [options]");
        return Ok(Action::Help(opts.usage(&brief)));
    }
    if let Some(extra) = matches.free.first() {
        return Err(ConfigError::BadValue(format!("Unexpected argument '{extra}'")));
    }

    let mut config = match matches.opt_str("c") {
        Some(path) => Config::load(Path::new(&path))?,
        None => Config::default(),
    };
    if let Some(port) = matches.opt_str("p") {
        config.port = Some(port);
    }
    if let Some(baud) = matches.opt_str("b") {
        config.baud_rate = number("baud", baud)?;
    }
    if let Some(ms) = matches.opt_str("t") {
        config.timeout_ms = number("timeout", ms)?;
    }
    if matches.opt_present("v") {
        config.verbose = true;
    }
    Ok(Action::Run(config))
}
