mod connect;
pub use connect::{connect, connect_to};

mod cd;
pub use cd::cd;

mod ls;
pub use ls::ls;

mod cat;
pub use cat::cat;

mod install;
pub use install::install;

mod upload;
pub use upload::upload;

mod rm;
pub use rm::rm;

mod refresh;
pub use refresh::refresh_cache;

mod help;
pub use help::help;

// ====== ERROR ======

use crate::board::BoardError;
use crate::sedes::SedesError;
use std::{error, fmt, io};

#[derive(Debug)]
pub enum ShellError {
    NotConnected,
    ConnectFailed(String, BoardError),
    Device(BoardError),
    PathNotFound(String),
    InvalidArgument(String),
    /// Target path and the protected entry that covers it.
    ProtectedPath(String, &'static str),
    Decode(String),
    Sedes(SedesError),
    Io(io::Error),
}

impl error::Error for ShellError {}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "please connect to a spike before using this command."),
            Self::ConnectFailed(port, e) => write!(f, "Failed to connect to {port}: {e}"),
            Self::Device(e) => write!(f, "Device error: {e}"),
            Self::PathNotFound(p) => write!(f, "Path not found: {p}"),
            Self::InvalidArgument(msg) => write!(f, "{msg}"),
            Self::ProtectedPath(p, by) => write!(f, "Refusing to delete {p}: protected by {by}"),
            Self::Decode(p) => write!(f, "Not a text file! Try cat -r {p}"),
            Self::Sedes(e) => write!(f, "Unreadable slot configuration: {e}"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl From<BoardError> for ShellError {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::NotFound(p) => Self::PathNotFound(p),
            e => Self::Device(e),
        }
    }
}

impl From<SedesError> for ShellError {
    fn from(e: SedesError) -> Self {
        Self::Sedes(e)
    }
}

impl From<io::Error> for ShellError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<getopts::Fail> for ShellError {
    fn from(f: getopts::Fail) -> Self {
        Self::InvalidArgument(f.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;

// ====== CONTEXT ======

use crate::board::Connector;
use crate::cache::FileCache;
use crate::session::Session;
use crate::shell::Terminal;

/// Everything one shell owns: the open session (if any), the working
/// directory on the hub, the file cache and the user's terminal.
pub struct Context {
    pub wd: String,
    pub cache: FileCache,
    pub session: Option<Session>,
    pub connector: Box<dyn Connector>,
    pub term: Box<dyn Terminal>,
}

impl Context {
    pub fn new(connector: Box<dyn Connector>, term: Box<dyn Terminal>) -> Self {
        Self {
            wd: String::from("/"),
            cache: FileCache::new(),
            session: None,
            connector,
            term,
        }
    }

    pub fn connected(&self) -> bool {
        self.session.is_some()
    }

    /// Drop the session (closing the port) and forget everything about the hub.
    pub fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            crate::logger::log(&format!("[SHELL] Disconnecting {}", session.port()));
            if let Err(e) = session.close() {
                crate::logger::log(&format!("[SHELL] Close failed: {e}"));
            }
        }
        self.cache.clear();
        self.wd = String::from("/");
    }
}

/// Exactly one free argument, or the usage text as an error.
fn single_free<'a>(free: &'a [String], usage: &str) -> Result<&'a str> {
    match free {
        [one] => Ok(one),
        [] => Err(ShellError::InvalidArgument(String::from(usage))),
        _ => Err(ShellError::InvalidArgument(format!("Too many arguments\n{usage}"))),
    }
}
