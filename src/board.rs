pub mod ports;
pub mod pyboard;

// ====== ERROR ======

use std::{error, fmt, io};

#[derive(Debug)]
pub enum BoardError {
    /// The hub reports the path does not exist.
    NotFound(String),
    /// A snippet raised on the hub; carries the traceback's last line.
    Remote(String),
    /// The hub answered something the raw REPL exchange does not expect.
    Protocol(String),
    Timeout,
    Serial(String),
    Io(io::Error),
}

impl error::Error for BoardError {}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(p) => write!(f, "no such file on hub: {p}"),
            Self::Remote(msg) => write!(f, "hub raised: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::Timeout => write!(f, "timed out waiting for the hub"),
            Self::Serial(msg) => write!(f, "serial port error: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl From<io::Error> for BoardError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Io(e),
        }
    }
}

impl From<serialport::Error> for BoardError {
    fn from(e: serialport::Error) -> Self {
        Self::Serial(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;

// ====== ENTRY ======

/// One line of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub size: Option<u64>,
}

impl Entry {
    pub fn new(path: &str) -> Self {
        Self { path: String::from(path), size: None }
    }

    pub fn sized(path: &str, size: u64) -> Self {
        Self { path: String::from(path), size: Some(size) }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.size {
            Some(size) => write!(f, "{} - {} bytes", self.path, size),
            None => write!(f, "{}", self.path),
        }
    }
}

// ====== COLLABORATORS ======

/// File access on a connected hub. Every call blocks until the hub answers.
pub trait Board {
    /// Recursive listing of every leaf below `/`.
    fn list_all(&mut self) -> Result<Vec<String>>;

    fn list_dir(&mut self, path: &str, recursive: bool, sizes: bool) -> Result<Vec<Entry>>;

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>>;

    /// Create or overwrite.
    fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()>;

    fn delete_file(&mut self, path: &str) -> Result<()>;

    /// Release the port. Called at most once.
    fn close(&mut self) -> Result<()>;
}

/// Finds serial ports and opens boards on them.
pub trait Connector {
    fn ports(&self) -> Result<Vec<String>>;

    fn open(&self, port: &str) -> Result<Box<dyn Board>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_render_like_long_listing() {
        assert_eq!(Entry::new("/main.py").to_string(), "/main.py");
        assert_eq!(Entry::sized("/main.py", 420).to_string(), "/main.py - 420 bytes");
    }

    #[test]
    fn timeouts_are_their_own_kind() {
        let e = BoardError::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert!(matches!(e, BoardError::Timeout));
        let e = BoardError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(matches!(e, BoardError::Io(_)));
    }
}
