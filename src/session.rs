// One open connection to a hub. Dropping the session closes the port.

use crate::board::{Board, Connector, Entry, Result};
use crate::logger;

pub struct Session {
    port: String,
    board: Box<dyn Board>,
    closed: bool,
}

impl Session {
    /// Open `port`. On error nothing stays open.
    pub fn connect(connector: &dyn Connector, port: &str) -> Result<Self> {
        let board = connector.open(port)?;
        logger::log(&format!("[SESSION] Connected to {port}"));
        Ok(Self { port: String::from(port), board, closed: false })
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn list_all(&mut self) -> Result<Vec<String>> {
        self.board.list_all()
    }

    pub fn list_dir(&mut self, path: &str, recursive: bool, sizes: bool) -> Result<Vec<Entry>> {
        self.board.list_dir(path, recursive, sizes)
    }

    pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        self.board.read_file(path)
    }

    pub fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.board.write_file(path, data)
    }

    pub fn delete(&mut self, path: &str) -> Result<()> {
        self.board.delete_file(path)
    }

    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        logger::log(&format!("[SESSION] Closing {}", self.port));
        self.board.close()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            logger::log(&format!("[SESSION] Close failed: {e}"));
        }
    }
}
