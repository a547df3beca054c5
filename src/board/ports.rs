use super::pyboard::Pyboard;
use super::{Board, Connector, Result};
use crate::logger;
use std::time::Duration;

/// Opens hubs on real serial ports.
pub struct SerialConnector {
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl SerialConnector {
    pub fn new(baud_rate: u32, timeout: Duration) -> Self {
        Self { baud_rate, timeout }
    }
}

impl Connector for SerialConnector {
    fn ports(&self) -> Result<Vec<String>> {
        let ports = serialport::available_ports()?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    fn open(&self, port: &str) -> Result<Box<dyn Board>> {
        logger::log(&format!("[PORTS] Opening {port} at {} baud", self.baud_rate));
        let serial = serialport::new(port, self.baud_rate)
            .timeout(Duration::from_millis(100))
            .open()?;
        let board = Pyboard::new(serial, self.timeout)?;
        Ok(Box::new(board))
    }
}
