#![allow(dead_code)]

use spike_console::board::{Board, BoardError, Connector, Entry, Result};
use spike_console::services::Context;
use spike_console::shell::{Shell, Terminal};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::rc::Rc;

/// State of a pretend hub, shared between the test and the boards it opens.
#[derive(Default)]
pub struct Hub {
    pub ports: Vec<String>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub fail_listing: bool,
    /// Paths whose reads time out.
    pub stalled: BTreeSet<String>,
    pub opened: usize,
    pub closed: usize,
    pub deleted: Vec<String>,
}

pub type SharedHub = Rc<RefCell<Hub>>;

pub fn hub(files: &[(&str, &[u8])]) -> SharedHub {
    let hub = Hub {
        ports: vec![String::from("/dev/ttyACM0"), String::from("/dev/ttyACM1")],
        files: files.iter().map(|(p, d)| (String::from(*p), d.to_vec())).collect(),
        ..Hub::default()
    };
    Rc::new(RefCell::new(hub))
}

pub struct FakeConnector(pub SharedHub);

impl Connector for FakeConnector {
    fn ports(&self) -> Result<Vec<String>> {
        Ok(self.0.borrow().ports.clone())
    }

    fn open(&self, port: &str) -> Result<Box<dyn Board>> {
        let mut hub = self.0.borrow_mut();
        if !hub.ports.iter().any(|p| p == port) {
            return Err(BoardError::Serial(format!("{port}: no such device")));
        }
        hub.opened += 1;
        Ok(Box::new(FakeBoard(self.0.clone())))
    }
}

pub struct FakeBoard(SharedHub);

impl Board for FakeBoard {
    fn list_all(&mut self) -> Result<Vec<String>> {
        let hub = self.0.borrow();
        if hub.fail_listing {
            return Err(BoardError::Timeout);
        }
        Ok(hub.files.keys().cloned().collect())
    }

    fn list_dir(&mut self, path: &str, recursive: bool, sizes: bool) -> Result<Vec<Entry>> {
        let hub = self.0.borrow();
        let dir = if path == "/" { String::from("/") } else { format!("{path}/") };
        let mut seen = BTreeSet::new();
        let mut entries = Vec::new();
        for (p, data) in hub.files.iter().filter(|(p, _)| p.starts_with(&dir)) {
            let shown = if recursive {
                p.clone()
            } else {
                match p[dir.len()..].split_once('/') {
                    Some((child, _)) => format!("{dir}{child}"),
                    None => p.clone(),
                }
            };
            if seen.insert(shown.clone()) {
                entries.push(match sizes {
                    true => Entry::sized(&shown, data.len() as u64),
                    false => Entry::new(&shown),
                });
            }
        }
        if entries.is_empty() {
            return Err(BoardError::NotFound(String::from(path)));
        }
        Ok(entries)
    }

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        let hub = self.0.borrow();
        if hub.stalled.contains(path) {
            return Err(BoardError::Timeout);
        }
        hub.files
            .get(path)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(String::from(path)))
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.0.borrow_mut().files.insert(String::from(path), data.to_vec());
        Ok(())
    }

    fn delete_file(&mut self, path: &str) -> Result<()> {
        let mut hub = self.0.borrow_mut();
        match hub.files.remove(path) {
            Some(_) => {
                hub.deleted.push(String::from(path));
                Ok(())
            }
            None => Err(BoardError::NotFound(String::from(path))),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.0.borrow_mut().closed += 1;
        Ok(())
    }
}

/// Answers prompts from a script and records everything shown.
#[derive(Default)]
pub struct Screen {
    pub answers: VecDeque<String>,
    /// Lines that fail to decode before the next answer is given.
    pub garbled: usize,
    pub prompts: Vec<String>,
    pub output: String,
}

pub type SharedScreen = Rc<RefCell<Screen>>;

pub struct ScriptedTerminal(pub SharedScreen);

impl Terminal for ScriptedTerminal {
    fn print(&mut self, text: &str) {
        self.0.borrow_mut().output.push_str(text);
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut screen = self.0.borrow_mut();
        screen.prompts.push(String::from(prompt));
        screen.output.push_str(prompt);
        if screen.garbled > 0 {
            screen.garbled -= 1;
            return Err(io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"));
        }
        Ok(screen.answers.pop_front())
    }
}

pub fn answer(screen: &SharedScreen, line: &str) {
    screen.borrow_mut().answers.push_back(String::from(line));
}

pub fn shell(hub: &SharedHub) -> (Shell, SharedScreen) {
    let screen = SharedScreen::default();
    let ctx = Context::new(
        Box::new(FakeConnector(hub.clone())),
        Box::new(ScriptedTerminal(screen.clone())),
    );
    (Shell::new(ctx), screen)
}

/// A shell already connected to /dev/ttyACM0.
pub fn connected(hub: &SharedHub) -> (Shell, SharedScreen) {
    let (mut sh, screen) = shell(hub);
    sh.startup(Some("/dev/ttyACM0"));
    assert!(sh.context().connected(), "startup failed: {}", screen.borrow().output);
    screen.borrow_mut().output.clear();
    (sh, screen)
}

pub fn out(flow: spike_console::shell::Flow) -> String {
    match flow {
        spike_console::shell::Flow::Continue(s) => s,
        spike_console::shell::Flow::Exit(_) => panic!("unexpected exit"),
    }
}
