// ====== TERMINAL ======

use std::io::{self, BufRead, Write};

/// Where the shell talks to its user.
pub trait Terminal {
    fn print(&mut self, text: &str);

    /// Show `prompt` and read one line without its line ending.
    /// `None` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

pub struct StdTerminal;

impl Terminal for StdTerminal {
    fn print(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        // a closed stdout leaves nothing to report to
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.print(prompt);
        let mut raw = Vec::new();
        if io::stdin().lock().read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let mut buf = String::from_utf8_lossy(&raw).into_owned();
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }
}

// ====== DISPATCH ======

use crate::logger;
use crate::services::{self, Context, ShellError};
use std::collections::HashMap;

type Handler = fn(&mut Context, &[&str]) -> services::Result<String>;

/// A handler plus whether it needs an open session.
type HandlerMap = HashMap<&'static str, (Handler, bool)>;

pub enum Flow {
    Continue(String),
    Exit(String),
}

pub struct Shell {
    ctx: Context,
    map: HandlerMap,
}

impl Shell {
    pub fn new(ctx: Context) -> Self {
        let mut map = HandlerMap::new();
        map.insert("connect", (services::connect as Handler, false));
        map.insert("cd", (services::cd as Handler, true));
        map.insert("ls", (services::ls as Handler, true));
        map.insert("cat", (services::cat as Handler, true));
        map.insert("install", (services::install as Handler, true));
        map.insert("upload", (services::upload as Handler, true));
        map.insert("rm", (services::rm as Handler, true));
        map.insert("refresh_cache", (services::refresh_cache as Handler, true));
        map.insert("help", (services::help as Handler, false));
        Self { ctx, map }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn prompt(&self) -> String {
        if self.ctx.connected() {
            format!("{} >>", self.ctx.wd)
        } else {
            String::from("unconnected >>")
        }
    }

    /// Connect before the first prompt: to `port` when given, else through
    /// the selection menu.
    pub fn startup(&mut self, port: Option<&str>) {
        let out = match port {
            Some(p) => render(services::connect_to(&mut self.ctx, p)),
            None => render(services::connect(&mut self.ctx, &[])),
        };
        self.ctx.term.print(&out);
    }

    /// Run one command line. Errors are rendered, never returned.
    pub fn execute(&mut self, line: &str) -> Flow {
        let input: Vec<&str> = line.split_ascii_whitespace().collect();
        let cmd = match input.first() {
            Some(c) => *c,
            None => return Flow::Continue(String::new()),
        };

        if cmd == "exit" {
            logger::log("[SHELL] Exit requested");
            self.ctx.disconnect();
            return Flow::Exit(String::new());
        }

        match self.map.get(cmd) {
            Some(&(handler, needs_session)) => {
                logger::log(&format!("[SHELL] Command: {cmd}, args: {:?}", &input[1..]));
                if needs_session && !self.ctx.connected() {
                    return Flow::Continue(render(Err(ShellError::NotConnected)));
                }
                let res = handler(&mut self.ctx, &input[1..]);
                if let Err(e) = &res {
                    logger::log(&format!("[SHELL] {cmd} failed: {e:?}"));
                }
                Flow::Continue(render(res))
            }
            None => {
                logger::log(&format!("[SHELL] Unknown command: {cmd}"));
                Flow::Continue(format!("Unknown command: {cmd}\n"))
            }
        }
    }

    /// Read and execute lines until `exit` or end of input. A line that
    /// cannot be read is reported and skipped.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            let prompt = format!("{} ", self.prompt());
            let line = match self.ctx.term.ask(&prompt) {
                Ok(Some(l)) => l,
                Ok(None) => {
                    self.ctx.term.print("\n");
                    self.ctx.disconnect();
                    return Ok(());
                }
                Err(e) if matches!(e.kind(), io::ErrorKind::InvalidData | io::ErrorKind::Interrupted) => {
                    logger::log(&format!("[SHELL] Skipping unreadable line: {e}"));
                    self.ctx.term.print(&format!("Unreadable input: {e}\n"));
                    continue;
                }
                Err(e) => {
                    self.ctx.disconnect();
                    return Err(e);
                }
            };
            match self.execute(&line) {
                Flow::Continue(out) => self.ctx.term.print(&out),
                Flow::Exit(out) => {
                    self.ctx.term.print(&out);
                    return Ok(());
                }
            }
        }
    }
}

fn render(res: services::Result<String>) -> String {
    match res {
        Ok(s) => s,
        Err(e) => format!("{e}\n"),
    }
}
