// Raw REPL driver for a MicroPython hub on a byte stream.
//
// Exchange: Ctrl-C twice to stop the running program, Ctrl-A for raw mode,
// then per snippet `>` <code> Ctrl-D, answered by `OK` <stdout> 0x04
// <stderr> 0x04. Ctrl-B leaves raw mode.

use super::{Board, BoardError, Entry, Result};
use crate::logger;
use crate::sedes::{Deserialize, Literal};
use std::io::{Read, Write};
use std::time::{Duration, Instant};

const BANNER: &[u8] = b"raw REPL; CTRL-B to exit\r\n";
const EOT: &[u8] = b"\x04";
const WRITE_CHUNK: usize = 256;
const FILE_CHUNK: usize = 256;

pub struct Pyboard<T: Read + Write> {
    port: T,
    idle_timeout: Duration,
    closed: bool,
}

impl<T: Read + Write> Pyboard<T> {
    /// Take over the stream and switch the hub into raw REPL mode.
    pub fn new(port: T, idle_timeout: Duration) -> Result<Self> {
        let mut board = Self { port, idle_timeout, closed: false };
        board.enter_raw_repl()?;
        Ok(board)
    }

    fn enter_raw_repl(&mut self) -> Result<()> {
        self.port.write_all(b"\r\x03\x03")?;
        self.port.write_all(b"\r\x01")?;
        self.port.flush()?;
        self.read_until(BANNER)?;
        logger::log("[PYBOARD] Entered raw REPL");
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        let deadline = Instant::now() + self.idle_timeout;
        loop {
            match self.port.read(&mut buf) {
                Ok(1) => return Ok(buf[0]),
                Ok(_) => return Err(BoardError::Protocol(String::from("connection closed"))),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => (),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    if Instant::now() >= deadline {
                        return Err(BoardError::Timeout);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read until `ending` shows up, returning everything before it.
    fn read_until(&mut self, ending: &[u8]) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        while !data.ends_with(ending) {
            data.push(self.read_byte()?);
        }
        data.truncate(data.len() - ending.len());
        Ok(data)
    }

    /// Run one snippet, returning its stdout. Anything on stderr is an error.
    fn exec(&mut self, code: &str) -> Result<Vec<u8>> {
        let prompt = self.read_until(b">")?;
        if !prompt.is_empty() {
            logger::log(&format!("[PYBOARD] Skipped {} stray bytes", prompt.len()));
        }
        for chunk in code.as_bytes().chunks(WRITE_CHUNK) {
            self.port.write_all(chunk)?;
        }
        self.port.write_all(EOT)?;
        self.port.flush()?;

        let mut ok = [0u8; 2];
        ok[0] = self.read_byte()?;
        ok[1] = self.read_byte()?;
        if &ok != b"OK" {
            return Err(BoardError::Protocol(format!("could not exec command, got {:?}", ok)));
        }

        let out = self.read_until(EOT)?;
        let err = self.read_until(EOT)?;
        if err.is_empty() {
            Ok(out)
        } else {
            Err(remote_error(&String::from_utf8_lossy(&err), code))
        }
    }

    /// Feed `data` to the open `_f` on the hub and close it.
    fn write_chunks(&mut self, data: &[u8]) -> Result<()> {
        for chunk in data.chunks(FILE_CHUNK) {
            self.exec(&format!("_f.write(ubinascii.unhexlify('{}'))\n", hex::encode(chunk)))?;
        }
        self.exec("_f.close()\n")?;
        Ok(())
    }

    fn exec_literal(&mut self, code: &str) -> Result<Literal> {
        let out = self.exec(code)?;
        let text = String::from_utf8_lossy(&out);
        Literal::deserialize(text.trim())
            .map_err(|e| BoardError::Protocol(format!("unreadable listing: {e}")))
    }
}

/// Map a traceback to an error, `ENOENT` meaning the path is missing.
fn remote_error(traceback: &str, code: &str) -> BoardError {
    let last = traceback
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or("")
        .to_string();
    if last.contains("ENOENT") || last.contains("Errno 2]") {
        let path = code
            .lines()
            .find_map(|l| l.strip_prefix("# path: "))
            .unwrap_or("?");
        return BoardError::NotFound(String::from(path));
    }
    BoardError::Remote(last)
}

fn discard_snippet(tmp: &str) -> String {
    format!(
        "try:
    _f.close()
except OSError:
    pass
try:
    os.remove({})
except OSError:
    pass
",
        Literal::str(tmp)
    )
}

fn walk_snippet(path: &str, recursive: bool, sizes: bool) -> String {
    format!(
        "# path: {path}
import os
def _walk(d, r, s, out):
    for n in os.listdir(d):
        p = d.rstrip('/') + '/' + n
        st = os.stat(p)
        if st[0] & 0x4000 and r:
            before = len(out)
            _walk(p, r, s, out)
            if len(out) > before:
                continue
        out.append((p, st[6]) if s else p)
    return out
print(repr(_walk({}, {}, {}, [])))
",
        Literal::str(path),
        Literal::Bool(recursive),
        Literal::Bool(sizes),
    )
}

fn to_entry(item: &Literal) -> Result<Entry> {
    let bad = || BoardError::Protocol(format!("unexpected listing item {item}"));
    match item {
        Literal::Str(p) => Ok(Entry::new(p)),
        Literal::Tuple(pair) => match pair.as_slice() {
            [Literal::Str(p), Literal::Int(size)] => {
                Ok(Entry::sized(p, u64::try_from(*size).map_err(|_| bad())?))
            }
            _ => Err(bad()),
        },
        _ => Err(bad()),
    }
}

impl<T: Read + Write> Board for Pyboard<T> {
    fn list_all(&mut self) -> Result<Vec<String>> {
        Ok(self.list_dir("/", true, false)?.into_iter().map(|e| e.path).collect())
    }

    fn list_dir(&mut self, path: &str, recursive: bool, sizes: bool) -> Result<Vec<Entry>> {
        match self.exec_literal(&walk_snippet(path, recursive, sizes))? {
            Literal::List(items) => items.iter().map(to_entry).collect(),
            other => Err(BoardError::Protocol(format!("expected a list, got {other}"))),
        }
    }

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        let code = format!(
            "# path: {path}
import ubinascii
with open({}, 'rb') as f:
    while True:
        b = f.read({FILE_CHUNK})
        if not b:
            break
        print(ubinascii.hexlify(b).decode(), end='')
",
            Literal::str(path)
        );
        let out = self.exec(&code)?;
        let text = String::from_utf8_lossy(&out);
        hex::decode(text.trim()).map_err(|e| BoardError::Protocol(format!("bad hex from hub: {e}")))
    }

    /// Write into `<path>.tmp` and rename it over `path` once closed, so a
    /// failed transfer leaves the old file in place.
    fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let tmp = format!("{path}.tmp");
        self.exec(&format!(
            "# path: {path}\nimport os, ubinascii\n_f = open({}, 'wb')\n",
            Literal::str(&tmp)
        ))?;
        if let Err(e) = self.write_chunks(data) {
            logger::log(&format!("[PYBOARD] Write to {path} failed, dropping {tmp}: {e}"));
            if let Err(cleanup) = self.exec(&discard_snippet(&tmp)) {
                logger::log(&format!("[PYBOARD] Cleanup of {tmp} failed: {cleanup}"));
            }
            return Err(e);
        }
        // rename does not replace an existing file on every hub filesystem
        self.exec(&format!(
            "# path: {path}\ntry:\n    os.remove({p})\nexcept OSError:\n    pass\nos.rename({t}, {p})\n",
            p = Literal::str(path),
            t = Literal::str(&tmp),
        ))?;
        logger::log(&format!("[PYBOARD] Wrote {} bytes to {path}", data.len()));
        Ok(())
    }

    fn delete_file(&mut self, path: &str) -> Result<()> {
        self.exec(&format!("# path: {path}\nimport os\nos.remove({})\n", Literal::str(path)))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.port.write_all(b"\r\x02")?;
        self.port.flush()?;
        logger::log("[PYBOARD] Left raw REPL");
        Ok(())
    }
}

impl<T: Read + Write> Drop for Pyboard<T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            logger::log(&format!("[PYBOARD] Close on drop failed: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Replays canned hub output and records what the host sends.
    struct Wire {
        rx: Cursor<Vec<u8>>,
        tx: Vec<u8>,
    }

    impl Wire {
        fn new(replies: &[&[u8]]) -> Self {
            let mut rx = b"MicroPython v1.x\r\nraw REPL; CTRL-B to exit\r\n".to_vec();
            for r in replies {
                rx.extend_from_slice(b">OK");
                rx.extend_from_slice(r);
            }
            Self { rx: Cursor::new(rx), tx: Vec::new() }
        }
    }

    impl Read for Wire {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.rx.read(buf)
        }
    }

    impl Write for Wire {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn board(replies: &[&[u8]]) -> Pyboard<Wire> {
        Pyboard::new(Wire::new(replies), Duration::from_millis(50)).unwrap()
    }

    #[test]
    fn enters_raw_mode_on_open() {
        let b = board(&[]);
        assert!(b.port.tx.starts_with(b"\r\x03\x03\r\x01"));
    }

    #[test]
    fn lists_with_and_without_sizes() {
        let mut b = board(&[
            b"['/boot.py', '/projects/10000.py']\r\n\x04\x04",
            b"[('/boot.py', 120)]\r\n\x04\x04",
        ]);
        assert_eq!(b.list_all().unwrap(), vec!["/boot.py", "/projects/10000.py"]);
        assert_eq!(b.list_dir("/", false, true).unwrap(), vec![Entry::sized("/boot.py", 120)]);
    }

    #[test]
    fn reads_hex_encoded_content() {
        let mut b = board(&[b"68690a\x04\x04"]);
        assert_eq!(b.read_file("/a.txt").unwrap(), b"hi\n");
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let mut b = board(&[b"\x04Traceback (most recent call last):\r\nOSError: [Errno 2] ENOENT\r\n\x04"]);
        match b.read_file("/nope.py") {
            Err(BoardError::NotFound(p)) => assert_eq!(p, "/nope.py"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_tracebacks_are_remote_errors() {
        let mut b = board(&[b"\x04Traceback:\r\nOSError: 13\r\n\x04"]);
        assert!(matches!(b.delete_file("/x"), Err(BoardError::Remote(m)) if m == "OSError: 13"));
    }

    #[test]
    fn writes_in_hex_chunks_then_renames() {
        let mut b = board(&[b"\x04\x04", b"\x04\x04", b"\x04\x04", b"\x04\x04"]);
        b.write_file("/a.py", b"print(1)").unwrap();
        let sent = String::from_utf8_lossy(&b.port.tx).into_owned();
        assert!(sent.contains("_f = open('/a.py.tmp', 'wb')"));
        assert!(sent.contains(&hex::encode(b"print(1)")));
        let closed = sent.find("_f.close()").unwrap();
        let renamed = sent.find("os.rename('/a.py.tmp', '/a.py')").unwrap();
        assert!(closed < renamed);
    }

    #[test]
    fn failed_chunk_keeps_the_old_file() {
        let mut b = board(&[
            b"\x04\x04",
            b"\x04\x04",
            b"\x04Traceback:\r\nOSError: 28\r\n\x04",
            b"\x04\x04",
        ]);
        let data = vec![b'x'; 600];
        let res = b.write_file("/projects/.slots", &data);
        assert!(matches!(res, Err(BoardError::Remote(m)) if m == "OSError: 28"));

        let sent = String::from_utf8_lossy(&b.port.tx).into_owned();
        assert!(sent.contains("_f = open('/projects/.slots.tmp', 'wb')"));
        assert!(!sent.contains("open('/projects/.slots', 'wb')"));
        assert!(sent.contains("os.remove('/projects/.slots.tmp')"));
        assert!(!sent.contains("os.rename"));
        assert_eq!(sent.matches("_f.write(").count(), 2);
    }

    #[test]
    fn truncated_reply_is_a_protocol_error() {
        let mut b = board(&[b"['/a'"]);
        assert!(matches!(b.list_all(), Err(BoardError::Protocol(_))));
    }

    #[test]
    fn close_is_idempotent() {
        let mut b = board(&[]);
        b.close().unwrap();
        b.close().unwrap();
        assert!(b.port.tx.ends_with(b"\r\x02"));
        assert_eq!(b.port.tx.iter().filter(|&&c| c == 0x02).count(), 1);
    }
}
