/*
 * read /projects/.slots (missing file = empty table)
 * build the record for the target slot from the local file
 * write the program to /projects/<10000 + slot>.py
 * rewrite /projects/.slots with only that slot changed
 */
use getopts::{Options, ParsingStyle};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use chrono::{DateTime, Utc};
use super::{Context, Result, ShellError, single_free};
use crate::board::BoardError;
use crate::logger;
use crate::sedes::{Deserialize, Serialize};
use crate::slots::{self, ProjectType, SlotRecord, SlotRegistry, MAX_SLOT, SLOTS_PATH};

pub const USAGE: &str = "Usage: install <file> [-slot N] [-python|-scratch]
Installs a program into a slot (0-20, default 0).";

fn unix_seconds(t: SystemTime) -> i64 {
    DateTime::<Utc>::from(t).timestamp()
}

fn parse_slot(s: Option<String>) -> Result<u8> {
    let invalid = || ShellError::InvalidArgument(String::from("Invalid slot id"));
    match s {
        None => Ok(0),
        Some(s) => match s.parse::<u8>() {
            Ok(n) if n <= MAX_SLOT => Ok(n),
            _ => Err(invalid()),
        },
    }
}

pub fn install(ctx: &mut Context, args: &[&str]) -> Result<String> {
    let session = ctx.session.as_mut().ok_or(ShellError::NotConnected)?;

    let mut opts = Options::new();
    opts.long_only(true).parsing_style(ParsingStyle::FloatingFrees);
    opts.optopt("", "slot", "Target slot (0-20)", "N");
    opts.optflag("", "python", "Python program (default)");
    opts.optflag("", "scratch", "Scratch program");
    let matches = opts.parse(args)?;

    let slot = parse_slot(matches.opt_str("slot"))?;
    let kind = match (matches.opt_present("python"), matches.opt_present("scratch")) {
        (true, true) => {
            return Err(ShellError::InvalidArgument(String::from("Choose one of -python or -scratch")))
        }
        (_, true) => ProjectType::Scratch,
        _ => ProjectType::Python,
    };
    let filename = single_free(&matches.free, USAGE)
        .map_err(|_| ShellError::InvalidArgument(format!("Missing file to install!\n{USAGE}")))?;

    let local = Path::new(filename);
    if !local.is_file() {
        return Err(ShellError::InvalidArgument(String::from("File not found!")));
    }
    let meta = fs::metadata(local)?;
    let modified = unix_seconds(meta.modified()?);
    let created = meta.created().map(unix_seconds).unwrap_or(modified);
    let name = local
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ShellError::InvalidArgument(format!("Bad file name: {filename}")))?;
    let content = fs::read(local)?;

    ctx.term.print("Loading slot configuration\n");
    let mut registry = match session.read(SLOTS_PATH) {
        Ok(data) => SlotRegistry::deserialize(&String::from_utf8_lossy(&data))?,
        Err(BoardError::NotFound(_)) => {
            logger::log("[SHELL] No slot configuration on hub, starting a new one");
            SlotRegistry::new()
        }
        Err(e) => return Err(e.into()),
    };
    let record = SlotRecord::new(slot, name, created, modified, meta.len(), kind);
    registry.set(slot, &record);

    let target = slots::program_path(slot);
    ctx.term.print("Writing script\n");
    session.write(&target, &content)?;
    ctx.cache.add(&target);

    ctx.term.print("Writing slot configuration\n");
    session.write(SLOTS_PATH, registry.serialize().as_bytes())?;
    ctx.cache.add(SLOTS_PATH);

    logger::log(&format!("[SHELL] Installed {filename} into slot {slot} as {target}"));
    Ok(String::from("Done\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_must_be_within_range() {
        assert_eq!(parse_slot(None).unwrap(), 0);
        assert_eq!(parse_slot(Some(String::from("20"))).unwrap(), 20);
        assert!(parse_slot(Some(String::from("21"))).is_err());
        assert!(parse_slot(Some(String::from("-1"))).is_err());
        assert!(parse_slot(Some(String::from("five"))).is_err());
    }
}
