use super::{Context, Result, ShellError, single_free};
use crate::{guard, logger, utils};

pub const USAGE: &str = "Usage: rm <path>
Deletes a file on the hub after asking for confirmation.";

pub fn rm(ctx: &mut Context, args: &[&str]) -> Result<String> {
    let session = ctx.session.as_mut().ok_or(ShellError::NotConnected)?;

    let free: Vec<String> = args.iter().map(|s| String::from(*s)).collect();
    let path = utils::resolve(&ctx.wd, single_free(&free, USAGE)?);

    // checked before anything else, cache state and answers do not matter
    if let Some(entry) = guard::protected_by(&path) {
        logger::log(&format!("[SHELL] Refused to delete protected {path}"));
        return Err(ShellError::ProtectedPath(path, entry));
    }
    if !ctx.cache.contains(&path) {
        return Err(ShellError::PathNotFound(path));
    }

    let answer = ctx.term.ask(&format!("Type \"yes\" to delete {path}: "))?;
    if answer.as_deref().map(str::trim) != Some("yes") {
        return Ok(String::from("Aborted\n"));
    }

    session.delete(&path)?;
    ctx.cache.remove(&path);
    Ok(format!("Removed {path}\n"))
}
