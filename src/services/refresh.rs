use super::{Context, Result, ShellError};

pub const USAGE: &str = "Usage: refresh_cache
Reloads the file cache from the hub.";

pub fn refresh_cache(ctx: &mut Context, _args: &[&str]) -> Result<String> {
    let session = ctx.session.as_mut().ok_or(ShellError::NotConnected)?;

    ctx.term.print("Refreshing...\n");
    let paths = session.list_all()?;
    ctx.cache.populate(paths);
    Ok(String::from("Done\n"))
}
