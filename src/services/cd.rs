use super::{Context, Result, ShellError};
use crate::utils;

pub const USAGE: &str = "Usage: cd [path]
If no path is specified, it behaves as cd /.";

pub fn cd(ctx: &mut Context, args: &[&str]) -> Result<String> {
    if ctx.session.is_none() {
        return Err(ShellError::NotConnected);
    }

    let path = match args {
        [] => String::from("/"),
        [p] => utils::resolve(&ctx.wd, p),
        _ => return Err(ShellError::InvalidArgument(format!("Too many arguments\n{USAGE}"))),
    };

    // directories are only known through the files below them
    if path != "/" && !ctx.cache.has_prefix(&path) {
        return Err(ShellError::PathNotFound(path));
    }
    ctx.wd = path;
    Ok(String::new())
}
