use getopts::Options;
use super::{Context, Result, ShellError, single_free};
use crate::sedes::bytes_repr;
use crate::utils;

pub const USAGE: &str = "Usage: cat <file> [-r]
-r prints the raw data";

pub fn cat(ctx: &mut Context, args: &[&str]) -> Result<String> {
    let session = ctx.session.as_mut().ok_or(ShellError::NotConnected)?;

    let mut opts = Options::new();
    opts.optflag("r", "", "Print the raw bytes");
    let matches = opts.parse(args)?;
    let raw = matches.opt_present("r");

    let path = utils::resolve(&ctx.wd, single_free(&matches.free, USAGE)?);
    if !ctx.cache.contains(&path) {
        return Err(ShellError::PathNotFound(path));
    }

    let data = session.read(&path)?;
    if raw {
        return Ok(format!("{}\n", bytes_repr(&data)));
    }
    let mut text = String::from_utf8(data).map_err(|_| ShellError::Decode(path))?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}
