use getopts::Options;
use super::{Context, Result, ShellError};
use crate::utils;

pub const USAGE: &str = "Usage: ls [path] [-r] [-s]
If no path is specified, the current directory is used.
-s print file size
-r recursively print all subdirectories";

pub fn ls(ctx: &mut Context, args: &[&str]) -> Result<String> {
    let session = ctx.session.as_mut().ok_or(ShellError::NotConnected)?;

    let mut opts = Options::new();
    opts.optflag("r", "", "Recursively list subdirectories");
    opts.optflag("s", "", "Print file sizes");
    let matches = opts.parse(args)?;

    let path = match matches.free.as_slice() {
        [] => ctx.wd.clone(),
        [p] => utils::resolve(&ctx.wd, p),
        _ => return Err(ShellError::InvalidArgument(format!("Too many arguments\n{USAGE}"))),
    };
    let recursive = matches.opt_present("r");
    let sizes = matches.opt_present("s");

    let entries = session.list_dir(&path, recursive, sizes)?;

    let mut return_str = String::new();
    for entry in &entries {
        return_str += &format!("{entry}\n");
    }
    // sized listings are display only and never feed the cache
    if !sizes {
        for entry in &entries {
            ctx.cache.add(&entry.path);
        }
    }
    Ok(return_str)
}
